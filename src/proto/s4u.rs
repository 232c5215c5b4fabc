use super::Name;
use crate::asn1::constants::{ChecksumType, KeyUsage, PaDataType};
use crate::asn1::kerberos_string::KerberosString;
use crate::asn1::pa_data::PaData;
use crate::asn1::pa_for_user::PaForUser;
use crate::asn1::pa_pac_options::{PaPacOptions, PacOptionFlags};
use crate::asn1::principal_name::PrincipalName;
use crate::asn1::realm::Realm;
use crate::constants::S4U_AUTH_PACKAGE;
use crate::crypto::{KrbChecksum, SessionKey};
use crate::error::KrbError;
use tracing::trace;

/// PA-FOR-USER naming `user`, keyed with the session key of the TGT the
/// request is sent with. A referral hands out a new TGT, so this has to be
/// rebuilt for every hop.
pub fn pa_for_user<C: KrbChecksum + ?Sized>(
    engine: &C,
    tgt_key: &SessionKey,
    user: &Name,
) -> Result<PaData, KrbError> {
    let (user_name, user_realm): (PrincipalName, Realm) = user.try_into()?;
    let auth_package = KerberosString::new(S4U_AUTH_PACKAGE)?;

    // MS-SFU 2.2.1 fixes the checksum to HMAC-MD5 whatever the key type.
    let input = PaForUser::checksum_input(&user_name, &user_realm, &auth_package);
    let cksum = tgt_key.checksum_with(
        engine,
        KeyUsage::PaForUserChecksum,
        ChecksumType::HMAC_MD5,
        &input,
    )?;

    trace!(%user, "built PA-FOR-USER");

    PaData::encode_from(
        PaDataType::PaForUser,
        &PaForUser {
            user_name,
            user_realm,
            cksum,
            auth_package,
        },
    )
}

/// PA-PAC-OPTIONS asking for claims and resource based constrained delegation.
pub fn pa_pac_options() -> Result<PaData, KrbError> {
    PaData::encode_from(
        PaDataType::PaPacOptions,
        &PaPacOptions {
            options: PacOptionFlags::Claims | PacOptionFlags::ResourceBasedConstrainedDelegation,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{pa_for_user, pa_pac_options};
    use crate::asn1::constants::{ChecksumType, EncryptionType, KeyUsage, PaDataType};
    use crate::asn1::pa_for_user::PaForUser;
    use crate::asn1::pa_pac_options::{PaPacOptions, PacOptionFlags};
    use crate::crypto::fake::FakeCrypto;
    use crate::crypto::SessionKey;
    use crate::proto::Name;
    use der::Decode;

    #[test]
    fn s4u_padata() {
        let key = SessionKey::new(EncryptionType::AES256_CTS_HMAC_SHA1_96, vec![3; 32])
            .expect("Failed to build key");
        let user = Name::principal("bob", "EXAMPLE.COM");

        let pa = pa_for_user(&FakeCrypto, &key, &user).expect("Failed to build PA-FOR-USER");
        assert!(pa.is_type(PaDataType::PaForUser));

        let for_user = PaForUser::from_der(pa.padata_value.as_bytes()).expect("Bad PA-FOR-USER");
        assert_eq!(for_user.auth_package.as_str(), "Kerberos");
        assert_eq!(for_user.user_realm.as_str(), "EXAMPLE.COM");
        assert_eq!(for_user.cksum.checksum_type, ChecksumType::HMAC_MD5 as i32);

        let input = PaForUser::checksum_input(
            &for_user.user_name,
            &for_user.user_realm,
            &for_user.auth_package,
        );
        key.verify_checksum(&FakeCrypto, KeyUsage::PaForUserChecksum, &for_user.cksum, &input)
            .expect("Checksum mismatch");

        // Another TGT session key gives another checksum.
        let other = SessionKey::new(EncryptionType::AES256_CTS_HMAC_SHA1_96, vec![4; 32])
            .expect("Failed to build key");
        assert!(other
            .verify_checksum(&FakeCrypto, KeyUsage::PaForUserChecksum, &for_user.cksum, &input)
            .is_err());

        let pa = pa_pac_options().expect("Failed to build PA-PAC-OPTIONS");
        assert!(pa.is_type(PaDataType::PaPacOptions));
        let options = PaPacOptions::from_der(pa.padata_value.as_bytes()).expect("Bad options");
        assert!(options.options.contains(PacOptionFlags::Claims));
        assert!(options
            .options
            .contains(PacOptionFlags::ResourceBasedConstrainedDelegation));
        assert!(!options.options.contains(PacOptionFlags::BranchAware));
    }
}
