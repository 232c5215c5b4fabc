use super::checksum::Checksum;
use super::kerberos_string::KerberosString;
use super::principal_name::PrincipalName;
use super::realm::Realm;
use der::Sequence;

/// MS-SFU 2.2.1
///
/// ```text
/// PA-FOR-USER ::= SEQUENCE {
///         -- PA TYPE 129
///         userName                [0] PrincipalName,
///         userRealm               [1] Realm,
///         cksum                   [2] Checksum,
///         auth-package            [3] KerberosString
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct PaForUser {
    #[asn1(context_specific = "0")]
    pub user_name: PrincipalName,
    #[asn1(context_specific = "1")]
    pub user_realm: Realm,
    #[asn1(context_specific = "2")]
    pub cksum: Checksum,
    #[asn1(context_specific = "3")]
    pub auth_package: KerberosString,
}

impl PaForUser {
    /// The bytes covered by `cksum`: the name type as a little endian 32 bit
    /// value, then each name component, the realm and the auth package, all
    /// without separators.
    pub fn checksum_input(
        user_name: &PrincipalName,
        user_realm: &Realm,
        auth_package: &KerberosString,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&user_name.name_type.to_le_bytes());
        for component in user_name.components() {
            out.extend_from_slice(component.as_bytes());
        }
        out.extend_from_slice(user_realm.as_str().as_bytes());
        out.extend_from_slice(auth_package.as_str().as_bytes());
        out
    }
}
