use super::Credentials;
use crate::asn1::constants::{EncryptionType, KeyUsage, KrbErrorCode};
use crate::asn1::encrypted_data::EncryptedData;
use crate::asn1::kerberos_time::split_system_time;
use crate::asn1::krb_cred::{EncKrbCredPart, EncKrbCredPartInner, KrbCred};
use crate::asn1::uint32::UInt32;
use crate::asn1::KrbMessage;
use crate::crypto::{KrbCipher, SessionKey};
use crate::error::KrbError;
use der::asn1::OctetString;
use std::time::SystemTime;
use tracing::{debug, trace};

/// Forward `creds` in a KRB-CRED. With no key the enc-part is sent in the
/// clear under etype 0.
pub fn build_krb_cred<C: KrbCipher + ?Sized>(
    cipher: &C,
    key: Option<&SessionKey>,
    creds: &[Credentials],
    nonce: Option<u32>,
    now: SystemTime,
) -> Result<KrbCred, KrbError> {
    let ticket_info = creds
        .iter()
        .map(Credentials::to_cred_info)
        .collect::<Result<Vec<_>, _>>()?;
    let (timestamp, usec) = split_system_time(now)?;

    let part = EncKrbCredPart(EncKrbCredPartInner {
        ticket_info,
        nonce: nonce.map(UInt32),
        timestamp: Some(timestamp),
        usec: Some(usec),
        s_address: None,
        r_address: None,
    });
    let plain = part.asn1_encode()?;

    let enc_part = match key {
        Some(key) => key.seal(cipher, KeyUsage::KrbCredEncPart, None, &plain)?,
        None => EncryptedData {
            etype: EncryptionType::NULL.into(),
            kvno: None,
            cipher: OctetString::new(plain).map_err(|_| KrbError::DerEncodeOctetString)?,
        },
    };

    trace!(count = creds.len(), "built KRB-CRED");
    Ok(KrbCred::new(
        creds.iter().map(|c| c.ticket.clone()).collect(),
        enc_part,
    ))
}

/// Recover the forwarded credentials. The KrbCredInfo entries pair up with
/// the tickets by position.
pub fn open_krb_cred<C: KrbCipher + ?Sized>(
    cipher: &C,
    key: Option<&SessionKey>,
    message: &KrbCred,
) -> Result<Vec<Credentials>, KrbError> {
    let enc_part = &message.0.enc_part;
    let plain = if enc_part.etype == i32::from(EncryptionType::NULL) {
        enc_part.cipher.as_bytes().to_vec()
    } else {
        let key = key.ok_or(KrbError::CredentialsMissingKey)?;
        key.unseal(cipher, KeyUsage::KrbCredEncPart, enc_part)
            .map_err(|err| match err {
                KrbError::MessageAuthenticationFailed => {
                    KrbError::ApErr(KrbErrorCode::KrbApErrBadIntegrity)
                }
                err => err,
            })?
    };
    let part = EncKrbCredPart::parse(&plain)?.0;

    if part.ticket_info.len() != message.0.tickets.len() {
        debug!(
            tickets = message.0.tickets.len(),
            infos = part.ticket_info.len(),
            "KRB-CRED ticket count mismatch"
        );
        return Err(KrbError::CredentialsMissingTicketInfo);
    }

    message
        .0
        .tickets
        .iter()
        .zip(part.ticket_info.iter())
        .map(|(ticket, info)| Credentials::from_cred_info(ticket.clone(), info))
        .collect()
}
