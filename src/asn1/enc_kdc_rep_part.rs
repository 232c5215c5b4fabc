use super::encryption_key::EncryptionKey;
use super::host_address::HostAddresses;
use super::kerberos_time::KerberosTime;
use super::last_req::LastReq;
use super::pa_data::PaData;
use super::principal_name::PrincipalName;
use super::realm::Realm;
use super::ticket_flags::TicketFlags;
use super::uint32::UInt32;
use super::KrbMessage;
use crate::error::{Asn1Error, KrbError};
use der::asn1::AnyRef;
use der::{Decode, Encode, Header, Reader, Sequence, SliceReader, Tag, TagNumber, Tagged};
use tracing::debug;

/// ```text
/// EncKDCRepPart   ::= SEQUENCE {
///         key             [0] EncryptionKey,
///         last-req        [1] LastReq,
///         nonce           [2] UInt32,
///         key-expiration  [3] KerberosTime OPTIONAL,
///         flags           [4] TicketFlags,
///         authtime        [5] KerberosTime,
///         starttime       [6] KerberosTime OPTIONAL,
///         endtime         [7] KerberosTime,
///         renew-till      [8] KerberosTime OPTIONAL,
///         srealm          [9] Realm,
///         sname           [10] PrincipalName,
///         caddr           [11] HostAddresses OPTIONAL,
///         encrypted-pa-data [12] SEQUENCE OF PA-DATA OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct EncKdcRepPart {
    #[asn1(context_specific = "0")]
    pub key: EncryptionKey,
    #[asn1(context_specific = "1")]
    pub last_req: LastReq,
    #[asn1(context_specific = "2")]
    pub nonce: UInt32,
    #[asn1(context_specific = "3", optional = "true")]
    pub key_expiration: Option<KerberosTime>,
    #[asn1(context_specific = "4")]
    pub flags: TicketFlags,
    #[asn1(context_specific = "5")]
    pub auth_time: KerberosTime,
    #[asn1(context_specific = "6", optional = "true")]
    pub start_time: Option<KerberosTime>,
    #[asn1(context_specific = "7")]
    pub end_time: KerberosTime,
    #[asn1(context_specific = "8", optional = "true")]
    pub renew_till: Option<KerberosTime>,
    #[asn1(context_specific = "9")]
    pub server_realm: Realm,
    #[asn1(context_specific = "10")]
    pub server_name: PrincipalName,
    #[asn1(context_specific = "11", optional = "true")]
    pub client_addresses: Option<HostAddresses>,
    #[asn1(context_specific = "12", optional = "true")]
    pub encrypted_pa_data: Option<Vec<PaData>>,
}

const LAST_FIELD: u32 = 12;

impl KrbMessage for EncKdcRepPart {
    /// Some KDCs append fields of their own to this structure, and some pad
    /// the plaintext past the end of it. Everything after the last field we
    /// know about is dropped before the strict decode.
    fn parse(bytes: &[u8]) -> Result<Self, KrbError> {
        let mut reader = SliceReader::new(bytes)?;
        let sequence = AnyRef::decode(&mut reader)?;
        if sequence.tag() != Tag::Sequence {
            debug!(tag = %sequence.tag(), "EncKDCRepPart is not a SEQUENCE");
            return Err(Asn1Error::BadId.into());
        }
        if !reader.is_finished() {
            debug!(len = %reader.remaining_len(), "ignoring data after EncKDCRepPart");
        }

        let mut kept: Vec<u8> = Vec::with_capacity(sequence.value().len());
        let mut last: Option<u32> = None;
        let mut fields = SliceReader::new(sequence.value())?;

        while !fields.is_finished() {
            let Ok(header) = Header::peek(&fields) else {
                debug!(len = %fields.remaining_len(), "ignoring undecodable trailing bytes");
                break;
            };

            match header.tag() {
                Tag::ContextSpecific {
                    constructed: true,
                    number: TagNumber(n),
                } if n <= LAST_FIELD && last.map_or(true, |l| n > l) => {
                    let Ok(field) = fields.tlv_bytes() else {
                        debug!(field = n, "ignoring truncated field");
                        break;
                    };
                    kept.extend_from_slice(field);
                    last = Some(n);
                }
                tag => {
                    debug!(%tag, "ignoring unknown trailing fields");
                    break;
                }
            }
        }

        let rebuilt = AnyRef::new(Tag::Sequence, &kept)?.to_der()?;
        let part = EncKdcRepPart::from_der(&rebuilt)?;
        part.validate()?;
        Ok(part)
    }
}
