use super::check_message;
use super::constants::KrbMessageType;
use super::encrypted_data::EncryptedData;
use super::encryption_key::EncryptionKey;
use super::host_address::{HostAddress, HostAddresses};
use super::kerberos_time::KerberosTime;
use super::microseconds::Microseconds;
use super::principal_name::PrincipalName;
use super::realm::Realm;
use super::tagged_ticket::TaggedTicket;
use super::ticket_flags::TicketFlags;
use super::uint32::UInt32;
use super::KrbMessage;
use crate::constants::PROTOCOL_VERSION;
use crate::error::KrbError;
use der::Sequence;

/// ```text
/// KRB-CRED        ::= [APPLICATION 22] SEQUENCE {
///         pvno            [0] INTEGER (5),
///         msg-type        [1] INTEGER (22),
///         tickets         [2] SEQUENCE OF Ticket,
///         enc-part        [3] EncryptedData -- EncKrbCredPart
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KrbCredInner {
    #[asn1(context_specific = "0")]
    pub pvno: i32,
    #[asn1(context_specific = "1")]
    pub msg_type: i32,
    #[asn1(context_specific = "2")]
    pub tickets: Vec<TaggedTicket>,
    #[asn1(context_specific = "3")]
    pub enc_part: EncryptedData,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KrbCred(pub KrbCredInner);

application_tagged!(KrbCred, KrbCredInner, 22);

impl KrbCred {
    pub fn new(tickets: Vec<TaggedTicket>, enc_part: EncryptedData) -> Self {
        KrbCred(KrbCredInner {
            pvno: PROTOCOL_VERSION,
            msg_type: KrbMessageType::KrbCred.into(),
            tickets,
            enc_part,
        })
    }
}

impl KrbMessage for KrbCred {
    fn validate(&self) -> Result<(), KrbError> {
        check_message(self.0.pvno, self.0.msg_type, KrbMessageType::KrbCred)?;
        self.0.tickets.iter().try_for_each(|t| t.validate())
    }
}

/// ```text
/// KrbCredInfo     ::= SEQUENCE {
///         key             [0] EncryptionKey,
///         prealm          [1] Realm OPTIONAL,
///         pname           [2] PrincipalName OPTIONAL,
///         flags           [3] TicketFlags OPTIONAL,
///         authtime        [4] KerberosTime OPTIONAL,
///         starttime       [5] KerberosTime OPTIONAL,
///         endtime         [6] KerberosTime OPTIONAL,
///         renew-till      [7] KerberosTime OPTIONAL,
///         srealm          [8] Realm OPTIONAL,
///         sname           [9] PrincipalName OPTIONAL,
///         caddr           [10] HostAddresses OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KrbCredInfo {
    #[asn1(context_specific = "0")]
    pub key: EncryptionKey,
    #[asn1(context_specific = "1", optional = "true")]
    pub prealm: Option<Realm>,
    #[asn1(context_specific = "2", optional = "true")]
    pub pname: Option<PrincipalName>,
    #[asn1(context_specific = "3", optional = "true")]
    pub flags: Option<TicketFlags>,
    #[asn1(context_specific = "4", optional = "true")]
    pub authtime: Option<KerberosTime>,
    #[asn1(context_specific = "5", optional = "true")]
    pub starttime: Option<KerberosTime>,
    #[asn1(context_specific = "6", optional = "true")]
    pub endtime: Option<KerberosTime>,
    #[asn1(context_specific = "7", optional = "true")]
    pub renew_till: Option<KerberosTime>,
    #[asn1(context_specific = "8", optional = "true")]
    pub srealm: Option<Realm>,
    #[asn1(context_specific = "9", optional = "true")]
    pub sname: Option<PrincipalName>,
    #[asn1(context_specific = "10", optional = "true")]
    pub caddr: Option<HostAddresses>,
}

/// ```text
/// EncKrbCredPart  ::= [APPLICATION 29] SEQUENCE {
///         ticket-info     [0] SEQUENCE OF KrbCredInfo,
///         nonce           [1] UInt32 OPTIONAL,
///         timestamp       [2] KerberosTime OPTIONAL,
///         usec            [3] Microseconds OPTIONAL,
///         s-address       [4] HostAddress OPTIONAL,
///         r-address       [5] HostAddress OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct EncKrbCredPartInner {
    #[asn1(context_specific = "0")]
    pub ticket_info: Vec<KrbCredInfo>,
    #[asn1(context_specific = "1", optional = "true")]
    pub nonce: Option<UInt32>,
    #[asn1(context_specific = "2", optional = "true")]
    pub timestamp: Option<KerberosTime>,
    #[asn1(context_specific = "3", optional = "true")]
    pub usec: Option<Microseconds>,
    #[asn1(context_specific = "4", optional = "true")]
    pub s_address: Option<HostAddress>,
    #[asn1(context_specific = "5", optional = "true")]
    pub r_address: Option<HostAddress>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EncKrbCredPart(pub EncKrbCredPartInner);

application_tagged!(EncKrbCredPart, EncKrbCredPartInner, 29);

impl KrbMessage for EncKrbCredPart {}

#[cfg(test)]
mod tests {
    use super::{EncKrbCredPart, EncKrbCredPartInner, KrbCred, KrbCredInfo};
    use crate::asn1::constants::{EncryptionType, PrincipalNameType};
    use crate::asn1::encrypted_data::EncryptedData;
    use crate::asn1::encryption_key::EncryptionKey;
    use crate::asn1::kerberos_string::KerberosString;
    use crate::asn1::principal_name::PrincipalName;
    use crate::asn1::tagged_ticket::TaggedTicket;
    use crate::asn1::ticket_flags::TicketFlags;
    use crate::asn1::KrbMessage;
    use crate::error::{Asn1Error, KrbError};
    use der::asn1::OctetString;

    fn key() -> EncryptionKey {
        EncryptionKey {
            key_type: EncryptionType::AES256_CTS_HMAC_SHA1_96 as i32,
            key_value: OctetString::new(vec![0x42; 32]).expect("Failed to build key"),
        }
    }

    #[test]
    fn krb_cred_info_minimal_and_full() {
        let minimal = KrbCredInfo {
            key: key(),
            prealm: None,
            pname: None,
            flags: None,
            authtime: None,
            starttime: None,
            endtime: None,
            renew_till: None,
            srealm: None,
            sname: None,
            caddr: None,
        };
        let full = KrbCredInfo {
            prealm: Some(KerberosString::new("EXAMPLE.COM").expect("Failed to build realm")),
            pname: Some(
                PrincipalName::new(PrincipalNameType::NtPrincipal, &["alice"])
                    .expect("Failed to build name"),
            ),
            flags: Some(TicketFlags::Forwarded | TicketFlags::Forwardable),
            srealm: Some(KerberosString::new("EXAMPLE.COM").expect("Failed to build realm")),
            ..minimal.clone()
        };

        let part = EncKrbCredPart(EncKrbCredPartInner {
            ticket_info: vec![minimal, full],
            nonce: None,
            timestamp: None,
            usec: None,
            s_address: None,
            r_address: None,
        });
        let der_bytes = part.asn1_encode().expect("Failed to encode");
        assert_eq!(der_bytes[0], 0x7d);
        let decoded = EncKrbCredPart::parse(&der_bytes).expect("Failed to parse");
        assert_eq!(decoded, part);
        assert!(decoded.0.ticket_info[0].pname.is_none());
        assert_eq!(
            decoded.0.ticket_info[1].flags,
            Some(TicketFlags::Forwarded | TicketFlags::Forwardable)
        );
    }

    #[test]
    fn krb_cred_tickets() {
        let ticket = TaggedTicket::new(
            KerberosString::new("EXAMPLE.COM").expect("Failed to build realm"),
            PrincipalName::new(PrincipalNameType::NtSrvInst, &["krbtgt", "EXAMPLE.COM"])
                .expect("Failed to build name"),
            EncryptedData {
                etype: EncryptionType::AES256_CTS_HMAC_SHA1_96 as i32,
                kvno: None,
                cipher: OctetString::new(vec![0x10; 8]).expect("Failed to build cipher"),
            },
        );
        let cred = KrbCred::new(
            vec![ticket],
            EncryptedData {
                etype: EncryptionType::NULL as i32,
                kvno: None,
                cipher: OctetString::new(vec![0x30, 0x00]).expect("Failed to build cipher"),
            },
        );
        let der_bytes = cred.asn1_encode().expect("Failed to encode");
        assert_eq!(der_bytes[0], 0x76);
        assert_eq!(KrbCred::parse(&der_bytes).expect("Failed to parse"), cred);
    }

    #[test]
    fn krb_cred_rejects_trailing_data() {
        let cred = KrbCred::new(
            vec![],
            EncryptedData {
                etype: EncryptionType::NULL as i32,
                kvno: None,
                cipher: OctetString::new(vec![0x30, 0x00]).expect("Failed to build cipher"),
            },
        );
        let mut der_bytes = cred.asn1_encode().expect("Failed to encode");
        der_bytes.push(0x00);
        assert!(matches!(
            KrbCred::parse(&der_bytes),
            Err(KrbError::Asn1(Asn1Error::BadId))
        ));
    }
}
