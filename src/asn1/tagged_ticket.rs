use super::check_version;
use super::encrypted_data::EncryptedData;
use super::principal_name::PrincipalName;
use super::realm::Realm;
use super::KrbMessage;
use crate::constants::PROTOCOL_VERSION;
use crate::error::KrbError;
use der::Sequence;

/// ```text
/// Ticket          ::= [APPLICATION 1] SEQUENCE {
///         tkt-vno         [0] INTEGER (5),
///         realm           [1] Realm,
///         sname           [2] PrincipalName,
///         enc-part        [3] EncryptedData -- EncTicketPart
/// }
/// ````
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct Ticket {
    #[asn1(context_specific = "0")]
    pub tkt_vno: i32,
    #[asn1(context_specific = "1")]
    pub realm: Realm,
    #[asn1(context_specific = "2")]
    pub sname: PrincipalName,
    #[asn1(context_specific = "3")]
    pub enc_part: EncryptedData,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TaggedTicket(pub Ticket);

application_tagged!(TaggedTicket, Ticket, 1);

impl TaggedTicket {
    pub fn new(realm: Realm, sname: PrincipalName, enc_part: EncryptedData) -> Self {
        TaggedTicket(Ticket {
            tkt_vno: PROTOCOL_VERSION,
            realm,
            sname,
            enc_part,
        })
    }
}

impl KrbMessage for TaggedTicket {
    fn validate(&self) -> Result<(), KrbError> {
        check_version(self.0.tkt_vno)
    }
}
