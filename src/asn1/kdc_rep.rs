use super::check_message;
use super::constants::KrbMessageType;
use super::encrypted_data::EncryptedData;
use super::pa_data::PaData;
use super::principal_name::PrincipalName;
use super::realm::Realm;
use super::tagged_ticket::TaggedTicket;
use super::KrbMessage;
use crate::constants::PROTOCOL_VERSION;
use crate::error::KrbError;
use der::Sequence;

/// ```text
/// KDC-REP         ::= SEQUENCE {
///         pvno            [0] INTEGER (5),
///         msg-type        [1] INTEGER (11 -- AS -- | 13 -- TGS --),
///         padata          [2] SEQUENCE OF PA-DATA OPTIONAL
///                                 -- NOTE: not empty --,
///         crealm          [3] Realm,
///         cname           [4] PrincipalName,
///         ticket          [5] Ticket,
///         enc-part        [6] EncryptedData
///                                 -- EncASRepPart or EncTGSRepPart,
///                                 -- as appropriate
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KdcRep {
    #[asn1(context_specific = "0")]
    pub pvno: i32,
    #[asn1(context_specific = "1")]
    pub msg_type: i32,
    #[asn1(context_specific = "2", optional = "true")]
    pub padata: Option<Vec<PaData>>,
    #[asn1(context_specific = "3")]
    pub crealm: Realm,
    #[asn1(context_specific = "4")]
    pub cname: PrincipalName,
    #[asn1(context_specific = "5")]
    pub ticket: TaggedTicket,
    #[asn1(context_specific = "6")]
    pub enc_part: EncryptedData,
}

impl KdcRep {
    pub fn new(
        msg_type: KrbMessageType,
        padata: Option<Vec<PaData>>,
        crealm: Realm,
        cname: PrincipalName,
        ticket: TaggedTicket,
        enc_part: EncryptedData,
    ) -> Self {
        KdcRep {
            pvno: PROTOCOL_VERSION,
            msg_type: msg_type.into(),
            padata,
            crealm,
            cname,
            ticket,
            enc_part,
        }
    }

    pub(crate) fn validate_as(&self, expect: KrbMessageType) -> Result<(), KrbError> {
        check_message(self.pvno, self.msg_type, expect)?;
        self.ticket.validate()
    }
}
