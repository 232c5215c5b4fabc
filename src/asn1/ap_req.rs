use super::ap_options::ApOptions;
use super::check_message;
use super::constants::KrbMessageType;
use super::encrypted_data::EncryptedData;
use super::tagged_ticket::TaggedTicket;
use super::KrbMessage;
use crate::constants::PROTOCOL_VERSION;
use crate::error::KrbError;
use der::Sequence;

/// ```text
/// AP-REQ          ::= [APPLICATION 14] SEQUENCE {
///            pvno            [0] INTEGER (5),
///            msg-type        [1] INTEGER (14),
///            ap-options      [2] APOptions,
///            ticket          [3] Ticket,
///            authenticator   [4] EncryptedData -- Authenticator
///    }
///```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct ApReqInner {
    #[asn1(context_specific = "0")]
    pub pvno: i32,
    #[asn1(context_specific = "1")]
    pub msg_type: i32,
    #[asn1(context_specific = "2")]
    // The flags affect the way the request is processed.
    pub ap_options: ApOptions,
    #[asn1(context_specific = "3")]
    // This field is a ticket authenticating the client to the server.
    pub ticket: TaggedTicket,
    #[asn1(context_specific = "4")]
    // This contains the encrypted authenticator, which includes the client's choice of a subkey.
    pub authenticator: EncryptedData,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ApReq(pub ApReqInner);

application_tagged!(ApReq, ApReqInner, 14);

impl ApReq {
    pub fn new(ap_options: ApOptions, ticket: TaggedTicket, authenticator: EncryptedData) -> Self {
        let inner = ApReqInner {
            pvno: PROTOCOL_VERSION,
            msg_type: KrbMessageType::KrbApReq.into(),
            ap_options,
            ticket,
            authenticator,
        };
        Self(inner)
    }
}

impl KrbMessage for ApReq {
    fn validate(&self) -> Result<(), KrbError> {
        check_message(self.0.pvno, self.0.msg_type, KrbMessageType::KrbApReq)?;
        self.0.ticket.validate()
    }
}
