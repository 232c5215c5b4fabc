use super::check_message;
use super::constants::KrbMessageType;
use super::encrypted_data::EncryptedData;
use super::KrbMessage;
use crate::constants::PROTOCOL_VERSION;
use crate::error::KrbError;
use der::Sequence;

/// ```text
/// AP-REP          ::= [APPLICATION 15] SEQUENCE {
///         pvno            [0] INTEGER (5),
///         msg-type        [1] INTEGER (15),
///         enc-part        [2] EncryptedData -- EncAPRepPart
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct ApRepInner {
    #[asn1(context_specific = "0")]
    pub pvno: i32,
    #[asn1(context_specific = "1")]
    pub msg_type: i32,
    #[asn1(context_specific = "2")]
    pub enc_part: EncryptedData,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ApRep(pub ApRepInner);

application_tagged!(ApRep, ApRepInner, 15);

impl ApRep {
    pub fn new(enc_part: EncryptedData) -> Self {
        ApRep(ApRepInner {
            pvno: PROTOCOL_VERSION,
            msg_type: KrbMessageType::KrbApRep.into(),
            enc_part,
        })
    }
}

impl KrbMessage for ApRep {
    fn validate(&self) -> Result<(), KrbError> {
        check_message(self.0.pvno, self.0.msg_type, KrbMessageType::KrbApRep)
    }
}
