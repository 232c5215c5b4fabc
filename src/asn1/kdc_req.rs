use super::check_message;
use super::constants::KrbMessageType;
use super::kdc_req_body::KdcReqBody;
use super::pa_data::PaData;
use crate::constants::PROTOCOL_VERSION;
use crate::error::{Asn1Error, KrbError};
use der::Sequence;
use tracing::debug;

/// ```text
/// KDC-REQ         ::= SEQUENCE {
///         -- NOTE: first tag is [1], not [0]
///         pvno            [1] INTEGER (5) ,
///         msg-type        [2] INTEGER (10 -- AS -- | 12 -- TGS --),
///         padata          [3] SEQUENCE OF PA-DATA OPTIONAL
///                             -- NOTE: not empty --,
///         req-body        [4] KDC-REQ-BODY
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KdcReq {
    #[asn1(context_specific = "1")]
    pub pvno: i32,
    #[asn1(context_specific = "2")]
    pub msg_type: i32,
    #[asn1(context_specific = "3", optional = "true")]
    pub padata: Option<Vec<PaData>>,
    #[asn1(context_specific = "4")]
    pub req_body: KdcReqBody,
}

impl KdcReq {
    pub fn new(msg_type: KrbMessageType, padata: Option<Vec<PaData>>, req_body: KdcReqBody) -> Self {
        KdcReq {
            pvno: PROTOCOL_VERSION,
            msg_type: msg_type.into(),
            padata,
            req_body,
        }
    }

    pub(crate) fn validate_as(&self, expect: KrbMessageType) -> Result<(), KrbError> {
        check_message(self.pvno, self.msg_type, expect)?;

        if expect != KrbMessageType::KrbAsReq && self.req_body.cname.is_some() {
            debug!("cname is only permitted in an AS-REQ");
            return Err(Asn1Error::BadId.into());
        }

        if self.req_body.etype.is_empty() {
            debug!("request carries no encryption types");
            return Err(Asn1Error::MissingField.into());
        }

        Ok(())
    }
}
