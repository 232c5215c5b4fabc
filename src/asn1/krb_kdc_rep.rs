use super::constants::KrbMessageType;
use super::kdc_rep::KdcRep;
use super::krb_error::KrbErrorMsg;
use super::KrbMessage;
use crate::error::KrbError;

/// ```text
/// AS-REP          ::= [APPLICATION 11] KDC-REP
///
/// TGS-REP         ::= [APPLICATION 13] KDC-REP
///
/// KRB-ERROR       ::= [APPLICATION 30] SEQUENCE { ... }
/// ```
///
/// Everything a KDC may answer with.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum KrbKdcRep {
    AsRep(KdcRep),
    TgsRep(KdcRep),
    ErrRep(KrbErrorMsg),
}

application_choice!(KrbKdcRep {
    AsRep(KdcRep) = 11,
    TgsRep(KdcRep) = 13,
    ErrRep(KrbErrorMsg) = 30,
});

impl KrbMessage for KrbKdcRep {
    fn validate(&self) -> Result<(), KrbError> {
        match self {
            KrbKdcRep::AsRep(rep) => rep.validate_as(KrbMessageType::KrbAsRep),
            KrbKdcRep::TgsRep(rep) => rep.validate_as(KrbMessageType::KrbTgsRep),
            KrbKdcRep::ErrRep(err) => err.validate(),
        }
    }
}
