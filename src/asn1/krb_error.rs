use super::check_message;
use super::checksum::Checksum;
use super::constants::{KrbErrorCode, KrbMessageType};
use super::kerberos_string::KerberosString;
use super::kerberos_time::KerberosTime;
use super::microseconds::Microseconds;
use super::pa_data::PaData;
use super::principal_name::PrincipalName;
use super::realm::Realm;
use super::KrbMessage;
use crate::error::KrbError;
use der::asn1::OctetString;
use der::{Decode, Sequence};
use tracing::debug;

/// ```text
/// KRB-ERROR       ::= [APPLICATION 30] SEQUENCE {
///         pvno            [0] INTEGER (5),
///         msg-type        [1] INTEGER (30),
///         ctime           [2] KerberosTime OPTIONAL,
///         cusec           [3] Microseconds OPTIONAL,
///         stime           [4] KerberosTime,
///         susec           [5] Microseconds,
///         error-code      [6] Int32,
///         crealm          [7] Realm OPTIONAL,
///         cname           [8] PrincipalName OPTIONAL,
///         realm           [9] Realm -- service realm --,
///         sname           [10] PrincipalName -- service name --,
///         e-text          [11] KerberosString OPTIONAL,
///         e-data          [12] OCTET STRING OPTIONAL
/// }
/// ```
///
/// RFC 1510 also defined `e-cksum [13] Checksum OPTIONAL`, which is still
/// accepted.
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KrbErrorMsg {
    #[asn1(context_specific = "0")]
    pub pvno: i32,
    #[asn1(context_specific = "1")]
    pub msg_type: i32,
    #[asn1(context_specific = "2", optional = "true")]
    pub ctime: Option<KerberosTime>,
    #[asn1(context_specific = "3", optional = "true")]
    pub cusec: Option<Microseconds>,
    #[asn1(context_specific = "4")]
    pub stime: KerberosTime,
    #[asn1(context_specific = "5")]
    pub susec: Microseconds,
    #[asn1(context_specific = "6")]
    pub error_code: i32,
    #[asn1(context_specific = "7", optional = "true")]
    pub crealm: Option<Realm>,
    #[asn1(context_specific = "8", optional = "true")]
    pub cname: Option<PrincipalName>,
    #[asn1(context_specific = "9")]
    pub service_realm: Realm,
    #[asn1(context_specific = "10")]
    pub service_name: PrincipalName,
    #[asn1(context_specific = "11", optional = "true")]
    pub error_text: Option<KerberosString>,
    #[asn1(context_specific = "12", optional = "true")]
    pub error_data: Option<OctetString>,
    #[asn1(context_specific = "13", optional = "true")]
    pub error_checksum: Option<Checksum>,
}

/// ```text
/// METHOD-DATA     ::= SEQUENCE OF PA-DATA
/// ```
pub type MethodData = Vec<PaData>;

impl KrbErrorMsg {
    pub fn error_code(&self) -> KrbErrorCode {
        KrbErrorCode::from_wire(self.error_code)
    }

    /// e-data is only given structure for the pre-authentication errors,
    /// where it carries METHOD-DATA. Anything else is application specific
    /// and is left as bytes.
    pub fn parse_e_data(&self) -> Option<MethodData> {
        let e_data = self.error_data.as_ref()?;
        let code = self.error_code();

        if !code.has_method_data() {
            debug!(?code, e_data = %hex::encode(e_data.as_bytes()), "unstructured e-data");
            return None;
        }

        match MethodData::from_der(e_data.as_bytes()) {
            Ok(method_data) => Some(method_data),
            Err(err) => {
                debug!(?err, ?code, "e-data is not METHOD-DATA");
                None
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), KrbError> {
        check_message(self.pvno, self.msg_type, KrbMessageType::KrbError)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TaggedKrbError(pub KrbErrorMsg);

application_tagged!(TaggedKrbError, KrbErrorMsg, 30);

impl KrbMessage for TaggedKrbError {
    fn validate(&self) -> Result<(), KrbError> {
        self.0.validate()
    }
}
