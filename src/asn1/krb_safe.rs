use super::check_message;
use super::checksum::Checksum;
use super::constants::KrbMessageType;
use super::host_address::HostAddress;
use super::kerberos_time::KerberosTime;
use super::microseconds::Microseconds;
use super::uint32::UInt32;
use super::KrbMessage;
use crate::constants::PROTOCOL_VERSION;
use crate::error::KrbError;
use der::asn1::OctetString;
use der::Sequence;

/// ```text
/// KRB-SAFE-BODY   ::= SEQUENCE {
///         user-data       [0] OCTET STRING,
///         timestamp       [1] KerberosTime OPTIONAL,
///         usec            [2] Microseconds OPTIONAL,
///         seq-number      [3] UInt32 OPTIONAL,
///         s-address       [4] HostAddress,
///         r-address       [5] HostAddress OPTIONAL
/// }
/// ```
///
/// s-address is accepted as absent, since not every sender knows its own
/// address.
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KrbSafeBody {
    #[asn1(context_specific = "0")]
    pub user_data: OctetString,
    #[asn1(context_specific = "1", optional = "true")]
    pub timestamp: Option<KerberosTime>,
    #[asn1(context_specific = "2", optional = "true")]
    pub usec: Option<Microseconds>,
    #[asn1(context_specific = "3", optional = "true")]
    pub seq_number: Option<UInt32>,
    #[asn1(context_specific = "4", optional = "true")]
    pub s_address: Option<HostAddress>,
    #[asn1(context_specific = "5", optional = "true")]
    pub r_address: Option<HostAddress>,
}

/// ```text
/// KRB-SAFE        ::= [APPLICATION 20] SEQUENCE {
///         pvno            [0] INTEGER (5),
///         msg-type        [1] INTEGER (20),
///         safe-body       [2] KRB-SAFE-BODY,
///         cksum           [3] Checksum
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KrbSafeInner {
    #[asn1(context_specific = "0")]
    pub pvno: i32,
    #[asn1(context_specific = "1")]
    pub msg_type: i32,
    #[asn1(context_specific = "2")]
    pub safe_body: KrbSafeBody,
    #[asn1(context_specific = "3")]
    pub cksum: Checksum,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KrbSafe(pub KrbSafeInner);

application_tagged!(KrbSafe, KrbSafeInner, 20);

impl KrbSafe {
    pub fn new(safe_body: KrbSafeBody, cksum: Checksum) -> Self {
        KrbSafe(KrbSafeInner {
            pvno: PROTOCOL_VERSION,
            msg_type: KrbMessageType::KrbSafe.into(),
            safe_body,
            cksum,
        })
    }
}

impl KrbMessage for KrbSafe {
    fn validate(&self) -> Result<(), KrbError> {
        check_message(self.0.pvno, self.0.msg_type, KrbMessageType::KrbSafe)
    }
}
