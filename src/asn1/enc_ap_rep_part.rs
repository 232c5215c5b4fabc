use super::encryption_key::EncryptionKey;
use super::kerberos_time::KerberosTime;
use super::microseconds::Microseconds;
use super::uint32::UInt32;
use super::KrbMessage;
use der::Sequence;

/// ```text
/// EncAPRepPart    ::= [APPLICATION 27] SEQUENCE {
///         ctime           [0] KerberosTime,
///         cusec           [1] Microseconds,
///         subkey          [2] EncryptionKey OPTIONAL,
///         seq-number      [3] UInt32 OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct EncApRepPartInner {
    #[asn1(context_specific = "0")]
    pub ctime: KerberosTime,
    #[asn1(context_specific = "1")]
    pub cusec: Microseconds,
    #[asn1(context_specific = "2", optional = "true")]
    pub subkey: Option<EncryptionKey>,
    #[asn1(context_specific = "3", optional = "true")]
    pub seq_number: Option<UInt32>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EncApRepPart(pub EncApRepPartInner);

application_tagged!(EncApRepPart, EncApRepPartInner, 27);

impl KrbMessage for EncApRepPart {}
