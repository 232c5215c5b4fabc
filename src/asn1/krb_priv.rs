use super::check_message;
use super::constants::KrbMessageType;
use super::encrypted_data::EncryptedData;
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
/// KRB-PRIV        ::= [APPLICATION 21] SEQUENCE {
///         pvno            [0] INTEGER (5),
///         msg-type        [1] INTEGER (21),
///                         -- NOTE: there is no [2] tag
///         enc-part        [3] EncryptedData -- EncKrbPrivPart
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KrbPrivInner {
    #[asn1(context_specific = "0")]
    pub pvno: i32,
    #[asn1(context_specific = "1")]
    pub msg_type: i32,
    #[asn1(context_specific = "3")]
    pub enc_part: EncryptedData,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KrbPriv(pub KrbPrivInner);

application_tagged!(KrbPriv, KrbPrivInner, 21);

impl KrbPriv {
    pub fn new(enc_part: EncryptedData) -> Self {
        KrbPriv(KrbPrivInner {
            pvno: PROTOCOL_VERSION,
            msg_type: KrbMessageType::KrbPriv.into(),
            enc_part,
        })
    }
}

impl KrbMessage for KrbPriv {
    fn validate(&self) -> Result<(), KrbError> {
        check_message(self.0.pvno, self.0.msg_type, KrbMessageType::KrbPriv)
    }
}

/// ```text
/// EncKrbPrivPart  ::= [APPLICATION 28] SEQUENCE {
///         user-data       [0] OCTET STRING,
///         timestamp       [1] KerberosTime OPTIONAL,
///         usec            [2] Microseconds OPTIONAL,
///         seq-number      [3] UInt32 OPTIONAL,
///         s-address       [4] HostAddress -- sender's addr --,
///         r-address       [5] HostAddress OPTIONAL -- recip's addr
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct EncKrbPrivPartInner {
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

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EncKrbPrivPart(pub EncKrbPrivPartInner);

application_tagged!(EncKrbPrivPart, EncKrbPrivPartInner, 28);

impl KrbMessage for EncKrbPrivPart {}
