use der::asn1::OctetString;
use der::Sequence;

/// ```text
/// TransitedEncoding       ::= SEQUENCE {
///        tr-type         [0] Int32 -- must be registered --,
///        contents        [1] OCTET STRING
///}
/// ````
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct TransitedEncoding {
    #[asn1(context_specific = "0")]
    pub tr_type: i32,
    #[asn1(context_specific = "1")]
    pub contents: OctetString,
}

/// DOMAIN-X500-COMPRESS
pub const TR_TYPE_DOMAIN_X500_COMPRESS: i32 = 1;
