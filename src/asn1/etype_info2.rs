use super::kerberos_string::KerberosString;
use der::asn1::OctetString;
use der::Sequence;

/// ```text
/// ETYPE-INFO2-ENTRY       ::= SEQUENCE {
///         etype           [0] Int32,
///         salt            [1] KerberosString OPTIONAL,
///         s2kparams       [2] OCTET STRING OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct ETypeInfo2Entry {
    #[asn1(context_specific = "0")]
    pub etype: i32,
    #[asn1(context_specific = "1", optional = "true")]
    pub salt: Option<KerberosString>,
    #[asn1(context_specific = "2", optional = "true")]
    pub s2kparams: Option<OctetString>,
}

/// ```text
/// ETYPE-INFO2             ::= SEQUENCE SIZE (1..MAX) OF ETYPE-INFO2-ENTRY
/// ```
pub type ETypeInfo2 = Vec<ETypeInfo2Entry>;
