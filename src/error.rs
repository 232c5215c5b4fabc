use crate::asn1::constants::errors::KrbErrorCode;
use std::fmt;

/// Encoding failures. The numeric values match the client-side ASN.1 error
/// codes used by other Kerberos implementations so they can be compared
/// across logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asn1Error {
    BadTimeFormat,
    MissingField,
    MisplacedField,
    TypeMismatch,
    Overflow,
    Overrun,
    BadId,
    BadLength,
    BadFormat,
    ParseError,
    BadClass,
    BadType,
    BadTag,
    UnsupportedType,
    CannotEncode,
}

impl Asn1Error {
    pub fn code(self) -> i32 {
        match self {
            Asn1Error::BadTimeFormat => 900,
            Asn1Error::MissingField => 901,
            Asn1Error::MisplacedField => 902,
            Asn1Error::TypeMismatch => 903,
            Asn1Error::Overflow => 904,
            Asn1Error::Overrun => 905,
            Asn1Error::BadId => 906,
            Asn1Error::BadLength => 907,
            Asn1Error::BadFormat => 908,
            Asn1Error::ParseError => 909,
            Asn1Error::BadClass => 910,
            Asn1Error::BadType => 911,
            Asn1Error::BadTag => 912,
            Asn1Error::UnsupportedType => 913,
            Asn1Error::CannotEncode => 914,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Asn1Error::BadTimeFormat => "Time format was unparsable",
            Asn1Error::MissingField => "Structure is missing a required field",
            Asn1Error::MisplacedField => "Unexpected field number",
            Asn1Error::TypeMismatch => "Type does not match the expected type",
            Asn1Error::Overflow => "Value too large",
            Asn1Error::Overrun => "Encoding ended unexpectedly",
            Asn1Error::BadId => "Identifier doesn't match expected value",
            Asn1Error::BadLength => "Length of encoded value is invalid",
            Asn1Error::BadFormat => "Badly formatted encoding",
            Asn1Error::ParseError => "Encoding could not be parsed",
            Asn1Error::BadClass => "Bad identifier class",
            Asn1Error::BadType => "Bad identifier type",
            Asn1Error::BadTag => "Bad identifier tag",
            Asn1Error::UnsupportedType => "Unsupported ASN.1 type encountered",
            Asn1Error::CannotEncode => "Value could not be encoded",
        }
    }
}

#[derive(Debug)]
pub enum KrbError {
    // =========================================================================================
    // IMPORTANT: Only protocol codes may be carried in variants. Never add variables holding
    // names, keys or message content - errors end up in userfacing contexts and any extra
    // information you add here is a potential CVE.
    //
    // If you want to debug the error, then use the error! macro at the error raise site to
    // report relevant information.
    // =========================================================================================
    /// A structure could not be decoded or encoded.
    Asn1(Asn1Error),
    /// Well formed, but wrong for the context (version, message type, nonce, replay).
    ApErr(KrbErrorCode),
    /// The KDC answered with a KRB-ERROR.
    Kdc(KrbErrorCode),

    FlagIndexOutOfRange,

    InvalidEncryptionKey,
    UnsupportedEncryption,
    MessageAuthenticationFailed,

    DerEncodeKerberosString,
    DerEncodeKerberosTime,
    DerEncodeOctetString,

    NameNotPrincipal,
    NameNumberOfComponents,
    PrincipalNameInvalidComponents,
    PrincipalNameInvalidType,
    HostAddressInvalid,

    MissingPaData,
    UnexpectedReplyType,
    ReplyClientMismatch,
    ReplyServerMismatch,

    S4u2SelfNotForwardable,
    S4u2SelfNotHonored,
    S4u2SelfTicketNotForwardable,
    S4u2ProxyNotHonored,
    S4u2ProxyMissingEvidence,
    CrossRealmS4uReferralsDisabled,

    NoTgtForRealm,
    ReferralsExhausted,

    NoKdcForRealm,
    KdcAddressInvalid,
    TransportIo,
    TransportTimeout,
    RequestTooLarge,
    ResponseTooLarge,

    ConfigIo,
    ConfigParse,

    ReplayCacheIo,
    ReplayCacheCorrupt,

    CredentialsMissingKey,
    CredentialsMissingTicketInfo,

    IoError,
    BinRWError,

    /// No really, do you have a time machine? How did you go back to before 1970?
    DoYouHaveATimeMachine,
}

impl KrbError {
    /// The protocol error code this failure would be reported as, when there is one.
    pub fn error_code(&self) -> Option<KrbErrorCode> {
        match self {
            KrbError::ApErr(code) | KrbError::Kdc(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for KrbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KrbError::Asn1(kind) => write!(f, "ASN.1 error {}: {}", kind.code(), kind.message()),
            KrbError::ApErr(code) | KrbError::Kdc(code) => {
                write!(f, "{} ({})", code.message(), i32::from(*code))
            }
            other => write!(f, "{other:?}"),
        }
    }
}

impl std::error::Error for KrbError {}

impl From<der::Error> for KrbError {
    fn from(err: der::Error) -> Self {
        let kind = match err.kind() {
            der::ErrorKind::TagUnexpected { .. } | der::ErrorKind::TrailingData { .. } => {
                Asn1Error::BadId
            }
            der::ErrorKind::Length { .. } => Asn1Error::BadLength,
            der::ErrorKind::Incomplete { .. } => Asn1Error::Overrun,
            der::ErrorKind::DateTime => Asn1Error::BadTimeFormat,
            der::ErrorKind::Overflow => Asn1Error::Overflow,
            // A mandatory explicitly tagged field that is absent or out of order.
            der::ErrorKind::Value {
                tag: der::Tag::ContextSpecific { .. },
                ..
            }
            | der::ErrorKind::Noncanonical { .. } => Asn1Error::BadId,
            der::ErrorKind::Value { .. } => Asn1Error::BadFormat,
            _ => Asn1Error::ParseError,
        };
        tracing::debug!(?err, ?kind, "der error");
        KrbError::Asn1(kind)
    }
}

impl From<Asn1Error> for KrbError {
    fn from(kind: Asn1Error) -> Self {
        KrbError::Asn1(kind)
    }
}
