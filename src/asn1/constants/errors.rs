use num_enum::{FromPrimitive, IntoPrimitive};

/// RFC 4120 7.5.9, RFC 4556 and RFC 6113 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum KrbErrorCode {
    KdcErrNone = 0,
    KdcErrNameExp = 1,
    KdcErrServiceExp = 2,
    KdcErrBadPvno = 3,
    KdcErrCOldMastKvno = 4,
    KdcErrSOldMastKvno = 5,
    KdcErrCPrincipalUnknown = 6,
    KdcErrSPrincipalUnknown = 7,
    KdcErrPrincipalNotUnique = 8,
    KdcErrNullKey = 9,
    KdcErrCannotPostdate = 10,
    KdcErrNeverValid = 11,
    KdcErrPolicy = 12,
    KdcErrBadoption = 13,
    KdcErrEtypeNosupp = 14,
    KdcErrSumtypeNosupp = 15,
    KdcErrPadataTypeNosupp = 16,
    KdcErrTrtypeNosupp = 17,
    KdcErrClientRevoked = 18,
    KdcErrServiceRevoked = 19,
    KdcErrTgtRevoked = 20,
    KdcErrClientNotyet = 21,
    KdcErrServiceNotyet = 22,
    KdcErrKeyExpired = 23,
    KdcErrPreauthFailed = 24,
    KdcErrPreauthRequired = 25,
    KdcErrServerNomatch = 26,
    KdcErrMustUseUser2user = 27,
    KdcErrPathNotAccepted = 28,
    KdcErrSvcUnavailable = 29,
    KrbApErrBadIntegrity = 31,
    KrbApErrTktExpired = 32,
    KrbApErrTktNyv = 33,
    KrbApErrRepeat = 34,
    KrbApErrNotUs = 35,
    KrbApErrBadmatch = 36,
    KrbApErrSkew = 37,
    KrbApErrBadaddr = 38,
    KrbApErrBadversion = 39,
    KrbApErrMsgType = 40,
    KrbApErrModified = 41,
    KrbApErrBadorder = 42,
    KrbApErrBadkeyver = 44,
    KrbApErrNokey = 45,
    KrbApErrMutFail = 46,
    KrbApErrBaddirection = 47,
    KrbApErrMethod = 48,
    KrbApErrBadseq = 49,
    KrbApErrInappCksum = 50,
    KrbApPathNotAccepted = 51,
    KrbErrResponseTooBig = 52,
    KrbErrGeneric = 60,
    KrbErrFieldToolong = 61,
    KdcErrClientNotTrusted = 62,
    KdcErrKdcNotTrusted = 63,
    KdcErrInvalidSig = 64,
    KdcErrKeyTooWeak = 65,
    KdcErrCertificateMismatch = 66,
    KrbApErrNoTgt = 67,
    KdcErrWrongRealm = 68,
    KrbApErrUserToUserRequired = 69,
    KdcErrCantVerifyCertificate = 70,
    KdcErrInvalidCertificate = 71,
    KdcErrRevokedCertificate = 72,
    KdcErrRevocationStatusUnknown = 73,
    KdcErrRevocationStatusUnavailable = 74,
    KdcErrClientNameMismatch = 75,
    KdcErrKdcNameMismatch = 76,
    KdcErrPreauthExpired = 90,
    KdcErrMorePreauthDataRequired = 91,
    KdcErrPreauthBadAuthenticationSet = 92,
    KdcErrUnknownCriticalFastOptions = 93,
    /// A code outside of the catalog, kept as sent.
    #[num_enum(catch_all)]
    Unknown(i32),
}

impl KrbErrorCode {
    /// Map a code received on the wire.
    pub fn from_wire(code: i32) -> Self {
        let known = KrbErrorCode::from(code);
        if let KrbErrorCode::Unknown(code) = known {
            tracing::debug!(code, "unknown error code");
        }
        known
    }

    pub fn message(self) -> &'static str {
        match self {
            KrbErrorCode::KdcErrNone => "No error",
            KrbErrorCode::KdcErrNameExp => "Client's entry in database expired",
            KrbErrorCode::KdcErrServiceExp => "Server's entry in database has expired",
            KrbErrorCode::KdcErrBadPvno => "Requested protocol version number not supported",
            KrbErrorCode::KdcErrCOldMastKvno => "Client's key encrypted in old master key",
            KrbErrorCode::KdcErrSOldMastKvno => "Server's key encrypted in old master key",
            KrbErrorCode::KdcErrCPrincipalUnknown => "Client not found in Kerberos database",
            KrbErrorCode::KdcErrSPrincipalUnknown => "Server not found in Kerberos database",
            KrbErrorCode::KdcErrPrincipalNotUnique => "Multiple principal entries in database",
            KrbErrorCode::KdcErrNullKey => "The client or server has a null key",
            KrbErrorCode::KdcErrCannotPostdate => "Ticket not eligible for postdating",
            KrbErrorCode::KdcErrNeverValid => "Requested start time is later than end time",
            KrbErrorCode::KdcErrPolicy => "KDC policy rejects request",
            KrbErrorCode::KdcErrBadoption => "KDC cannot accommodate requested option",
            KrbErrorCode::KdcErrEtypeNosupp => "KDC has no support for encryption type",
            KrbErrorCode::KdcErrSumtypeNosupp => "KDC has no support for checksum type",
            KrbErrorCode::KdcErrPadataTypeNosupp => "KDC has no support for padata type",
            KrbErrorCode::KdcErrTrtypeNosupp => "KDC has no support for transited type",
            KrbErrorCode::KdcErrClientRevoked => "Clients credentials have been revoked",
            KrbErrorCode::KdcErrServiceRevoked => "Credentials for server have been revoked",
            KrbErrorCode::KdcErrTgtRevoked => "TGT has been revoked",
            KrbErrorCode::KdcErrClientNotyet => "Client not yet valid - try again later",
            KrbErrorCode::KdcErrServiceNotyet => "Server not yet valid - try again later",
            KrbErrorCode::KdcErrKeyExpired => "Password has expired - change password to reset",
            KrbErrorCode::KdcErrPreauthFailed => "Pre-authentication information was invalid",
            KrbErrorCode::KdcErrPreauthRequired => "Additional pre-authentication required",
            KrbErrorCode::KdcErrServerNomatch => "Requested server and ticket don't match",
            KrbErrorCode::KdcErrMustUseUser2user => "Server principal valid for user2user only",
            KrbErrorCode::KdcErrPathNotAccepted => "KDC Policy rejects transited path",
            KrbErrorCode::KdcErrSvcUnavailable => "A service is not available",
            KrbErrorCode::KrbApErrBadIntegrity => "Integrity check on decrypted field failed",
            KrbErrorCode::KrbApErrTktExpired => "Ticket expired",
            KrbErrorCode::KrbApErrTktNyv => "Ticket not yet valid",
            KrbErrorCode::KrbApErrRepeat => "Request is a replay",
            KrbErrorCode::KrbApErrNotUs => "The ticket isn't for us",
            KrbErrorCode::KrbApErrBadmatch => "Ticket and authenticator don't match",
            KrbErrorCode::KrbApErrSkew => "Clock skew too great",
            KrbErrorCode::KrbApErrBadaddr => "Incorrect net address",
            KrbErrorCode::KrbApErrBadversion => "Protocol version mismatch",
            KrbErrorCode::KrbApErrMsgType => "Invalid msg type",
            KrbErrorCode::KrbApErrModified => "Message stream modified",
            KrbErrorCode::KrbApErrBadorder => "Message out of order",
            KrbErrorCode::KrbApErrBadkeyver => "Specified version of key is not available",
            KrbErrorCode::KrbApErrNokey => "Service key not available",
            KrbErrorCode::KrbApErrMutFail => "Mutual authentication failed",
            KrbErrorCode::KrbApErrBaddirection => "Incorrect message direction",
            KrbErrorCode::KrbApErrMethod => "Alternative authentication method required",
            KrbErrorCode::KrbApErrBadseq => "Incorrect sequence number in message",
            KrbErrorCode::KrbApErrInappCksum => "Inappropriate type of checksum in message",
            KrbErrorCode::KrbApPathNotAccepted => "Policy rejects transited path",
            KrbErrorCode::KrbErrResponseTooBig => "Response too big for UDP, retry with TCP",
            KrbErrorCode::KrbErrGeneric => "Generic error (description in e-text)",
            KrbErrorCode::KrbErrFieldToolong => "Field is too long for this implementation",
            KrbErrorCode::KdcErrClientNotTrusted => "Client is not trusted",
            KrbErrorCode::KdcErrKdcNotTrusted => "KDC is not trusted",
            KrbErrorCode::KdcErrInvalidSig => "Invalid signature",
            KrbErrorCode::KdcErrKeyTooWeak => "Key parameters not accepted",
            KrbErrorCode::KdcErrCertificateMismatch => "Certificate mismatch",
            KrbErrorCode::KrbApErrNoTgt => "No TGT available to validate USER-TO-USER",
            KrbErrorCode::KdcErrWrongRealm => "Wrong realm",
            KrbErrorCode::KrbApErrUserToUserRequired => "Ticket must be for USER-TO-USER",
            KrbErrorCode::KdcErrCantVerifyCertificate => "Can't verify certificate",
            KrbErrorCode::KdcErrInvalidCertificate => "Invalid certificate",
            KrbErrorCode::KdcErrRevokedCertificate => "Revoked certificate",
            KrbErrorCode::KdcErrRevocationStatusUnknown => "Revocation status unknown",
            KrbErrorCode::KdcErrRevocationStatusUnavailable => "Revocation status unavailable",
            KrbErrorCode::KdcErrClientNameMismatch => "Client name mismatch",
            KrbErrorCode::KdcErrKdcNameMismatch => "KDC name mismatch",
            KrbErrorCode::KdcErrPreauthExpired => "Pre-authentication data has expired",
            KrbErrorCode::KdcErrMorePreauthDataRequired => {
                "More pre-authentication data is required"
            }
            KrbErrorCode::KdcErrPreauthBadAuthenticationSet => {
                "Pre-authentication data does not match the authentication set"
            }
            KrbErrorCode::KdcErrUnknownCriticalFastOptions => "Unknown critical FAST options",
            KrbErrorCode::Unknown(_) => "Unknown error code",
        }
    }

    /// Codes whose e-data carries METHOD-DATA.
    pub fn has_method_data(self) -> bool {
        matches!(
            self,
            KrbErrorCode::KdcErrPreauthRequired | KrbErrorCode::KdcErrPreauthFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::KrbErrorCode;

    #[test]
    fn error_code_catalog() {
        assert_eq!(i32::from(KrbErrorCode::KrbApErrBadversion), 39);
        assert_eq!(i32::from(KrbErrorCode::KrbApErrMsgType), 40);
        assert_eq!(
            KrbErrorCode::from_wire(52),
            KrbErrorCode::KrbErrResponseTooBig
        );
        // 30 is not assigned, the raw value survives the round trip.
        assert_eq!(KrbErrorCode::from_wire(30), KrbErrorCode::Unknown(30));
        assert_eq!(i32::from(KrbErrorCode::from_wire(-1765328228)), -1765328228);
        assert_eq!(KrbErrorCode::from_wire(60), KrbErrorCode::KrbErrGeneric);
        assert_eq!(KrbErrorCode::KrbApErrRepeat.message(), "Request is a replay");
        assert!(KrbErrorCode::KdcErrPreauthFailed.has_method_data());
        assert!(!KrbErrorCode::KdcErrPolicy.has_method_data());
    }
}
