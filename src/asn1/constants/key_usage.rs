use num_enum::{IntoPrimitive, TryFromPrimitive};

/// RFC 4120 7.5.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum KeyUsage {
    AsReqPaEncTimestamp = 1,
    KdcRepTicket = 2,
    AsRepEncPart = 3,
    TgsReqAuthDataSessionKey = 4,
    TgsReqAuthDataSubkey = 5,
    TgsReqPaTgsReqChecksum = 6,
    TgsReqPaTgsReqAuthenticator = 7,
    TgsRepEncPartSessionKey = 8,
    TgsRepEncPartSubkey = 9,
    ApReqAuthenticatorChecksum = 10,
    ApReqAuthenticator = 11,
    ApRepEncPart = 12,
    KrbPrivEncPart = 13,
    KrbCredEncPart = 14,
    KrbSafeChecksum = 15,
    // MS-SFU 2.2.1 KERB_NON_KERB_CKSUM_SALT
    PaForUserChecksum = 17,
}
