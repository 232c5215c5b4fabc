use std::time::Duration;

/// pvno, tkt-vno and authenticator-vno are all fixed to 5.
pub const PROTOCOL_VERSION: i32 = 5;

pub(crate) const DEFAULT_IO_MAX_SIZE: usize = 32 * 1024;

pub(crate) const DEFAULT_KDC_PORT: u16 = 88;

// RFC 4120 7.2.1 - 1500 octet ethernet MTU minus IP and UDP headers.
pub(crate) const DEFAULT_UDP_PREFERENCE_LIMIT: usize = 1465;
pub(crate) const MAX_UDP_PREFERENCE_LIMIT: usize = 32700;

pub(crate) const DEFAULT_KDC_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_KDC_MAX_RETRIES: u32 = 3;
pub(crate) const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);
pub(crate) const DEFAULT_MAX_REFERRALS: usize = 5;

pub(crate) const TGS_SERVICE_NAME: &str = "krbtgt";

// MS-SFU 2.2.1 - the auth-package of PA-FOR-USER.
pub(crate) const S4U_AUTH_PACKAGE: &str = "Kerberos";
