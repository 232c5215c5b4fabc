use crate::error::KrbError;
use std::time::{Duration, SystemTime};

/// ```text
/// KerberosTime    ::= GeneralizedTime -- with no fractional seconds
/// ```
pub type KerberosTime = der::asn1::GeneralizedTime;

/// Split a timestamp into the whole seconds carried by a KerberosTime and the
/// microseconds that travel alongside it in a separate field.
pub(crate) fn split_system_time(t: SystemTime) -> Result<(KerberosTime, u32), KrbError> {
    let since_epoch = t
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|_| KrbError::DoYouHaveATimeMachine)?;
    let usec = since_epoch.subsec_micros();
    let secs = Duration::from_secs(since_epoch.as_secs());
    let kt = KerberosTime::from_unix_duration(secs).map_err(|_| KrbError::DerEncodeKerberosTime)?;
    Ok((kt, usec))
}

pub(crate) fn to_kerberos_time(t: SystemTime) -> Result<KerberosTime, KrbError> {
    split_system_time(t).map(|(kt, _)| kt)
}

pub(crate) fn join_system_time(kt: &KerberosTime, usec: u32) -> SystemTime {
    kt.to_system_time() + Duration::from_micros(u64::from(usec))
}
