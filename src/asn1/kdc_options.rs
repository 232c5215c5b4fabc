use super::kerberos_flags::KerberosFlags;
use crate::config::LibDefaults;
use tracing::trace;

/// ```text
/// KDCOptions      ::= KerberosFlags
/// ````
pub type KdcOptions = KerberosFlags;

impl KerberosFlags {
    /// Request options seeded from the `forwardable`, `proxiable` and
    /// `renewable` defaults. Defaults that are not configured are skipped.
    pub fn from_defaults(defaults: &LibDefaults) -> Self {
        let mut options = KerberosFlags::none();

        if defaults.forwardable == Some(true) {
            options |= KerberosFlags::Forwardable;
        }
        if defaults.proxiable == Some(true) {
            options |= KerberosFlags::Proxiable;
        }
        if defaults.renewable == Some(true) {
            options |= KerberosFlags::RenewableOk;
        }

        trace!(?options, "default kdc options");
        options
    }
}
