use super::kerberos_string::KerberosString;

/// ```text
/// Realm           ::= KerberosString
/// ```
pub type Realm = KerberosString;
