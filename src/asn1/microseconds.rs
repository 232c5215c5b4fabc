/// ```text
/// Microseconds    ::= INTEGER (0..999999)
///                     -- microseconds
/// ```
pub type Microseconds = u32;
