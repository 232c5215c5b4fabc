use bitmask_enum::bitmask;
use der::Sequence;

/// MS-KILE 2.2.10
///
/// ```text
/// PACOptionFlags ::= KerberosFlags
///         -- Claims (0)
///         -- Branch Aware (1)
///         -- Forward to Full DC (2)
///         -- Resource-based Constrained Delegation (3)
/// ```
#[bitmask(u32)]
pub enum PacOptionFlags {
    Claims = 1 << 0,
    BranchAware = 1 << 1,
    ForwardToFullDc = 1 << 2,
    ResourceBasedConstrainedDelegation = 1 << 3,
}

kerberos_flags!(PacOptionFlags);

/// ```text
/// PA-PAC-OPTIONS ::= SEQUENCE {
///         -- PA TYPE 167
///         options                 [0] PACOptionFlags
/// }
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Sequence)]
pub struct PaPacOptions {
    #[asn1(context_specific = "0")]
    pub options: PacOptionFlags,
}

#[cfg(test)]
mod tests {
    use super::{PaPacOptions, PacOptionFlags};
    use der::{Decode, Encode};

    #[test]
    fn pa_pac_options_rbcd() {
        let pa = PaPacOptions {
            options: PacOptionFlags::Claims | PacOptionFlags::ResourceBasedConstrainedDelegation,
        };
        let der_bytes = pa.to_der().expect("Failed to encode");
        assert_eq!(
            der_bytes,
            [0x30, 0x09, 0xa0, 0x07, 0x03, 0x05, 0x00, 0x90, 0x00, 0x00, 0x00]
        );
        let decoded = PaPacOptions::from_der(&der_bytes).expect("Failed to decode");
        assert!(decoded
            .options
            .contains(PacOptionFlags::ResourceBasedConstrainedDelegation));
        assert!(!decoded.options.contains(PacOptionFlags::BranchAware));
    }
}
