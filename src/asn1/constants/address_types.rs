use num_enum::{IntoPrimitive, TryFromPrimitive};

/// RFC 4120 7.5.3
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum AddressType {
    Ipv4 = 2,
    Directional = 3,
    ChaosNet = 5,
    Xns = 6,
    Iso = 7,
    DecnetPhaseIv = 12,
    AppletalkDdp = 16,
    NetBios = 20,
    Ipv6 = 24,
}
