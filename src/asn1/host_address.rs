use super::constants::AddressType;
use crate::error::KrbError;
use der::asn1::OctetString;
use der::Sequence;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// ```text
/// HostAddress     ::= SEQUENCE  {
///         addr-type       [0] Int32,
///         address         [1] OCTET STRING
/// }
/// ````
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct HostAddress {
    #[asn1(context_specific = "0")]
    pub addr_type: i32,
    #[asn1(context_specific = "1")]
    pub address: OctetString,
}

/// ```text
/// -- NOTE: HostAddresses is always used as an OPTIONAL field and
/// -- should not be empty.
/// HostAddresses   -- NOTE: subtly different from rfc1510,
///                 -- but has a value mapping and encodes the same
///         ::= SEQUENCE OF HostAddress
/// ```
pub type HostAddresses = Vec<HostAddress>;

impl TryFrom<IpAddr> for HostAddress {
    type Error = KrbError;

    fn try_from(ip: IpAddr) -> Result<Self, KrbError> {
        let (addr_type, octets) = match ip {
            IpAddr::V4(v4) => (AddressType::Ipv4, v4.octets().to_vec()),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                // RFC 4120 7.5.3 - IPv4 mapped addresses MUST be sent as IPv4.
                Some(v4) => (AddressType::Ipv4, v4.octets().to_vec()),
                None => (AddressType::Ipv6, v6.octets().to_vec()),
            },
        };

        let address = OctetString::new(octets).map_err(|_| KrbError::DerEncodeOctetString)?;

        Ok(HostAddress {
            addr_type: addr_type.into(),
            address,
        })
    }
}

impl TryFrom<&HostAddress> for IpAddr {
    type Error = KrbError;

    fn try_from(value: &HostAddress) -> Result<Self, KrbError> {
        let bytes = value.address.as_bytes();
        match AddressType::try_from(value.addr_type) {
            Ok(AddressType::Ipv4) => <[u8; 4]>::try_from(bytes)
                .map(|octets| IpAddr::V4(Ipv4Addr::from(octets)))
                .map_err(|_| KrbError::HostAddressInvalid),
            Ok(AddressType::Ipv6) => <[u8; 16]>::try_from(bytes)
                .map(|octets| IpAddr::V6(Ipv6Addr::from(octets)))
                .map_err(|_| KrbError::HostAddressInvalid),
            _ => {
                tracing::debug!(addr_type = value.addr_type, "unsupported address type");
                Err(KrbError::HostAddressInvalid)
            }
        }
    }
}
