//! Getting encoded requests to a KDC and the replies back.

pub mod codec;
mod comm;
mod tcp;
mod udp;

pub use self::codec::KdcTcpCodec;
pub use self::comm::KdcComm;
pub use self::tcp::TcpClient;
pub use self::udp::UdpClient;

use crate::error::KrbError;

/// Delivers a request to some KDC of `realm`. The credential acquisition
/// code is generic over this so it can run against anything that answers
/// like a KDC.
pub trait KdcTransport {
    async fn send_to_realm(&self, realm: &str, request: &[u8]) -> Result<Vec<u8>, KrbError>;
}

/// One request and one reply with a single KDC.
pub trait NetClient {
    async fn send(&self, request: &[u8]) -> Result<Vec<u8>, KrbError>;
}
