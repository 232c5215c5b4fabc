use super::NetClient;
use crate::constants::MAX_UDP_PREFERENCE_LIMIT;
use crate::error::KrbError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, error, trace};

// Largest UDP payload.
const MAX_DATAGRAM: usize = 65507;

#[derive(Debug, Clone)]
pub struct UdpClient {
    addr: SocketAddr,
    timeout: Duration,
}

impl UdpClient {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        UdpClient { addr, timeout }
    }

    async fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, KrbError> {
        let local: SocketAddr = match self.addr {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let sock = UdpSocket::bind(local).await.map_err(|io_err| {
            error!(?io_err, "Unable to bind udp socket");
            KrbError::TransportIo
        })?;
        sock.connect(self.addr).await.map_err(|io_err| {
            debug!(?io_err, addr = %self.addr, "Unable to connect");
            KrbError::TransportIo
        })?;

        sock.send(request).await.map_err(|io_err| {
            debug!(?io_err, addr = %self.addr, "Unable to send request");
            KrbError::TransportIo
        })?;

        // One spare byte, a datagram that fills the buffer was cut short.
        let mut buf = vec![0u8; MAX_DATAGRAM + 1];
        let len = sock.recv(&mut buf).await.map_err(|io_err| {
            debug!(?io_err, addr = %self.addr, "Unable to read reply");
            KrbError::TransportIo
        })?;

        if len > MAX_DATAGRAM {
            return Err(KrbError::ResponseTooLarge);
        }

        trace!(len, "udp reply");
        buf.truncate(len);
        Ok(buf)
    }
}

impl NetClient for UdpClient {
    async fn send(&self, request: &[u8]) -> Result<Vec<u8>, KrbError> {
        if request.len() > MAX_UDP_PREFERENCE_LIMIT {
            return Err(KrbError::RequestTooLarge);
        }

        timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_| {
                debug!(addr = %self.addr, "udp exchange timed out");
                KrbError::TransportTimeout
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::UdpClient;
    use crate::error::KrbError;
    use crate::net::NetClient;
    use std::time::Duration;
    use tokio::net::UdpSocket;

    #[tokio::test]
    async fn udp_client_exchange() {
        let server = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("Unable to bind");
        let addr = server.local_addr().expect("No local address");

        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            let (len, peer) = server.recv_from(&mut buf).await.expect("Unable to recv");
            let mut reply = buf[..len].to_vec();
            reply.push(0xff);
            server.send_to(&reply, peer).await.expect("Unable to reply");
        });

        let client = UdpClient::new(addr, Duration::from_secs(5));
        let reply = client.send(&[1, 2]).await.expect("Exchange failed");
        assert_eq!(reply, vec![1, 2, 0xff]);

        assert!(matches!(
            client.send(&vec![0u8; 40000]).await,
            Err(KrbError::RequestTooLarge)
        ));
    }

    #[tokio::test]
    async fn udp_client_timeout() {
        // Bound but silent.
        let server = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("Unable to bind");
        let addr = server.local_addr().expect("No local address");

        let client = UdpClient::new(addr, Duration::from_millis(100));
        assert!(matches!(
            client.send(&[1]).await,
            Err(KrbError::TransportTimeout)
        ));
        drop(server);
    }
}
