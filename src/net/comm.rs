use super::{KdcTransport, NetClient, TcpClient, UdpClient};
use crate::asn1::constants::KrbErrorCode;
use crate::asn1::krb_error::TaggedKrbError;
use crate::asn1::KrbMessage;
use crate::config::Config;
use crate::constants::DEFAULT_KDC_PORT;
use crate::error::KrbError;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::lookup_host;
use tracing::{debug, instrument, warn};

// [APPLICATION 30]
const KRB_ERROR_TAG: u8 = 0x7e;

/// Talks to the KDCs configured for a realm.
#[derive(Debug, Clone)]
pub struct KdcComm {
    config: Arc<Config>,
}

/// Parse `host`, `host:port`, `ip`, `ip:port` or `[ipv6]:port`.
async fn resolve(kdc: &str) -> Result<SocketAddr, KrbError> {
    if let Ok(addr) = kdc.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = kdc.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_KDC_PORT));
    }

    let has_port = kdc
        .rsplit_once(':')
        .is_some_and(|(_, port)| port.parse::<u16>().is_ok());

    let resolved = if has_port {
        lookup_host(kdc).await.map(|mut addrs| addrs.next())
    } else {
        lookup_host((kdc, DEFAULT_KDC_PORT))
            .await
            .map(|mut addrs| addrs.next())
    };

    resolved
        .map_err(|io_err| {
            debug!(?io_err, kdc, "Unable to resolve kdc");
            KrbError::KdcAddressInvalid
        })?
        .ok_or(KrbError::KdcAddressInvalid)
}

/// A KRB-ERROR asking us to come back over TCP.
fn is_response_too_big(reply: &[u8]) -> bool {
    reply.first() == Some(&KRB_ERROR_TAG)
        && TaggedKrbError::parse(reply)
            .map(|err| err.0.error_code() == KrbErrorCode::KrbErrResponseTooBig)
            .unwrap_or(false)
}

impl KdcComm {
    pub fn new(config: Arc<Config>) -> Self {
        KdcComm { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn send_to_kdc(&self, addr: SocketAddr, request: &[u8]) -> Result<Vec<u8>, KrbError> {
        let defaults = &self.config.libdefaults;
        let kdc_timeout = defaults.kdc_timeout();

        if request.len() <= defaults.udp_preference_limit() {
            match UdpClient::new(addr, kdc_timeout).send(request).await {
                Ok(reply) if is_response_too_big(&reply) => {
                    debug!(%addr, "reply too big for udp, using tcp");
                }
                Err(KrbError::ResponseTooLarge) => {
                    debug!(%addr, "truncated udp reply, using tcp");
                }
                other => return other,
            }
        }

        TcpClient::new(addr, kdc_timeout).send(request).await
    }
}

impl KdcTransport for KdcComm {
    #[instrument(level = "debug", skip(self, request), fields(len = request.len()))]
    async fn send_to_realm(&self, realm: &str, request: &[u8]) -> Result<Vec<u8>, KrbError> {
        let max_retries = self.config.libdefaults.max_retries();
        let mut last_err = KrbError::NoKdcForRealm;

        for kdc in self.config.kdcs(realm)? {
            let addr = match resolve(kdc).await {
                Ok(addr) => addr,
                Err(err) => {
                    warn!(kdc, "skipping kdc that does not resolve");
                    last_err = err;
                    continue;
                }
            };

            for attempt in 1..=max_retries {
                match self.send_to_kdc(addr, request).await {
                    Ok(reply) => return Ok(reply),
                    Err(err) => {
                        debug!(%addr, attempt, ?err, "kdc exchange failed");
                        last_err = err;
                    }
                }
            }
        }

        warn!(realm, ?last_err, "no kdc answered");
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, KdcComm};
    use crate::asn1::constants::KrbErrorCode;
    use crate::config::{Config, LibDefaults, RealmConfig};
    use crate::error::KrbError;
    use crate::net::codec::KdcTcpCodec;
    use crate::net::KdcTransport;
    use crate::proto::reply::tests::krb_error_bytes;
    use bytes::Bytes;
    use futures::{SinkExt, StreamExt};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::net::{TcpListener, UdpSocket};
    use tokio_util::codec::Framed;

    fn config(kdcs: Vec<String>, udp_preference_limit: usize) -> Arc<Config> {
        let mut config = Config {
            libdefaults: LibDefaults {
                udp_preference_limit: Some(udp_preference_limit),
                kdc_timeout: Some(2),
                max_retries: Some(1),
                ..Default::default()
            },
            ..Default::default()
        };
        config
            .realms
            .insert("EXAMPLE.COM".to_string(), RealmConfig { kdc: kdcs });
        Arc::new(config)
    }

    async fn tcp_kdc(listener: TcpListener, reply: &'static [u8]) {
        let (stream, _) = listener.accept().await.expect("Unable to accept");
        let mut kdc_stream = Framed::new(stream, KdcTcpCodec::default());
        let _request = kdc_stream.next().await.expect("No request");
        kdc_stream
            .send(Bytes::from_static(reply))
            .await
            .expect("Unable to reply");
    }

    #[tokio::test]
    async fn kdc_comm_resolve() {
        assert_eq!(
            resolve("127.0.0.1").await.expect("Bad address"),
            "127.0.0.1:88".parse::<SocketAddr>().expect("Bad address")
        );
        assert_eq!(
            resolve("[::1]:8888").await.expect("Bad address"),
            "[::1]:8888".parse::<SocketAddr>().expect("Bad address")
        );
        assert_eq!(
            resolve("localhost:750").await.expect("Bad address").port(),
            750
        );
        assert_eq!(
            resolve("localhost").await.expect("Bad address").port(),
            88
        );
        assert!(matches!(
            resolve("kdc.invalid:notaport").await,
            Err(KrbError::KdcAddressInvalid)
        ));
    }

    #[tokio::test]
    async fn kdc_comm_udp_too_big_falls_back_to_tcp() {
        let _ = tracing_subscriber::fmt::try_init();

        let udp = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("Unable to bind");
        let addr = udp.local_addr().expect("No local address");
        let tcp = TcpListener::bind(addr).await.expect("Unable to bind tcp");

        let too_big = krb_error_bytes(KrbErrorCode::KrbErrResponseTooBig);
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            let (_, peer) = udp.recv_from(&mut buf).await.expect("Unable to recv");
            udp.send_to(&too_big, peer).await.expect("Unable to reply");
        });
        tokio::spawn(tcp_kdc(tcp, b"tcp answer"));

        let comm = KdcComm::new(config(vec![addr.to_string()], 1465));
        let reply = comm
            .send_to_realm("EXAMPLE.COM", &[0x6c, 0x00])
            .await
            .expect("Exchange failed");
        assert_eq!(reply, b"tcp answer");
    }

    #[tokio::test]
    async fn kdc_comm_large_request_uses_tcp() {
        let tcp = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Unable to bind");
        let addr = tcp.local_addr().expect("No local address");
        tokio::spawn(tcp_kdc(tcp, b"tcp only"));

        let comm = KdcComm::new(config(vec![addr.to_string()], 1));
        let reply = comm
            .send_to_realm("EXAMPLE.COM", &[0x6c, 0x00, 0x00])
            .await
            .expect("Exchange failed");
        assert_eq!(reply, b"tcp only");
    }

    #[tokio::test]
    async fn kdc_comm_next_kdc_and_errors() {
        // Nothing listens on the first address.
        let dead = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Unable to bind");
        let dead_addr = dead.local_addr().expect("No local address");
        drop(dead);

        let tcp = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Unable to bind");
        let addr = tcp.local_addr().expect("No local address");
        tokio::spawn(tcp_kdc(tcp, b"second kdc"));

        let comm = KdcComm::new(config(vec![dead_addr.to_string(), addr.to_string()], 1));
        let reply = comm
            .send_to_realm("EXAMPLE.COM", &[0x6c, 0x00])
            .await
            .expect("Exchange failed");
        assert_eq!(reply, b"second kdc");

        assert!(matches!(
            comm.send_to_realm("OTHER.ORG", &[0x6c]).await,
            Err(KrbError::NoKdcForRealm)
        ));
    }
}
