use super::codec::KdcTcpCodec;
use super::NetClient;
use crate::constants::DEFAULT_IO_MAX_SIZE;
use crate::error::KrbError;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct TcpClient {
    addr: SocketAddr,
    timeout: Duration,
    max_size: usize,
}

impl TcpClient {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        TcpClient {
            addr,
            timeout,
            max_size: DEFAULT_IO_MAX_SIZE,
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    async fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, KrbError> {
        let stream = TcpStream::connect(self.addr).await.map_err(|io_err| {
            debug!(?io_err, addr = %self.addr, "Unable to connect");
            KrbError::TransportIo
        })?;

        let mut krb_stream = Framed::new(stream, KdcTcpCodec::new(self.max_size));

        krb_stream
            .send(Bytes::copy_from_slice(request))
            .await
            .map_err(|io_err| {
                error!(?io_err, "Unable to send request");
                KrbError::TransportIo
            })?;

        match krb_stream.next().await {
            Some(Ok(reply)) => Ok(reply.to_vec()),
            Some(Err(io_err)) => {
                error!(?io_err, "Unable to read reply");
                Err(KrbError::TransportIo)
            }
            None => {
                debug!(addr = %self.addr, "connection closed without a reply");
                Err(KrbError::TransportIo)
            }
        }
    }
}

impl NetClient for TcpClient {
    async fn send(&self, request: &[u8]) -> Result<Vec<u8>, KrbError> {
        if request.len() > self.max_size {
            return Err(KrbError::RequestTooLarge);
        }

        timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_| {
                debug!(addr = %self.addr, "tcp exchange timed out");
                KrbError::TransportTimeout
            })?
    }
}
