use crate::constants::DEFAULT_IO_MAX_SIZE;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{error, trace};

const LENGTH_PREFIX: usize = 4;

/// RFC 4120 7.2.2 framing: each message is preceded by its length as a four
/// octet big endian integer. The high bit is reserved and must be zero.
#[derive(Debug)]
pub struct KdcTcpCodec {
    max_size: usize,
}

impl KdcTcpCodec {
    pub fn new(max_size: usize) -> Self {
        KdcTcpCodec { max_size }
    }
}

impl Default for KdcTcpCodec {
    fn default() -> Self {
        KdcTcpCodec {
            max_size: DEFAULT_IO_MAX_SIZE,
        }
    }
}

impl Decoder for KdcTcpCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if buf.len() < LENGTH_PREFIX {
            return Ok(None);
        }

        let mut len_bytes = [0u8; LENGTH_PREFIX];
        len_bytes.copy_from_slice(&buf[..LENGTH_PREFIX]);
        let len = u32::from_be_bytes(len_bytes);

        if len & 0x8000_0000 != 0 {
            error!(len, "reserved bit set in record length");
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "reserved bit set in record length",
            ));
        }

        let len = len as usize;
        if len > self.max_size {
            error!(len, max_size = self.max_size, "record exceeds the maximum size");
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "record exceeds the maximum size",
            ));
        }

        if buf.len() < LENGTH_PREFIX + len {
            buf.reserve(LENGTH_PREFIX + len - buf.len());
            return Ok(None);
        }

        buf.advance(LENGTH_PREFIX);
        trace!(len, "decoded record");
        Ok(Some(buf.split_to(len).freeze()))
    }
}

impl Encoder<Bytes> for KdcTcpCodec {
    type Error = io::Error;

    fn encode(&mut self, msg: Bytes, buf: &mut BytesMut) -> io::Result<()> {
        if msg.len() > self.max_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "record exceeds the maximum size",
            ));
        }
        let len = u32::try_from(msg.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "record too long"))?;

        buf.reserve(LENGTH_PREFIX + msg.len());
        buf.put_u32(len);
        buf.extend_from_slice(&msg);
        Ok(())
    }
}
