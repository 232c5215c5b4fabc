use crate::asn1::constants::{KeyUsage, KrbErrorCode};
use crate::asn1::host_address::HostAddress;
use crate::asn1::kerberos_time::{join_system_time, split_system_time, KerberosTime};
use crate::asn1::krb_priv::{EncKrbPrivPart, EncKrbPrivPartInner, KrbPriv};
use crate::asn1::krb_safe::{KrbSafe, KrbSafeBody};
use crate::asn1::uint32::UInt32;
use crate::asn1::KrbMessage;
use crate::crypto::{KrbChecksum, KrbCipher, SessionKey};
use crate::error::KrbError;
use crate::seq_number::LocalSeqNumber;
use der::asn1::OctetString;
use der::Encode;
use std::net::IpAddr;
use std::time::{Duration, SystemTime};
use tracing::{debug, trace};

/// One side of an established KRB-PRIV / KRB-SAFE session. Outgoing messages
/// carry the next local sequence number, incoming ones must carry the next
/// remote one.
#[derive(Debug)]
pub struct MessageContext {
    key: SessionKey,
    local: LocalSeqNumber,
    remote: LocalSeqNumber,
    clockskew: Duration,
    local_address: Option<HostAddress>,
}

impl MessageContext {
    /// `local_seq` and `remote_seq` are the initial numbers exchanged in the
    /// authenticator and the AP-REP.
    pub fn new(key: SessionKey, local_seq: u32, remote_seq: u32, clockskew: Duration) -> Self {
        MessageContext {
            key,
            local: LocalSeqNumber::with_start(local_seq),
            remote: LocalSeqNumber::with_start(remote_seq),
            clockskew,
            local_address: None,
        }
    }

    pub fn with_local_address(mut self, addr: IpAddr) -> Result<Self, KrbError> {
        self.local_address = Some(HostAddress::try_from(addr)?);
        Ok(self)
    }

    pub fn local_seq(&self) -> &LocalSeqNumber {
        &self.local
    }

    pub fn remote_seq(&self) -> &LocalSeqNumber {
        &self.remote
    }

    fn take_local_seq(&self) -> u32 {
        self.local.step().wrapping_sub(1)
    }

    fn check_remote(
        &self,
        seq_number: Option<UInt32>,
        timestamp: Option<(&KerberosTime, u32)>,
        now: SystemTime,
    ) -> Result<(), KrbError> {
        if let Some((ts, usec)) = timestamp {
            let sent = join_system_time(ts, usec);
            let skew = now
                .duration_since(sent)
                .or_else(|_| sent.duration_since(now))
                .unwrap_or_default();
            if skew > self.clockskew {
                debug!(?skew, "message outside of the clock skew");
                return Err(KrbError::ApErr(KrbErrorCode::KrbApErrSkew));
            }
        }

        match seq_number {
            Some(UInt32(seq)) => {
                if !self.remote.is_equal(seq) {
                    debug!(seq, expected = self.remote.current(), "message out of order");
                    return Err(KrbError::ApErr(KrbErrorCode::KrbApErrBadorder));
                }
                self.remote.step();
                Ok(())
            }
            // Without a sequence number only the timestamp orders messages.
            None if timestamp.is_some() => Ok(()),
            None => Err(KrbError::ApErr(KrbErrorCode::KrbApErrBadorder)),
        }
    }

    pub fn seal_priv<C: KrbCipher + ?Sized>(
        &self,
        cipher: &C,
        user_data: &[u8],
        now: SystemTime,
    ) -> Result<KrbPriv, KrbError> {
        let (timestamp, usec) = split_system_time(now)?;
        let seq = self.take_local_seq();
        let part = EncKrbPrivPart(EncKrbPrivPartInner {
            user_data: OctetString::new(user_data).map_err(|_| KrbError::DerEncodeOctetString)?,
            timestamp: Some(timestamp),
            usec: Some(usec),
            seq_number: Some(UInt32(seq)),
            s_address: self.local_address.clone(),
            r_address: None,
        });

        let enc_part =
            self.key
                .seal(cipher, KeyUsage::KrbPrivEncPart, None, &part.asn1_encode()?)?;
        trace!(seq, "sealed KRB-PRIV");
        Ok(KrbPriv::new(enc_part))
    }

    pub fn open_priv<C: KrbCipher + ?Sized>(
        &self,
        cipher: &C,
        message: &KrbPriv,
        now: SystemTime,
    ) -> Result<Vec<u8>, KrbError> {
        let plain = self
            .key
            .unseal(cipher, KeyUsage::KrbPrivEncPart, &message.0.enc_part)
            .map_err(|err| match err {
                KrbError::MessageAuthenticationFailed => {
                    KrbError::ApErr(KrbErrorCode::KrbApErrBadIntegrity)
                }
                err => err,
            })?;
        let part = EncKrbPrivPart::parse(&plain)?.0;

        self.check_remote(
            part.seq_number,
            part.timestamp
                .as_ref()
                .map(|ts| (ts, part.usec.unwrap_or_default())),
            now,
        )?;
        Ok(part.user_data.as_bytes().to_vec())
    }

    pub fn seal_safe<C: KrbChecksum + ?Sized>(
        &self,
        engine: &C,
        user_data: &[u8],
        now: SystemTime,
    ) -> Result<KrbSafe, KrbError> {
        let (timestamp, usec) = split_system_time(now)?;
        let seq = self.take_local_seq();
        let body = KrbSafeBody {
            user_data: OctetString::new(user_data).map_err(|_| KrbError::DerEncodeOctetString)?,
            timestamp: Some(timestamp),
            usec: Some(usec),
            seq_number: Some(UInt32(seq)),
            s_address: self.local_address.clone(),
            r_address: None,
        };

        let cksum = self
            .key
            .checksum(engine, KeyUsage::KrbSafeChecksum, &body.to_der()?)?;
        trace!(seq, "sealed KRB-SAFE");
        Ok(KrbSafe::new(body, cksum))
    }

    pub fn open_safe<C: KrbChecksum + ?Sized>(
        &self,
        engine: &C,
        message: &KrbSafe,
        now: SystemTime,
    ) -> Result<Vec<u8>, KrbError> {
        let body = &message.0.safe_body;
        self.key.verify_checksum(
            engine,
            KeyUsage::KrbSafeChecksum,
            &message.0.cksum,
            &body.to_der()?,
        )?;

        self.check_remote(
            body.seq_number,
            body.timestamp
                .as_ref()
                .map(|ts| (ts, body.usec.unwrap_or_default())),
            now,
        )?;
        Ok(body.user_data.as_bytes().to_vec())
    }
}
