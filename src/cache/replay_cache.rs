use super::dfl::DflCache;
use crate::asn1::constants::KrbErrorCode;
use crate::error::KrbError;
use crate::proto::Name;
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// What an acceptor remembers about an authenticator it has accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AuthTimeWithHash {
    pub client: String,
    pub server: String,
    /// Seconds since the epoch.
    pub ctime: u32,
    pub cusec: u32,
    /// Hex SHA-1 of the encrypted authenticator.
    pub hash: String,
}

impl AuthTimeWithHash {
    pub fn new(
        client: &Name,
        server: &Name,
        ctime: SystemTime,
        cusec: u32,
        authenticator_cipher: &[u8],
    ) -> Result<Self, KrbError> {
        let ctime = ctime
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| KrbError::DoYouHaveATimeMachine)?
            .as_secs();

        Ok(AuthTimeWithHash {
            client: client.to_string(),
            server: server.to_string(),
            ctime: u32::try_from(ctime).map_err(|_| KrbError::DerEncodeKerberosTime)?,
            cusec,
            hash: hex::encode(Sha1::digest(authenticator_cipher)),
        })
    }

    pub(crate) fn is_expired(&self, now: SystemTime, lifespan: Duration) -> bool {
        let now = now
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        u64::from(self.ctime) + lifespan.as_secs() < now
    }
}

pub trait ReplayCache: fmt::Debug + Send + Sync {
    /// Remember `entry`, failing with KRB_AP_ERR_REPEAT if it was already seen
    /// within the clock skew window.
    fn check_and_store(&self, now: SystemTime, entry: &AuthTimeWithHash) -> Result<(), KrbError>;
}

pub(crate) fn repeat(entry: &AuthTimeWithHash) -> KrbError {
    warn!(client = %entry.client, server = %entry.server, "replayed authenticator");
    KrbError::ApErr(KrbErrorCode::KrbApErrRepeat)
}

#[derive(Debug)]
pub struct MemoryCache {
    lifespan: Duration,
    seen: Mutex<BTreeSet<AuthTimeWithHash>>,
}

impl MemoryCache {
    pub fn new(lifespan: Duration) -> Self {
        MemoryCache {
            lifespan,
            seen: Mutex::new(BTreeSet::new()),
        }
    }
}

impl ReplayCache for MemoryCache {
    fn check_and_store(&self, now: SystemTime, entry: &AuthTimeWithHash) -> Result<(), KrbError> {
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        seen.retain(|e| !e.is_expired(now, self.lifespan));

        if !seen.insert(entry.clone()) {
            return Err(repeat(entry));
        }
        Ok(())
    }
}

/// Accepts everything. For acceptors that get their replay protection
/// somewhere else.
#[derive(Debug, Default)]
pub struct NoneCache;

impl ReplayCache for NoneCache {
    fn check_and_store(&self, _now: SystemTime, _entry: &AuthTimeWithHash) -> Result<(), KrbError> {
        Ok(())
    }
}

/// Select a replay cache by the `replay_cache_type` token: `dfl` for the
/// per-user file, `dfl:<path>` for a given file, `none`, and anything else
/// keeps entries in memory.
pub fn get_instance(kind: &str, clockskew: Duration) -> Arc<dyn ReplayCache> {
    match kind {
        "none" => Arc::new(NoneCache),
        "dfl" => Arc::new(DflCache::new(DflCache::default_path(), clockskew)),
        _ => match kind.strip_prefix("dfl:") {
            Some(path) => Arc::new(DflCache::new(PathBuf::from(path), clockskew)),
            None => {
                debug!(kind, "using the memory replay cache");
                Arc::new(MemoryCache::new(clockskew))
            }
        },
    }
}
