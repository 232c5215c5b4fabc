use crate::cache::{get_instance, ReplayCache};
use crate::constants::{
    DEFAULT_CLOCK_SKEW, DEFAULT_KDC_MAX_RETRIES, DEFAULT_KDC_TIMEOUT, DEFAULT_MAX_REFERRALS,
    DEFAULT_UDP_PREFERENCE_LIMIT, MAX_UDP_PREFERENCE_LIMIT,
};
use crate::error::KrbError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

const DEFAULT_REPLAY_CACHE_TYPE: &str = "memory";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibDefaults {
    pub default_realm: Option<String>,
    pub udp_preference_limit: Option<usize>,
    /// Seconds.
    pub kdc_timeout: Option<u64>,
    pub max_retries: Option<u32>,
    /// Seconds.
    pub clockskew: Option<u64>,
    pub forwardable: Option<bool>,
    pub proxiable: Option<bool>,
    pub renewable: Option<bool>,
    pub disable_referrals: Option<bool>,
    pub max_referrals: Option<usize>,
    pub replay_cache_type: Option<String>,
}

impl LibDefaults {
    /// Requests larger than this go straight to TCP.
    pub fn udp_preference_limit(&self) -> usize {
        self.udp_preference_limit
            .unwrap_or(DEFAULT_UDP_PREFERENCE_LIMIT)
            .min(MAX_UDP_PREFERENCE_LIMIT)
    }

    pub fn kdc_timeout(&self) -> Duration {
        self.kdc_timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_KDC_TIMEOUT)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_KDC_MAX_RETRIES).max(1)
    }

    pub fn clockskew(&self) -> Duration {
        self.clockskew
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CLOCK_SKEW)
    }

    pub fn referrals_enabled(&self) -> bool {
        self.disable_referrals != Some(true)
    }

    pub fn max_referrals(&self) -> usize {
        self.max_referrals.unwrap_or(DEFAULT_MAX_REFERRALS)
    }

    pub fn replay_cache_type(&self) -> &str {
        self.replay_cache_type
            .as_deref()
            .unwrap_or(DEFAULT_REPLAY_CACHE_TYPE)
    }

    pub fn replay_cache(&self) -> Arc<dyn ReplayCache> {
        get_instance(self.replay_cache_type(), self.clockskew())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmConfig {
    /// `host` or `host:port`.
    #[serde(default)]
    pub kdc: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub libdefaults: LibDefaults,
    pub realms: BTreeMap<String, RealmConfig>,
    /// Client realm to server realm to the realms in between. A single `.`
    /// means the two trust each other directly.
    pub capaths: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Config {
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Config, KrbError> {
        let mut contents = String::new();
        let mut f = fs::File::open(&path).map_err(|io_err| {
            error!(?io_err, path = %path.as_ref().display(), "Unable to open config");
            KrbError::ConfigIo
        })?;
        f.read_to_string(&mut contents).map_err(|io_err| {
            error!(?io_err, "Unable to read config");
            KrbError::ConfigIo
        })?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Config, KrbError> {
        toml::from_str(contents).map_err(|err| {
            error!(?err);
            KrbError::ConfigParse
        })
    }

    pub fn kdcs(&self, realm: &str) -> Result<&[String], KrbError> {
        match self.realms.get(realm) {
            Some(rc) if !rc.kdc.is_empty() => Ok(rc.kdc.as_slice()),
            _ => {
                debug!(realm, "no kdc configured");
                Err(KrbError::NoKdcForRealm)
            }
        }
    }

    /// The realms to get TGTs from, in order, when walking from
    /// `client_realm` to `server_realm` without referrals. The list starts
    /// with the client realm and stops short of the server realm.
    pub fn realms_list(&self, client_realm: &str, server_realm: &str) -> Vec<String> {
        if client_realm == server_realm {
            return vec![client_realm.to_string()];
        }

        if let Some(path) = self
            .capaths
            .get(client_realm)
            .and_then(|servers| servers.get(server_realm))
        {
            let mut realms = vec![client_realm.to_string()];
            realms.extend(
                path.iter()
                    .filter(|r| r.as_str() != "." && r.as_str() != client_realm)
                    .cloned(),
            );
            return realms;
        }

        hierarchical_path(client_realm, server_realm)
    }
}

/// Walk up the client realm to the closest common parent, then down towards
/// the server realm.
fn hierarchical_path(client_realm: &str, server_realm: &str) -> Vec<String> {
    let client: Vec<&str> = client_realm.split('.').collect();
    let server: Vec<&str> = server_realm.split('.').collect();

    let common = client
        .iter()
        .rev()
        .zip(server.iter().rev())
        .take_while(|(c, s)| c == s)
        .count();

    let mut realms: Vec<String> = (0..client.len() - common)
        .map(|i| client[i..].join("."))
        .collect();

    if common > 0 {
        let parent = client[client.len() - common..].join(".");
        if parent != server_realm {
            realms.push(parent);
        }
    }

    // Parents of the server realm below the common one, from the top.
    realms.extend(
        (1..server.len() - common)
            .rev()
            .map(|i| server[i..].join(".")),
    );

    realms
}
