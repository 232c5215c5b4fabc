use crate::proto::{Credentials, Name};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct ReferralCacheEntry {
    pub creds: Credentials,
    pub to_realm: String,
}

type ReferralKey = (Name, Name);

/// Referral TGTs handed out while chasing a service, keyed by client and
/// service and then by the realm that issued the referral.
#[derive(Debug, Default)]
pub struct ReferralsCache {
    entries: Mutex<BTreeMap<ReferralKey, BTreeMap<String, ReferralCacheEntry>>>,
}

fn key(client: &Name, service: &Name) -> ReferralKey {
    (
        client.clone().service_hst_normalise(),
        service.clone().service_hst_normalise(),
    )
}

fn prune_expired(
    entries: &mut BTreeMap<ReferralKey, BTreeMap<String, ReferralCacheEntry>>,
    k: &ReferralKey,
    now: SystemTime,
) {
    let empty = match entries.get_mut(k) {
        Some(by_realm) => {
            by_realm.retain(|from, entry| {
                let keep = !entry.creds.is_expired(now);
                if !keep {
                    trace!(%from, to = %entry.to_realm, "expired referral");
                }
                keep
            });
            by_realm.is_empty()
        }
        None => false,
    };
    if empty {
        entries.remove(k);
    }
}

impl ReferralsCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ReferralKey, BTreeMap<String, ReferralCacheEntry>>> {
        // Nothing here can leave the map half updated, so a poisoned lock is
        // still usable.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn put(
        &self,
        client: &Name,
        service: &Name,
        from_realm: &str,
        to_realm: &str,
        creds: Credentials,
        now: SystemTime,
    ) {
        let k = key(client, service);
        let mut entries = self.lock();
        prune_expired(&mut entries, &k, now);

        if creds.is_expired(now) {
            debug!(from_realm, to_realm, "not caching an expired referral");
            return;
        }

        let by_realm = entries.entry(k).or_default();
        by_realm.insert(
            from_realm.to_string(),
            ReferralCacheEntry {
                creds,
                to_realm: to_realm.to_string(),
            },
        );

        // Follow the chain from the new entry. Coming back to a realm already
        // seen means the new entry closed a loop, cut it at the entry it points to.
        let looped = {
            let mut seen: Vec<&str> = Vec::new();
            let mut current = Some(from_realm);
            loop {
                let Some(realm) = current else {
                    break false;
                };
                if seen.contains(&realm) {
                    break true;
                }
                seen.push(realm);
                current = by_realm.get(realm).map(|entry| entry.to_realm.as_str());
            }
        };

        if looped {
            debug!(from_realm, to_realm, "referral loop in cache, removing");
            by_realm.remove(to_realm);
        }
    }

    pub fn get(
        &self,
        client: &Name,
        service: &Name,
        from_realm: &str,
        now: SystemTime,
    ) -> Option<ReferralCacheEntry> {
        let k = key(client, service);
        let mut entries = self.lock();
        prune_expired(&mut entries, &k, now);
        entries.get(&k)?.get(from_realm).cloned()
    }
}
