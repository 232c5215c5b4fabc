mod dfl;
pub mod referrals;
pub mod replay_cache;

pub use self::dfl::DflCache;
pub use self::referrals::{ReferralCacheEntry, ReferralsCache};
pub use self::replay_cache::{get_instance, AuthTimeWithHash, MemoryCache, NoneCache, ReplayCache};
