use std::sync::atomic::{AtomicU32, Ordering};

/// The sequence numbers of one direction of a KRB-PRIV / KRB-SAFE stream.
#[derive(Debug)]
pub struct LocalSeqNumber {
    last: AtomicU32,
}

// Keep the initial value well away from the wrap, as other implementations do.
const INITIAL_MASK: u32 = 0x3fff_ffff;

impl Default for LocalSeqNumber {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSeqNumber {
    pub fn new() -> Self {
        Self::with_start(rand::random::<u32>() & INITIAL_MASK)
    }

    /// Start from a number agreed on in an authenticator or AP-REP.
    pub fn with_start(start: u32) -> Self {
        LocalSeqNumber {
            last: AtomicU32::new(start),
        }
    }

    pub fn current(&self) -> u32 {
        self.last.load(Ordering::SeqCst)
    }

    pub fn next(&self) -> u32 {
        self.current().wrapping_add(1)
    }

    /// Advance by one, returning the new current value.
    pub fn step(&self) -> u32 {
        self.last.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    pub fn is_equal(&self, number: u32) -> bool {
        self.current() == number
    }
}
