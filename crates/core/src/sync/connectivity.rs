//! Device-wide connectivity gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared offline-mode flag consulted before every remote attempt.
///
/// Cloneable handle; all clones observe the same flag. Repositories only
/// read it, toggling is the app shell's job.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityPolicy {
    offline: Arc<AtomicBool>,
}

impl ConnectivityPolicy {
    /// Start online.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let policy = ConnectivityPolicy::new();
        let observer = policy.clone();
        assert!(!observer.is_offline());

        policy.set_offline(true);
        assert!(observer.is_offline());

        policy.set_offline(false);
        assert!(!observer.is_offline());
    }
}
