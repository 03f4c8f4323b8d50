use {alloy::primitives::B256, std::time::Duration, tokio::time::Instant};

/// Delay of the second refresh after a swap confirms, giving slower RPC
/// nodes time to catch up with the new block.
pub const DELAYED_REFRESH: Duration = Duration::from_millis(1_500);

/// Remembers the last confirmed swap so its refresh cascade fires once.
#[derive(Debug, Default)]
pub struct ConfirmationTracker {
    handled: Option<B256>,
}

impl ConfirmationTracker {
    /// Returns `true` the first time a confirmation of `tx_hash` is observed.
    pub fn observe(&mut self, tx_hash: B256) -> bool {
        if self.handled == Some(tx_hash) {
            return false;
        }
        self.handled = Some(tx_hash);
        true
    }
}

/// A one-shot deadline for the delayed refresh.
#[derive(Debug, Default)]
pub struct DelayedRefresh {
    deadline: Option<Instant>,
}

impl DelayedRefresh {
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + DELAYED_REFRESH);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consumes the deadline if it has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::b256};

    #[test]
    fn confirmation_fires_once_per_hash() {
        let first = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let second = b256!("0x2222222222222222222222222222222222222222222222222222222222222222");
        let mut tracker = ConfirmationTracker::default();

        assert!(tracker.observe(first));
        assert!(!tracker.observe(first));
        assert!(tracker.observe(second));
        assert!(!tracker.observe(second));
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_refresh_fires_once() {
        let mut delayed = DelayedRefresh::default();
        delayed.schedule(Instant::now());
        assert!(!delayed.take_due(Instant::now()));

        tokio::time::advance(DELAYED_REFRESH).await;
        assert!(delayed.take_due(Instant::now()));
        assert!(!delayed.take_due(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_refresh_never_fires() {
        let mut delayed = DelayedRefresh::default();
        delayed.schedule(Instant::now());
        delayed.cancel();

        tokio::time::advance(DELAYED_REFRESH * 2).await;
        assert!(!delayed.take_due(Instant::now()));
        assert_eq!(delayed.deadline(), None);
    }
}
