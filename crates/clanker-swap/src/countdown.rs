use {std::time::Duration, tokio::time::Instant};

const TICK: Duration = Duration::from_secs(1);

/// Seconds until the next automatic quote refresh.
///
/// Purely presentational: the quote is refreshed on its own polling schedule
/// regardless of what this shows.
#[derive(Debug)]
pub struct RefreshCountdown {
    interval: Duration,
    last_refresh: Instant,
    seconds: u64,
    was_fetching: bool,
}

impl RefreshCountdown {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_refresh: now,
            seconds: interval.as_secs(),
            was_fetching: false,
        }
    }

    /// Restarts the countdown from the full interval.
    pub fn reset(&mut self, now: Instant) {
        self.last_refresh = now;
        self.seconds = self.interval.as_secs();
    }

    /// A new quote arrived.
    pub fn quote_received(&mut self, now: Instant, swap_confirmed: bool) {
        if !swap_confirmed {
            self.reset(now);
        }
    }

    /// Tracks the quote's fetching flag; a fetch finishing while a quote is
    /// shown restarts the countdown.
    pub fn observe_fetching(
        &mut self,
        fetching: bool,
        has_quote: bool,
        swap_confirmed: bool,
        now: Instant,
    ) {
        if !swap_confirmed && self.was_fetching && !fetching && has_quote {
            self.reset(now);
        }
        self.was_fetching = fetching;
    }

    /// Updates the displayed seconds. Doesn't run without a quote or once the
    /// swap is confirmed.
    pub fn tick(&mut self, now: Instant, has_quote: bool, swap_confirmed: bool) {
        if !has_quote || swap_confirmed {
            return;
        }
        let remaining = self
            .interval
            .saturating_sub(now.saturating_duration_since(self.last_refresh));
        self.seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    }

    /// When the next tick is due.
    pub fn next_tick(&self, now: Instant, has_quote: bool, swap_confirmed: bool) -> Option<Instant> {
        (has_quote && !swap_confirmed).then(|| now + TICK)
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }
}
