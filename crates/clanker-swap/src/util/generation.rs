//! Request generations for discarding stale asynchronous results.
//!
//! Every request takes a fresh [`Generation`] from its [`Generations`]
//! counter. When the response arrives it is only applied if its generation
//! is still the latest one; anything issued before a newer request (or an
//! explicit [`Generations::invalidate`]) is dropped. The underlying request
//! is not cancelled, only its result is ignored.

/// Identifies one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

#[derive(Debug, Default)]
pub struct Generations {
    current: u64,
}

impl Generations {
    /// Starts a new request, making all earlier ones stale.
    pub fn next(&mut self) -> Generation {
        self.current += 1;
        Generation(self.current)
    }

    /// Makes all outstanding requests stale without starting a new one.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.current
    }
}
