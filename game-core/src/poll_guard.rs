use std::fmt;

/// Counter value captured when a poll request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollStamp(u64);

impl PollStamp {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PollStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Detects responses to superseded poll requests.
///
/// Every request takes a fresh stamp. A response is only applied when its
/// stamp is still the latest one handed out; anything older lost the race to
/// a newer request or belongs to a loop generation that has since been
/// stopped or restarted.
#[derive(Debug, Default)]
pub struct PollGuard {
    counter: u64,
}

impl PollGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> PollStamp {
        self.counter += 1;
        PollStamp(self.counter)
    }

    pub fn is_current(&self, stamp: PollStamp) -> bool {
        stamp.0 == self.counter
    }

    /// Move the counter forward so every stamp issued so far becomes stale.
    pub fn invalidate(&mut self) {
        self.counter += 1;
    }

    pub fn current(&self) -> u64 {
        self.counter
    }
}
