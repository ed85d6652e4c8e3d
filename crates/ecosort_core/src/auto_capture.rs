/// Ticks from arming to the automatic shot.
pub const COUNTDOWN_START: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No countdown is running.
    Idle,
    /// Still counting; carries the remaining ticks.
    Counting(u8),
    /// The countdown reached zero: capture now. Auto mode is now off.
    Fire,
}

/// Single-shot countdown bound to one camera session.
///
/// The countdown only runs while auto mode is enabled and the session is live;
/// anything else cancels it without a residual shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoCapture {
    enabled: bool,
    remaining: Option<u8>,
}

impl AutoCapture {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            remaining: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn countdown(&self) -> Option<u8> {
        self.remaining
    }

    /// The session became live and error-free.
    pub fn arm(&mut self) {
        if self.enabled && self.remaining.is_none() {
            self.remaining = Some(COUNTDOWN_START);
        }
    }

    /// Device error, teardown or session end.
    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn set_enabled(&mut self, enabled: bool, session_live: bool) {
        self.enabled = enabled;
        if !enabled {
            self.cancel();
        } else if session_live {
            self.remaining = Some(COUNTDOWN_START);
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        let Some(remaining) = self.remaining else {
            return TickOutcome::Idle;
        };
        let next = remaining.saturating_sub(1);
        if next == 0 {
            self.remaining = None;
            self.enabled = false;
            TickOutcome::Fire
        } else {
            self.remaining = Some(next);
            TickOutcome::Counting(next)
        }
    }
}

impl Default for AutoCapture {
    fn default() -> Self {
        Self::new(true)
    }
}
