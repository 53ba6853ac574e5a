#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Confirmed,
    Dismissed,
    ContextLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

impl OverlayState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true only on an actual `Closed -> Open` transition.
    pub fn on_open(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        *self = Self::Open;
        true
    }

    /// Returns the reason only on an actual `Open -> Closed` transition.
    pub fn on_close(&mut self, reason: CloseReason) -> Option<CloseReason> {
        if !self.is_open() {
            return None;
        }
        *self = Self::Closed;
        Some(reason)
    }
}
