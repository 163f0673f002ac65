/// Outcome of a single timer decrement
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerState {
    /// Still counting down
    On,
    /// Was already at zero
    Off,
    /// Reached zero on this very decrement
    Finished,
}

/// 8-bit countdown register, clamped at zero
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timer(u8);

impl Timer {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn store(&mut self, value: u8) {
        self.0 = value;
    }

    #[inline]
    pub fn load(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn decrement(&mut self) -> TimerState {
        if self.0 > 0 {
            self.0 -= 1;
            if self.0 == 0 {
                TimerState::Finished
            } else {
                TimerState::On
            }
        } else {
            TimerState::Off
        }
    }
}
