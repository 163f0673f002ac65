pub const KEYS: usize = 16;

/// State of the 4x4 hexadecimal keypad, index is the key value
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Keypad([bool; KEYS]);

impl Keypad {
    pub fn new() -> Self {
        Self([false; KEYS])
    }

    /// Returns `false` if there is no such key
    pub fn set(&mut self, key: usize, pressed: bool) -> bool {
        match self.0.get_mut(key) {
            Some(state) => {
                *state = pressed;
                true
            }
            None => false,
        }
    }

    /// Keys outside of 0x0..=0xF are never pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.0.get(key as usize).copied().unwrap_or(false)
    }

    /// Lowest pressed key
    pub fn first_pressed(&self) -> Option<u8> {
        self.0.iter().position(|&pressed| pressed).map(|key| key as u8)
    }

    pub fn as_array(&self) -> &[bool; KEYS] {
        &self.0
    }
}
