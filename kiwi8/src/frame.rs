use bitvec::prelude::*;
#[cfg(feature = "embedded-graphics")]
use embedded_graphics::{image::ImageRaw, pixelcolor::BinaryColor};

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub(crate) const MEM_LENGTH: usize = WIDTH * HEIGHT / 8;

/// An opaque struct holding frame of Kiwi8 display
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Frame([u8; MEM_LENGTH]);

/// A shared view over a `Frame`
///
/// Has different accessors for the content of frames, which can be used independently
/// to fulfill the needs.
///
/// Each pixel is represented either by a corresponding bit being set, or by `true` value.
/// Internally, the data is stored in a form of concatenating rows from top to bottom of the frame.
/// Rows are represented as an individual bits of continuous memory, matching the state of pixels
/// from left to the right.
///
/// #Note:
/// Can return ImageRaw instance with `embedded-graphics` feature on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FrameView<'a>(&'a [u8; MEM_LENGTH]);

impl<'a> FrameView<'a> {
    /// View the raw memory of a frame
    pub fn as_raw(&self) -> &[u8] {
        self.0
    }

    /// Create an immutable copy of a frame
    pub fn copy_frame(self) -> Frame {
        Frame(*self.0)
    }

    /// Access frame's bits by indexes
    pub fn get_bit(&self, x: usize, y: usize) -> Option<&bool> {
        self.iter_rows_as_bitslices()
            .nth(y)
            .and_then(|row| row.get(x))
    }

    /// Number of lit pixels
    pub fn count_lit(&self) -> usize {
        self.0.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Get iterator over rows in a form of a `BitSlice`s
    pub fn iter_rows_as_bitslices(&self) -> impl Iterator<Item = &'a BitSlice<Msb0, u8>> {
        self.0.chunks(WIDTH / 8).map(|row| row.view_bits::<_>())
    }

    /// Iter frame pixelwise (each pixel in row for each row in frame) after scaling it
    /// by a given factor.
    pub fn iter_pixelwise_scaled(
        &self,
        scale: usize,
    ) -> impl Iterator<Item = impl Iterator<Item = &bool>> {
        self.iter_rows_as_bitslices()
            .zip(core::iter::repeat(scale))
            .map(move |(row, scale)| {
                row.iter()
                    .flat_map(move |bit| core::iter::repeat(bit).take(scale))
            })
            .flat_map(move |row| core::iter::repeat(row).take(scale))
    }

    /// Get `ImageRaw` structure from frame's data
    #[cfg(feature = "embedded-graphics")]
    pub fn as_raw_image(&self) -> ImageRaw<'_, BinaryColor> {
        ImageRaw::new(self.as_raw(), WIDTH as u32, HEIGHT as u32)
    }
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self([0; MEM_LENGTH])
    }

    /// Get view over frame
    pub fn view(&self) -> FrameView<'_> {
        FrameView(&self.0)
    }

    pub(crate) fn clear(&mut self) {
        self.0 = [0; MEM_LENGTH];
    }

    /// XOR `sprite` onto the frame with its top-left corner at (`x`, `y`)
    ///
    /// Every pixel wraps around both edges on its own. Returns whether any lit
    /// pixel was turned off.
    pub(crate) fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (row, &line) in sprite.iter().enumerate() {
            let py = (y as usize + row) % HEIGHT;
            for col in (0..8).filter(|col| line & (0x80u8 >> col) != 0) {
                let px = (x as usize + col) % WIDTH;
                collision |= self.xor_bit(px, py, true).unwrap_or(false);
            }
        }
        collision
    }

    /// Returns state of the bit before it was flipped
    pub(crate) fn xor_bit(&mut self, x: usize, y: usize, val: bool) -> Option<bool> {
        self.iter_rows_as_bitslices_mut()
            .nth(y)
            .and_then(|row| row.get_mut(x))
            .map(|mut bit| {
                let previous = *bit;
                *bit ^= val;
                previous
            })
    }

    pub(crate) fn iter_rows_as_bitslices_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut BitSlice<Msb0, u8>> {
        self.0
            .chunks_mut(WIDTH / 8)
            .map(|row| row.view_bits_mut::<_>())
    }
}

#[cfg(test)]
impl Frame {
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

#[cfg(test)]
mod frame_test {
    use super::*;
    use crate::utils::testing::ToMask;

    #[test]
    fn get_bit() {
        let mut frame = Frame::new();
        frame.as_raw_mut()[0] = 0b1000_0000;

        assert_eq!(frame.view().get_bit(0, 0), Some(&true));
        assert_eq!(frame.view().get_bit(1, 0), Some(&false));
        assert_eq!(frame.view().get_bit(0, 1), Some(&false));
        assert_eq!(frame.view().get_bit(WIDTH, 0), None);
        assert_eq!(frame.view().get_bit(0, HEIGHT), None);
    }

    #[test]
    fn xor_bit() {
        let mut frame = Frame::new();
        assert_eq!(frame.xor_bit(0, 0, false), Some(false));
        assert_eq!(frame.view().get_bit(0, 0), Some(&false));
        assert_eq!(frame.xor_bit(0, 0, true), Some(false));
        assert_eq!(frame.view().get_bit(0, 0), Some(&true));
        assert_eq!(frame.xor_bit(0, 0, false), Some(true));
        assert_eq!(frame.view().get_bit(0, 0), Some(&true));
        assert_eq!(frame.xor_bit(0, 0, true), Some(true));
        assert_eq!(frame.view().get_bit(0, 0), Some(&false));
        assert_eq!(frame.xor_bit(WIDTH, 0, true), None);
    }

    #[test]
    fn draw_twice_erases() {
        let mut frame = Frame::new();
        assert!(!frame.draw_sprite(10, 4, &[0b1011_0001]));
        assert_eq!(frame.view().count_lit(), 4);
        assert!(frame.draw_sprite(10, 4, &[0b1011_0001]));
        assert_eq!(frame.view().count_lit(), 0);
    }

    #[test]
    fn draw_partial_overlap_collides() {
        let mut frame = Frame::new();
        frame.draw_sprite(0, 0, &[0b1000_0000]);
        assert!(frame.draw_sprite(0, 0, &[0b1100_0000]));
        assert_eq!(frame.view().get_bit(0, 0), Some(&false));
        assert_eq!(frame.view().get_bit(1, 0), Some(&true));
    }

    #[test]
    fn draw_wraps_per_pixel() {
        let mut frame = Frame::new();
        let collision = frame.draw_sprite(63, 31, &[0b1100_0000, 0b1100_0000]);
        assert!(!collision);
        assert_eq!(
            frame.view().to_mask(),
            include_str!("../test-data/masks/corners").to_mask(),
        );
    }

    #[test]
    fn draw_overlapping_rows_after_wrap() {
        let mut frame = Frame::new();
        // 33 rows cannot come from one DXYN, but the wrap of row 32 onto row 0 is what is tested
        let mut sprite = [0u8; HEIGHT + 1];
        sprite[0] = 0b1000_0000;
        sprite[HEIGHT] = 0b1000_0000;
        assert!(frame.draw_sprite(0, 0, &sprite));
        assert_eq!(frame.view().count_lit(), 0);
    }

    #[test]
    fn clear() {
        let mut frame = Frame::new();
        frame.draw_sprite(3, 3, &[0xFF; 15]);
        assert_eq!(frame.view().count_lit(), 8 * 15);
        frame.clear();
        assert_eq!(frame.view(), Frame::new().view());
    }

    #[test]
    fn scaled_iteration() {
        let mut frame = Frame::new();
        frame.as_raw_mut()[0] = 0b1000_0000;
        let rows: usize = frame.view().iter_pixelwise_scaled(2).count();
        assert_eq!(rows, HEIGHT * 2);
        let lit: usize = frame
            .view()
            .iter_pixelwise_scaled(2)
            .map(|row| row.filter(|&&bit| bit).count())
            .sum();
        assert_eq!(lit, 4);
    }
}
