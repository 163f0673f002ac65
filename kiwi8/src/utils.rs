#[cfg(test)]
pub mod testing {
    use core::fmt;
    use core::ops::RangeBounds;

    use crate::frame::{FrameView, HEIGHT, WIDTH};

    #[macro_export]
    macro_rules! assert_eq_2d {
        (x_range: $xrange:expr, y_range: $yrange:expr; $lhs:expr, $rhs:expr $(,)?) => {{
            let mut lhs_mask = crate::utils::testing::ImageMask::new();
            let mut rhs_mask = crate::utils::testing::ImageMask::new();
            lhs_mask.set_slice($xrange, $yrange, &$lhs);
            rhs_mask.set_slice($xrange, $yrange, &$rhs);
            assert_eq!(lhs_mask, rhs_mask);
        }};
    }

    #[derive(Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ImageMask([[bool; WIDTH]; HEIGHT]);

    impl ImageMask {
        pub fn new() -> Self {
            Self([[false; WIDTH]; HEIGHT])
        }

        pub fn set_slice<T>(&mut self, range_x: T, range_y: T, other: &Self)
        where
            T: RangeBounds<usize>,
        {
            for x in 0..WIDTH {
                for y in 0..HEIGHT {
                    if range_x.contains(&x) && range_y.contains(&y) {
                        self.0[y][x] = other.0[y][x];
                    }
                }
            }
        }
    }

    impl fmt::Debug for ImageMask {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let width = WIDTH + 2;
            write!(f, "\n")?;
            for _ in 0..width {
                write!(f, "-")?;
            }
            write!(f, "\n")?;
            for row in &self.0 {
                write!(f, "|")?;
                row.iter()
                    .map(|&p| if p { write!(f, "#") } else { write!(f, ".") })
                    .fold(Ok(()), |acc, r| acc.and(r))?;
                write!(f, "|\n")?;
            }
            for _ in 0..width {
                write!(f, "-")?;
            }
            Ok(())
        }
    }

    pub trait ToMask {
        fn to_mask(&self) -> ImageMask;
    }

    /// Rows separated by whitespace, `#` is a lit pixel
    impl ToMask for str {
        fn to_mask(&self) -> ImageMask {
            let mut mask = ImageMask::new();
            mask.0
                .iter_mut()
                .zip(self.split_whitespace())
                .for_each(|(m_row, c_row)| {
                    m_row
                        .iter_mut()
                        .zip(c_row.chars())
                        .for_each(|(m, c)| *m = c == '#')
                });
            mask
        }
    }

    impl ToMask for FrameView<'_> {
        fn to_mask(&self) -> ImageMask {
            let mut mask = ImageMask::new();
            self.iter_rows_as_bitslices()
                .zip(mask.0.iter_mut())
                .for_each(|(f_row, m_row)| {
                    m_row
                        .iter_mut()
                        .zip(f_row)
                        .for_each(|(m, &f)| *m = f)
                });
            mask
        }
    }

    #[cfg(feature = "embedded-graphics")]
    mod pixels {
        use super::{ImageMask, ToMask};
        use embedded_graphics::{drawable::Pixel, pixelcolor::BinaryColor};

        impl<I> ToMask for I
        where
            I: Iterator<Item = Pixel<BinaryColor>> + Clone,
        {
            fn to_mask(&self) -> ImageMask {
                let mut mask = ImageMask::new();
                self.clone().for_each(|Pixel(point, color)| {
                    if color == BinaryColor::On {
                        mask.0[point.y as usize][point.x as usize] = true;
                    }
                });
                mask
            }
        }
    }

    mod tests {
        use super::*;
        use crate::frame::Frame;

        #[test]
        fn to_image_mask() {
            let empty_mask_str = include_str!("../test-data/masks/empty");
            let full_mask_str = include_str!("../test-data/masks/full");

            let mut frame = Frame::new();
            assert_eq!(ImageMask::new(), frame.view().to_mask());
            assert_eq!(empty_mask_str.to_mask(), frame.view().to_mask());

            frame.as_raw_mut().iter_mut().for_each(|byte| *byte = 0xFF);
            assert_eq!(full_mask_str.to_mask(), frame.view().to_mask());
        }

        #[test]
        fn compare_slices() {
            let full = include_str!("../test-data/masks/full").to_mask();
            let corners = include_str!("../test-data/masks/corners").to_mask();
            assert_eq_2d!(x_range: 0..1, y_range: 0..1; full, corners);
            assert_eq_2d!(x_range: 30..34, y_range: 10..20; ImageMask::new(), corners);
        }

        #[cfg(feature = "embedded-graphics")]
        #[test]
        fn raw_image_pixels() {
            use embedded_graphics::image::IntoPixelIter;

            let mut frame = Frame::new();
            frame.draw_sprite(63, 31, &[0b1100_0000, 0b1100_0000]);
            let view = frame.view();
            let image = view.as_raw_image();
            assert_eq!(
                image.pixel_iter().to_mask(),
                include_str!("../test-data/masks/corners").to_mask(),
            );
        }
    }
}
