//! Conversion between normalized UVs and atlas pixels.
//!
//! Pixel values are rounded to the nearest integer with ties going to the
//! even neighbour, which is what the tooling that produced existing
//! descriptors did. `0.5 * 5` therefore becomes `2`, not `3`.

/// Round a pixel-space value to an integer pixel.
pub trait PixelRound<U> {
    fn pixel_round(self) -> U;
}

impl PixelRound<f64> for f64 {
    #[inline]
    fn pixel_round(self) -> f64 {
        self.round_ties_even()
    }
}

impl PixelRound<i32> for f64 {
    #[inline]
    fn pixel_round(self) -> i32 {
        self.round_ties_even() as i32
    }
}

/// Scale a UV component up to pixels, unrounded.
#[inline]
pub fn uv_to_pixel(uv: f32, extent: i16) -> f64 {
    uv as f64 * extent as f64
}

/// Scale a UV component up to pixels and round it.
#[inline]
pub fn uv_to_pixel_rounded(uv: f32, extent: i16) -> i32 {
    uv_to_pixel(uv, extent).pixel_round()
}

/// Normalize a pixel coordinate against an atlas dimension.
///
/// Callers check that `extent` is positive first.
#[inline]
pub fn pixel_to_uv(pixel: i32, extent: i16) -> f32 {
    pixel as f32 / extent as f32
}
