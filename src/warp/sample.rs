use image::{ImageBuffer, Pixel};

use crate::foundation::core::Point;
use crate::foundation::math::round_to_u8;

/// How source pixels are read at fractional positions.
///
/// Both filters use pixel-centre coordinates (pixel `(x, y)` covers `[x, x + 1) × [y, y + 1)`)
/// and clamp to the nearest edge pixel outside the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFilter {
    /// Pixel containing the position.
    Nearest,
    /// Weighted mix of the four nearest pixel centres.
    #[default]
    Bilinear,
}

/// Read `img` at `p` (pixel space) with clamp-to-edge semantics.
pub fn sample<P>(img: &ImageBuffer<P, Vec<u8>>, p: Point, filter: SampleFilter) -> P
where
    P: Pixel<Subpixel = u8>,
{
    match filter {
        SampleFilter::Nearest => {
            let x = clamp_index(p.x.floor(), img.width());
            let y = clamp_index(p.y.floor(), img.height());
            *img.get_pixel(x, y)
        }
        SampleFilter::Bilinear => sample_bilinear(img, p),
    }
}

fn sample_bilinear<P>(img: &ImageBuffer<P, Vec<u8>>, p: Point) -> P
where
    P: Pixel<Subpixel = u8>,
{
    let u = p.x - 0.5;
    let v = p.y - 0.5;
    let (u0, v0) = (u.floor(), v.floor());
    let (fx, fy) = if u.is_finite() && v.is_finite() {
        (u - u0, v - v0)
    } else {
        (0.0, 0.0)
    };

    let x0 = clamp_index(u0, img.width());
    let x1 = clamp_index(u0 + 1.0, img.width());
    let y0 = clamp_index(v0, img.height());
    let y1 = clamp_index(v0 + 1.0, img.height());

    let p00 = img.get_pixel(x0, y0).channels();
    let p10 = img.get_pixel(x1, y0).channels();
    let p01 = img.get_pixel(x0, y1).channels();
    let p11 = img.get_pixel(x1, y1).channels();

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    let mut out = *img.get_pixel(x0, y0);
    for (c, ch) in out.channels_mut().iter_mut().enumerate() {
        let acc = f64::from(p00[c]) * w00
            + f64::from(p10[c]) * w10
            + f64::from(p01[c]) * w01
            + f64::from(p11[c]) * w11;
        *ch = round_to_u8(acc);
    }
    out
}

fn clamp_index(v: f64, len: u32) -> u32 {
    let max = i64::from(len.saturating_sub(1));
    // `as` saturates and maps NaN to 0.
    (v as i64).clamp(0, max) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/warp/sample.rs"]
mod tests;
