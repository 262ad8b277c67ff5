use image::{ImageBuffer, Pixel};

use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8_weight};

/// Cross-dissolve weight for frame `frame_index` of `total_frames`: `i / (N - 1)`.
///
/// A single-frame run has no second endpoint and yields `0.0`.
pub fn dissolve_weight(frame_index: u64, total_frames: u64) -> f64 {
    if total_frames <= 1 {
        return 0.0;
    }
    (frame_index as f64 / (total_frames - 1) as f64).clamp(0.0, 1.0)
}

/// `a · (1 - t) + b · t` per channel, with `t` quantized to 1/255 steps.
///
/// `t == 0` returns `a` and `t == 1` returns `b` exactly.
pub fn crossfade<P>(a: P, b: P, t: f64) -> P
where
    P: Pixel<Subpixel = u8>,
{
    let tt = unit_to_u8_weight(t);
    let it = 255u16 - tt;

    let mut out = a;
    for (o, (&av, &bv)) in out
        .channels_mut()
        .iter_mut()
        .zip(a.channels().iter().zip(b.channels()))
    {
        let av = mul_div255_u8(u16::from(av), it);
        let bv = mul_div255_u8(u16::from(bv), tt);
        *o = av.saturating_add(bv);
    }
    out
}

/// Write the cross-dissolve of `a` and `b` into `dst`. All three buffers must share dimensions.
pub fn crossfade_into<P>(
    dst: &mut ImageBuffer<P, Vec<u8>>,
    a: &ImageBuffer<P, Vec<u8>>,
    b: &ImageBuffer<P, Vec<u8>>,
    t: f64,
) -> MorphResult<()>
where
    P: Pixel<Subpixel = u8>,
{
    if dst.dimensions() != a.dimensions() || dst.dimensions() != b.dimensions() {
        return Err(MorphError::evaluation(format!(
            "crossfade expects equal-sized buffers, got {:?}, {:?} and {:?}",
            dst.dimensions(),
            a.dimensions(),
            b.dimensions()
        )));
    }
    for ((d, pa), pb) in dst.pixels_mut().zip(a.pixels()).zip(b.pixels()) {
        *d = crossfade(*pa, *pb, t);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/blend.rs"]
mod tests;
