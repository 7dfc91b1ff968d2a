//! Automatic layer colors.
//!
//! New layers get a hue that is as far as possible (in RGB) from every color
//! already in use. Candidates are drawn at a fixed saturation and value so
//! that only hue varies, and the best of [`HUE_CANDIDATES`] draws wins.

use rand::Rng;

use crate::layers::layer::Color;
use crate::topology::element::ElementType;

/// Number of random hues scored per new layer.
pub const HUE_CANDIDATES: usize = 16;
/// Saturation of generated colors.
pub const AUTO_SATURATION: f32 = 0.75;
/// Value (brightness) of generated colors.
pub const AUTO_VALUE: f32 = 0.95;
/// Default alpha for face layers; faces are drawn translucent over geometry.
pub const FACE_ALPHA: f32 = 0.4;

/// Default alpha for a new layer of `ty`.
#[inline]
pub fn default_alpha(ty: ElementType) -> f32 {
    match ty {
        ElementType::Face => FACE_ALPHA,
        ElementType::Edge | ElementType::Vert => 1.0,
    }
}

/// HSV (all in `[0, 1]`) to RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u8 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

fn rgb_distance(a: [f32; 3], b: &Color) -> f32 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
}

/// Pick a color for a new layer of `ty`, maximizing the minimum RGB distance
/// to `existing`.
///
/// With no existing colors every candidate scores equally and the first draw
/// is kept. If scoring produces nothing usable, a plain random RGB color is
/// returned instead.
pub fn auto_color<R: Rng + ?Sized>(existing: &[Color], ty: ElementType, rng: &mut R) -> Color {
    let alpha = default_alpha(ty);
    let best = (0..HUE_CANDIDATES)
        .map(|_| hsv_to_rgb(rng.gen_range(0.0..1.0), AUTO_SATURATION, AUTO_VALUE))
        .map(|rgb| {
            let score = existing
                .iter()
                .map(|c| rgb_distance(rgb, c))
                .fold(f32::INFINITY, f32::min);
            (rgb, score)
        })
        .filter(|(_, score)| !score.is_nan())
        .fold(None::<([f32; 3], f32)>, |best, cand| match best {
            Some(b) if b.1 >= cand.1 => Some(b),
            _ => Some(cand),
        });

    match best {
        Some((rgb, _)) => [rgb[0], rgb[1], rgb[2], alpha],
        None => [
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            alpha,
        ],
    }
}
