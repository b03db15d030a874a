use image::RgbaImage;

use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Source-over of premultiplied `src` onto premultiplied `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(src[i], mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Linear mix of two premultiplied pixels; `t = 0` yields `a`, `t = 1` yields `b`.
pub fn crossfade(a: PremulRgba8, b: PremulRgba8, t: f32) -> PremulRgba8 {
    let t = t.clamp(0.0, 1.0);
    let tt = ((t * 255.0).round() as i32).clamp(0, 255) as u16;
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255(u16::from(a[i]), it);
        let bv = mul_div255(u16::from(b[i]), tt);
        out[i] = add_sat_u8(av, bv);
    }
    out
}

/// Convert a straight-alpha pixel to premultiplied form.
pub fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        px[3],
    ]
}

/// Convert a premultiplied pixel back to straight alpha, e.g. for PNG output.
pub fn unpremultiply(px: PremulRgba8) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// Multiply the color channels by `tint` and leave alpha alone
/// (a lighting filter with a zero additive term).
pub fn tint(px: PremulRgba8, tint_rgb: [u8; 3]) -> PremulRgba8 {
    [
        mul_div255(u16::from(px[0]), u16::from(tint_rgb[0])),
        mul_div255(u16::from(px[1]), u16::from(tint_rgb[1])),
        mul_div255(u16::from(px[2]), u16::from(tint_rgb[2])),
        px[3],
    ]
}

/// Bilinear sample of `img` at continuous pixel coordinates `(x, y)`, where
/// integer coordinates address texel centers. Out-of-range taps clamp to the edge.
///
/// `premul` says whether `img` already stores premultiplied pixels; if not, each
/// tap is premultiplied before filtering so transparent texels don't darken edges.
pub fn sample_bilinear(img: &RgbaImage, x: f64, y: f64, premul: bool) -> PremulRgba8 {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return [0, 0, 0, 0];
    }

    let x0f = x.floor();
    let y0f = y.floor();
    let fx = (x - x0f) as f32;
    let fy = (y - y0f) as f32;

    let clamp_x = |v: f64| v.clamp(0.0, f64::from(w - 1)) as u32;
    let clamp_y = |v: f64| v.clamp(0.0, f64::from(h - 1)) as u32;
    let (x0, x1) = (clamp_x(x0f), clamp_x(x0f + 1.0));
    let (y0, y1) = (clamp_y(y0f), clamp_y(y0f + 1.0));

    let tap = |tx: u32, ty: u32| {
        let p = img.get_pixel(tx, ty).0;
        if premul { p } else { premultiply(p) }
    };

    let top = crossfade(tap(x0, y0), tap(x1, y0), fx);
    let bottom = crossfade(tap(x0, y1), tap(x1, y1), fx);
    crossfade(top, bottom, fy)
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
