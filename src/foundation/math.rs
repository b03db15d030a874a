pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Round-half-up, the pixel-snapping rule used for every scaled dimension.
///
/// Matches `(int) (v + 0.5)` for the non-negative values this crate produces.
pub(crate) fn round_half_up(v: f32) -> i64 {
    (f64::from(v) + 0.5).floor() as i64
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
