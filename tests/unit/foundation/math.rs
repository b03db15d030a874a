use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(200, 0), 0);
    assert_eq!(mul_div255_u8(255, 0xaa), 0xaa);
}

#[test]
fn round_half_up_snaps_halves_upward() {
    assert_eq!(round_half_up(63.5), 64);
    assert_eq!(round_half_up(63.49), 63);
    assert_eq!(round_half_up(64.0), 64);
    assert_eq!(round_half_up(0.0), 0);
}
