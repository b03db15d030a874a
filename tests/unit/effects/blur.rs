use super::*;

fn uniform(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    px.repeat((w * h) as usize)
}

fn pixel(buf: &[u8], w: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * w + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

#[test]
fn window_of_one_is_identity_on_uniform_color() {
    let (w, h) = (7u32, 5u32);
    let src = uniform(w, h, [10, 20, 30, 40]);
    let mut buf = src.clone();
    box_blur_rgba8_premul(&mut buf, w, h, 0, EdgeMode::Repeat, EdgeMode::Clamp).unwrap();
    assert_eq!(buf, src);
}

#[test]
fn radius_0_is_identity_on_arbitrary_data() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let mut buf = src.clone();
    box_blur_rgba8_premul(&mut buf, 1, 2, 0, EdgeMode::Clamp, EdgeMode::Clamp).unwrap();
    assert_eq!(buf, src);
}

#[test]
fn uniform_color_survives_any_radius_and_mode() {
    let (w, h) = (16u32, 8u32);
    let src = uniform(w, h, [170, 85, 3, 255]);
    for radius in [1, 4, 20] {
        for (hm, vm) in [
            (EdgeMode::Repeat, EdgeMode::Clamp),
            (EdgeMode::Clamp, EdgeMode::Repeat),
            (EdgeMode::Repeat, EdgeMode::Repeat),
        ] {
            let mut buf = src.clone();
            box_blur_rgba8_premul(&mut buf, w, h, radius, hm, vm).unwrap();
            assert_eq!(buf, src, "radius={radius} modes={hm:?}/{vm:?}");
        }
    }
}

#[test]
fn horizontal_repeat_wraps_across_the_seam() {
    let (w, h) = (8u32, 1u32);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    buf[0..4].copy_from_slice(&[90, 90, 90, 90]);

    let mut wrapped = buf.clone();
    box_blur_rgba8_premul(&mut wrapped, w, h, 1, EdgeMode::Repeat, EdgeMode::Clamp).unwrap();
    assert_eq!(pixel(&wrapped, w, 7, 0), [30, 30, 30, 30]);
    assert_eq!(pixel(&wrapped, w, 0, 0), [30, 30, 30, 30]);
    assert_eq!(pixel(&wrapped, w, 1, 0), [30, 30, 30, 30]);
    assert_eq!(pixel(&wrapped, w, 4, 0), [0, 0, 0, 0]);

    let mut clamped = buf.clone();
    box_blur_rgba8_premul(&mut clamped, w, h, 1, EdgeMode::Clamp, EdgeMode::Clamp).unwrap();
    assert_eq!(pixel(&clamped, w, 7, 0), [0, 0, 0, 0]);
    // Clamp re-samples the edge pixel for the out-of-range tap.
    assert_eq!(pixel(&clamped, w, 0, 0), [60, 60, 60, 60]);
}

#[test]
fn vertical_clamp_does_not_bleed_between_top_and_bottom() {
    let (w, h) = (1u32, 8u32);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    buf[0..4].copy_from_slice(&[90, 90, 90, 90]);

    box_blur_rgba8_premul(&mut buf, w, h, 1, EdgeMode::Repeat, EdgeMode::Clamp).unwrap();
    assert_eq!(pixel(&buf, w, 0, 7), [0, 0, 0, 0]);
    assert_eq!(pixel(&buf, w, 0, 1), [30, 30, 30, 30]);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    let center = ((4 * w + 4) * 4) as usize;
    buf[center..center + 4].copy_from_slice(&[225, 225, 225, 225]);

    box_blur_rgba8_premul(&mut buf, w, h, 1, EdgeMode::Repeat, EdgeMode::Clamp).unwrap();

    let nonzero = buf.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert_eq!(nonzero, 9);
    let sum_a: u32 = buf.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert_eq!(sum_a, 225);
}

#[test]
fn rejects_mismatched_buffer_and_oversized_radius() {
    let mut short = vec![0u8; 12];
    assert!(matches!(
        box_blur_rgba8_premul(&mut short, 2, 2, 1, EdgeMode::Clamp, EdgeMode::Clamp),
        Err(BackdropError::Validation(_))
    ));

    let mut buf = vec![0u8; 16];
    assert!(
        box_blur_rgba8_premul(&mut buf, 2, 2, 256, EdgeMode::Clamp, EdgeMode::Clamp).is_err()
    );
}

#[test]
fn image_wrapper_blurs_in_place() {
    let mut img = RgbaImage::new(4, 4);
    img.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
    box_blur_image(&mut img, 1, EdgeMode::Repeat, EdgeMode::Clamp).unwrap();
    assert!(img.get_pixel(3, 0)[3] > 0);
    assert_eq!(img.get_pixel(2, 3)[3], 0);
}
