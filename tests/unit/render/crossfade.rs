use super::*;
use crate::foundation::error::BackdropError;
use crate::render::recording::RecordingCanvas;
use crate::render::texture::TextureState;

fn tex(v: u8) -> TextureHandle {
    TextureHandle::from_image(image::RgbaImage::from_pixel(
        2,
        1,
        image::Rgba([v, v, v, 255]),
    ))
}

const RECT: TileRect = TileRect::new(0, 0, 128, 64);

#[test]
fn first_texture_is_drawn_alone_at_ratio_one() {
    let mut canvas = RecordingCanvas::new();
    let mut blend = CrossFade::new(tex(1));
    assert_eq!(blend.mixture_ratio(), 1.0);
    assert!(blend.previous().is_none());

    blend.draw(&mut canvas, RECT).unwrap();
    let id = blend.destination().native_id().unwrap();
    assert_eq!(canvas.draws(), vec![(DrawSource::Single(id), RECT)]);
}

#[test]
fn no_previous_draws_destination_regardless_of_ratio() {
    let mut canvas = RecordingCanvas::new();
    let mut blend = CrossFade::new(tex(1));
    blend.set_mixture_ratio(0.0);
    blend.draw(&mut canvas, RECT).unwrap();
    let id = blend.destination().native_id().unwrap();
    assert_eq!(canvas.draws()[0].0, DrawSource::Single(id));
}

#[test]
fn new_destination_fades_from_old_one() {
    let mut canvas = RecordingCanvas::new();
    let mut blend = CrossFade::new(tex(1));
    blend.bind(&mut canvas).unwrap();
    let first = blend.destination().native_id().unwrap();

    blend.set_destination(tex(2));
    assert_eq!(blend.mixture_ratio(), 0.0);
    assert_eq!(blend.previous().unwrap().native_id(), Some(first));

    // Ratio 0 shows only the previous texture.
    blend.draw(&mut canvas, RECT).unwrap();
    let second = blend.destination().native_id().unwrap();
    assert_eq!(canvas.draws()[0].0, DrawSource::Single(first));

    blend.set_mixture_ratio(0.25);
    blend.draw(&mut canvas, RECT).unwrap();
    assert_eq!(
        canvas.draws()[1].0,
        DrawSource::Mixed {
            from: first,
            to: second,
            ratio: 0.25
        }
    );

    blend.set_mixture_ratio(1.0);
    blend.draw(&mut canvas, RECT).unwrap();
    assert_eq!(canvas.draws()[2].0, DrawSource::Single(second));
}

#[test]
fn ratio_is_clamped() {
    let mut blend = CrossFade::new(tex(1));
    blend.set_mixture_ratio(1.7);
    assert_eq!(blend.mixture_ratio(), 1.0);
    blend.set_mixture_ratio(-0.3);
    assert_eq!(blend.mixture_ratio(), 0.0);
    blend.set_mixture_ratio(f32::NAN);
    assert_eq!(blend.mixture_ratio(), 0.0);
}

#[test]
fn superseded_previous_is_released_exactly_once_on_next_bind() {
    let mut canvas = RecordingCanvas::new();
    let mut blend = CrossFade::new(tex(1));
    blend.bind(&mut canvas).unwrap();
    let first = blend.destination().native_id().unwrap();

    blend.set_destination(tex(2));
    blend.bind(&mut canvas).unwrap();
    assert!(canvas.deleted().is_empty(), "previous is still in use");

    blend.set_destination(tex(3));
    assert_eq!(blend.retired_len(), 1);
    assert!(canvas.deleted().is_empty(), "release waits for a canvas");

    blend.bind(&mut canvas).unwrap();
    assert_eq!(canvas.deleted(), vec![first]);
    assert_eq!(blend.retired_len(), 0);

    blend.bind(&mut canvas).unwrap();
    assert_eq!(canvas.deleted(), vec![first]);
    assert_eq!(canvas.live_textures(), 2);
}

#[test]
fn bind_on_foreign_context_keeps_retired_textures() {
    let mut home = RecordingCanvas::new();
    let mut away = RecordingCanvas::new();
    let mut blend = CrossFade::new(tex(1));
    blend.bind(&mut home).unwrap();
    let first = blend.destination().native_id().unwrap();
    blend.set_destination(tex(2));
    blend.bind(&mut home).unwrap();
    blend.set_destination(tex(3));
    assert_eq!(blend.retired_len(), 1);

    let err = blend.bind(&mut away).unwrap_err();
    assert!(matches!(err, BackdropError::ContextMismatch { .. }));
    assert_eq!(blend.retired_len(), 1);
    assert!(away.events().is_empty());

    blend.bind(&mut home).unwrap();
    assert_eq!(home.deleted(), vec![first]);
    blend.release(&mut home).unwrap();
    assert_eq!(home.live_textures(), 0);
}

#[test]
fn release_on_foreign_context_hands_blend_back() {
    let mut home = RecordingCanvas::new();
    let mut away = RecordingCanvas::new();
    let mut blend = CrossFade::new(tex(1));
    blend.bind(&mut home).unwrap();
    blend.set_destination(tex(2));
    blend.bind(&mut home).unwrap();
    blend.set_destination(tex(3));

    let (blend, err) = blend.release(&mut away).unwrap_err();
    assert!(matches!(err, BackdropError::ContextMismatch { .. }));
    assert!(away.events().is_empty());
    assert_eq!(blend.retired_len(), 1);
    assert!(home.deleted().is_empty());

    blend.release(&mut home).unwrap();
    assert_eq!(home.live_textures(), 0);
    assert_eq!(home.deleted().len(), 2);
}

#[test]
fn never_uploaded_texture_retires_without_gpu_work() {
    let mut canvas = RecordingCanvas::new();
    let mut blend = CrossFade::new(tex(1));
    blend.set_destination(tex(2));
    blend.set_destination(tex(3));
    assert_eq!(blend.retired_len(), 1);
    blend.bind(&mut canvas).unwrap();
    assert!(canvas.deleted().is_empty());
    assert_eq!(blend.destination().state(), TextureState::Loaded);
}

#[test]
fn release_frees_every_owned_texture() {
    let mut canvas = RecordingCanvas::new();
    let mut blend = CrossFade::new(tex(1));
    blend.bind(&mut canvas).unwrap();
    blend.set_destination(tex(2));
    blend.bind(&mut canvas).unwrap();
    blend.release(&mut canvas).unwrap();
    assert_eq!(canvas.live_textures(), 0);
    assert_eq!(canvas.deleted().len(), 2);
}

#[test]
fn opaque_when_both_halves_are_opaque() {
    let mut blend = CrossFade::new(tex(1));
    assert!(blend.is_opaque());
    blend.set_destination(tex(2));
    assert!(blend.is_opaque());
}
