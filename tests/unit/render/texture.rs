use super::*;
use crate::render::recording::{CanvasEvent, RecordingCanvas};

fn thumb() -> RgbaImage {
    RgbaImage::from_pixel(4, 2, image::Rgba([1, 2, 3, 255]))
}

#[test]
fn first_bind_allocates_and_uploads() {
    let mut canvas = RecordingCanvas::new();
    let mut tex = TextureHandle::from_image(thumb());
    assert_eq!(tex.state(), TextureState::Unloaded);
    assert_eq!(tex.context(), None);

    tex.bind(&mut canvas).unwrap();
    assert_eq!(tex.state(), TextureState::Loaded);
    assert_eq!(tex.context(), Some(canvas.context_id()));
    let id = tex.native_id().unwrap();
    assert_eq!(
        canvas.events(),
        &[
            CanvasEvent::Create {
                id,
                width: 4,
                height: 2
            },
            CanvasEvent::Upload { id },
        ]
    );

    // A second bind is a no-op.
    tex.bind(&mut canvas).unwrap();
    assert_eq!(canvas.events().len(), 2);
}

#[test]
fn binding_on_foreign_context_is_a_contract_violation() {
    let mut home = RecordingCanvas::new();
    let mut away = RecordingCanvas::new();
    let mut tex = TextureHandle::from_image(thumb());
    tex.bind(&mut home).unwrap();

    let err = tex.bind(&mut away).unwrap_err();
    assert!(err.is_contract_violation());
    match err {
        BackdropError::ContextMismatch { owner, bound } => {
            assert_eq!(owner, home.context_id());
            assert_eq!(bound, away.context_id());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(
        tex.draw(&mut away, TileRect::new(0, 0, 4, 2)).is_err(),
        "draw must refuse the foreign context too"
    );
    assert!(away.draws().is_empty());
}

#[test]
fn allocation_error_is_checked_after_create() {
    let mut canvas = RecordingCanvas::new();
    canvas.fail_next_create(0x0505);
    let err = TextureHandle::allocate(&mut canvas, 8, 8).unwrap_err();
    assert!(matches!(err, BackdropError::Allocation { code: 0x0505 }));
}

#[test]
fn failed_lazy_load_moves_to_error_state() {
    let mut canvas = RecordingCanvas::new();
    canvas.fail_next_create(0x0502);
    let mut tex = TextureHandle::from_image(thumb());
    assert!(matches!(
        tex.bind(&mut canvas),
        Err(BackdropError::Allocation { code: 0x0502 })
    ));
    assert_eq!(tex.state(), TextureState::Error);
    assert!(tex.bind(&mut canvas).is_err());
}

#[test]
fn eager_allocation_is_loaded_on_creating_context() {
    let mut canvas = RecordingCanvas::new();
    let tex = TextureHandle::allocate(&mut canvas, 16, 8).unwrap();
    assert_eq!(tex.state(), TextureState::Loaded);
    assert_eq!(tex.context(), Some(canvas.context_id()));
    assert!(tex.is_opaque());
}

#[test]
fn release_deletes_once_on_owner_context() {
    let mut canvas = RecordingCanvas::new();
    let mut tex = TextureHandle::from_image(thumb());
    tex.bind(&mut canvas).unwrap();
    let id = tex.native_id().unwrap();
    tex.release(&mut canvas).unwrap();
    assert_eq!(canvas.deleted(), vec![id]);
    assert_eq!(canvas.live_textures(), 0);
}

#[test]
fn release_on_foreign_context_hands_handle_back() {
    let mut home = RecordingCanvas::new();
    let mut away = RecordingCanvas::new();
    let mut tex = TextureHandle::from_image(thumb());
    tex.bind(&mut home).unwrap();
    let id = tex.native_id().unwrap();

    let (tex, err) = tex.release(&mut away).unwrap_err();
    assert!(matches!(err, BackdropError::ContextMismatch { .. }));
    assert!(away.events().is_empty());
    assert_eq!(tex.native_id(), Some(id));

    tex.release(&mut home).unwrap();
    assert_eq!(home.deleted(), vec![id]);
}

#[test]
fn releasing_unloaded_texture_touches_nothing() {
    let mut canvas = RecordingCanvas::new();
    TextureHandle::from_image(thumb()).release(&mut canvas).unwrap();
    assert!(canvas.events().is_empty());
}

#[test]
fn draw_issues_single_source() {
    let mut canvas = RecordingCanvas::new();
    let mut tex = TextureHandle::from_image(thumb());
    let rect = TileRect::new(-2, 0, 128, 64);
    tex.draw(&mut canvas, rect).unwrap();
    let id = tex.native_id().unwrap();
    assert_eq!(canvas.draws(), vec![(DrawSource::Single(id), rect)]);
}
