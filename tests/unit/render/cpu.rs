use super::*;

fn canvas(w: u32, h: u32) -> CpuCanvas {
    CpuCanvas::new(CpuCanvasOpts {
        width: w,
        height: h,
        clear_rgba: [0, 0, 0, 255],
    })
    .unwrap()
}

fn upload(c: &mut CpuCanvas, px: [u8; 4]) -> NativeTextureId {
    let id = c.create_texture(2, 1);
    assert_eq!(c.take_error(), None);
    c.upload_texture(id, &RgbaImage::from_pixel(2, 1, image::Rgba(px)))
        .unwrap();
    id
}

#[test]
fn clear_fills_frame() {
    let c = canvas(3, 2);
    assert_eq!(c.pixel(2, 1), Some([0, 0, 0, 255]));
    assert_eq!(c.pixel(3, 0), None);
    assert_eq!(c.frame().data.len(), 3 * 2 * 4);
}

#[test]
fn single_draw_is_clipped_to_frame() {
    let mut c = canvas(8, 4);
    let id = upload(&mut c, [200, 100, 50, 255]);
    c.draw_texture(DrawSource::Single(id), TileRect::new(-2, 0, 4, 4))
        .unwrap();
    assert_eq!(c.pixel(0, 0), Some([200, 100, 50, 255]));
    assert_eq!(c.pixel(1, 3), Some([200, 100, 50, 255]));
    assert_eq!(c.pixel(2, 0), Some([0, 0, 0, 255]));
}

#[test]
fn mixed_draw_blends_linearly() {
    let mut c = canvas(4, 4);
    let a = upload(&mut c, [0, 0, 0, 255]);
    let b = upload(&mut c, [254, 254, 254, 255]);
    c.draw_texture(
        DrawSource::Mixed {
            from: a,
            to: b,
            ratio: 0.5,
        },
        TileRect::new(0, 0, 4, 4),
    )
    .unwrap();
    let px = c.pixel(1, 1).unwrap();
    assert!((126..=128).contains(&px[0]), "{px:?}");
    assert_eq!(px[3], 255);
}

#[test]
fn zero_sized_texture_raises_error_flag() {
    let mut c = canvas(4, 4);
    let _ = c.create_texture(0, 4);
    assert_eq!(c.take_error(), Some(0x0501));
    assert_eq!(c.take_error(), None);
}

#[test]
fn drawing_deleted_texture_fails() {
    let mut c = canvas(4, 4);
    let id = upload(&mut c, [1, 1, 1, 255]);
    c.delete_texture(id);
    assert_eq!(c.texture_count(), 0);
    assert!(
        c.draw_texture(DrawSource::Single(id), TileRect::new(0, 0, 4, 4))
            .is_err()
    );
}

#[test]
fn each_canvas_has_its_own_context() {
    assert_ne!(canvas(1, 1).context_id(), canvas(1, 1).context_id());
}
