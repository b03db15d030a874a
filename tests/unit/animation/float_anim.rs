use super::*;

#[test]
fn idle_animation_reports_inactive() {
    let mut anim = FloatAnimation::new(0.0, 1.0, 500);
    assert!(!anim.is_active());
    assert!(!anim.calculate(1_000));
    assert_eq!(anim.get(), 1.0);
}

#[test]
fn first_sample_after_start_anchors_time_zero() {
    let mut anim = FloatAnimation::new(0.0, 1.0, 500);
    anim.start();
    assert!(anim.is_active());
    assert!(anim.calculate(10_000));
    assert_eq!(anim.get(), 0.0);
    assert!(anim.calculate(10_250));
    assert!((anim.get() - 0.5).abs() < 1e-6);
}

#[test]
fn reaching_duration_snaps_to_end_and_deactivates() {
    let mut anim = FloatAnimation::new(0.0, 1.0, 500);
    anim.start();
    anim.calculate(0);
    assert!(anim.calculate(499));
    assert!(!anim.calculate(500));
    assert_eq!(anim.get(), 1.0);
    assert!(!anim.is_active());
}

#[test]
fn late_sample_past_duration_still_ends_at_target() {
    let mut anim = FloatAnimation::new(0.0, 1.0, 500);
    anim.start();
    anim.calculate(100);
    assert!(!anim.calculate(9_999));
    assert_eq!(anim.get(), 1.0);
}

#[test]
fn restart_resets_to_from() {
    let mut anim = FloatAnimation::new(0.0, 1.0, 500);
    anim.start();
    anim.calculate(0);
    anim.calculate(400);
    anim.start();
    assert_eq!(anim.get(), 0.0);
    assert!(anim.calculate(1_000));
    assert_eq!(anim.get(), 0.0);
}

#[test]
fn ease_shapes_intermediate_values() {
    let mut anim = FloatAnimation::new(0.0, 1.0, 100).with_ease(Ease::InQuad);
    anim.start();
    anim.calculate(0);
    anim.calculate(50);
    assert!((anim.get() - 0.25).abs() < 1e-6);
}

#[test]
fn zero_duration_completes_on_first_sample() {
    let mut anim = FloatAnimation::new(0.0, 1.0, 0);
    anim.start();
    assert!(!anim.calculate(42));
    assert_eq!(anim.get(), 1.0);
}
