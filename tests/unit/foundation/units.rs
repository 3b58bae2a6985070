use super::*;

#[test]
fn a4_width_at_300_dpi() {
    assert_eq!(mm_to_px(210.0, 300), 2480);
    assert_eq!(mm_to_px(297.0, 300), 3508);
    assert_eq!(mm_to_px(5.0, 300), 59);
}

#[test]
fn dpi_is_clamped_before_use() {
    assert_eq!(clamp_dpi(10), MIN_DPI);
    assert_eq!(clamp_dpi(10_000), MAX_DPI);
    assert_eq!(clamp_dpi(300), 300);
    assert_eq!(mm_to_px(25.4, 10), 96);
    assert_eq!(mm_to_px(25.4, 9000), 600);
}

#[test]
fn negative_and_non_finite_lengths_are_zero() {
    assert_eq!(mm_to_px(-3.0, 300), 0);
    assert_eq!(mm_to_px(f64::NAN, 300), 0);
    assert_eq!(clamp_mm(f64::INFINITY, 20.0), 0.0);
    assert_eq!(clamp_mm(-1.0, 20.0), 0.0);
    assert_eq!(clamp_mm(25.0, 20.0), 20.0);
}

#[test]
fn points_and_back_conversion() {
    assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-9);
    assert!((px_to_mm(300, 300) - 25.4).abs() < 1e-9);
}
