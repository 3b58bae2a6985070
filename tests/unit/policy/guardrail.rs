use super::*;

fn img(w: u32, h: u32) -> SourceImage {
    SourceImage::new(w, h).unwrap()
}

#[test]
fn small_images_keep_requested_dpi() {
    let r = effective_resolution(img(3000, 2000), 600);
    assert_eq!(r.effective_dpi, 600);
    assert_eq!(r.clamp_reason, None);
}

#[test]
fn large_images_cap_at_200() {
    // 60 MP
    let r = effective_resolution(img(10_000, 6_000), 300);
    assert_eq!(r.effective_dpi, 200);
    assert_eq!(r.clamp_reason, Some(ClampReason::LargeImage));
    assert_eq!(r.clamp_reason.unwrap().to_string(), "large image capped");

    let r = effective_resolution(img(10_000, 6_000), 150);
    assert_eq!(r.effective_dpi, 150);
    assert_eq!(r.clamp_reason, None);
}

#[test]
fn big_images_cap_at_240() {
    // 30 MP
    let r = effective_resolution(img(6_000, 5_000), 300);
    assert_eq!(r.effective_dpi, 240);
    assert_eq!(r.clamp_reason, Some(ClampReason::BigImage));
    assert_eq!(r.clamp_reason.unwrap().to_string(), "big image capped");

    let r = effective_resolution(img(6_000, 5_000), 220);
    assert_eq!(r.effective_dpi, 220);
}

#[test]
fn effective_never_exceeds_requested_across_sweep() {
    let sources = [img(100, 100), img(6_000, 5_000), img(10_000, 6_000)];
    for source in sources {
        for requested in (96..=600).step_by(7) {
            let r = effective_resolution(source, requested);
            assert!(r.effective_dpi <= requested);
            let mp = source.megapixels();
            if mp > 50.0 {
                assert!(r.effective_dpi <= 200);
            } else if mp > 25.0 {
                assert!(r.effective_dpi <= 240);
            } else {
                assert_eq!(r.effective_dpi, requested.clamp(96, 600));
            }
        }
    }
}

#[test]
fn out_of_range_requests_are_clamped_first() {
    let r = effective_resolution(img(100, 100), 20);
    assert_eq!(r.requested_dpi, 96);
    assert_eq!(r.effective_dpi, 96);
    let r = effective_resolution(img(100, 100), 5000);
    assert_eq!(r.effective_dpi, 600);
}

#[test]
fn tile_count_boundary() {
    assert!(check_tile_count(GridSpec { columns: 8, rows: 8 }).is_ok());
    let err = check_tile_count(GridSpec { columns: 13, rows: 5 }).unwrap_err();
    assert!(err.to_string().contains("64"));
}

#[test]
fn canvas_area_boundary() {
    assert!(check_canvas_area(12_000, 12_000).is_ok());
    assert!(check_canvas_area(12_001, 12_000).is_err());
}

#[test]
fn door_tag_page_cap() {
    assert!(check_door_tag_pages(100).is_ok());
    assert!(check_door_tag_pages(101).is_err());
}

#[test]
fn advisories_report_caps_and_sizes() {
    let source = img(10_000, 6_000);
    let res = effective_resolution(source, 300);
    let adv = source_advisories(source, Some(LARGE_FILE_BYTES + 1), &res);
    assert_eq!(adv.len(), 3);
    assert!(matches!(adv[0], Advisory::ResolutionCapped { effective_dpi: 200, .. }));
    assert!(adv[0].to_string().contains("large image capped"));

    let small = img(100, 100);
    assert!(source_advisories(small, Some(10), &ResolutionSpec::fixed(300)).is_empty());
}
