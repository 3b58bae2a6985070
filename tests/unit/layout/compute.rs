use super::*;
use crate::foundation::core::{GridSpec, Orientation, PageSpec, PaperPreset, SpacingSpec};
use crate::layout::poster::FitMode;

fn poster(cols: u32) -> LayoutRequest {
    LayoutRequest::Poster {
        request: PosterRequest {
            page: PageSpec::new(PaperPreset::A4, Orientation::Auto),
            grid: GridSpec {
                columns: cols,
                rows: 2,
            },
            spacing: SpacingSpec {
                margin_mm: 5.0,
                gap_mm: 5.0,
            },
            dpi: 150,
            fit: FitMode::Cover,
            trim_marks: true,
        },
        source: Some(SourceImage::new(1600, 900).unwrap()),
    }
}

#[test]
fn compute_layout_is_pure() {
    let a = compute_layout(&poster(3)).unwrap();
    let b = compute_layout(&poster(3)).unwrap();
    assert_eq!(a, b);
    assert!(matches!(a, Geometry::Poster(ref p) if p.tiles.len() == 6));
}

#[test]
fn session_recomputes_only_on_apply() {
    let mut session = LayoutSession::new();
    assert!(session.apply().unwrap().is_none());

    session.set_request(poster(2));
    assert!(session.is_dirty());
    assert!(session.geometry().is_none());
    session.apply().unwrap();
    assert!(!session.is_dirty());

    session.set_request(poster(2));
    assert!(!session.is_dirty());

    session.set_request(poster(4));
    assert!(session.is_dirty());
    let Some(Geometry::Poster(p)) = session.apply().unwrap() else {
        panic!("expected poster geometry");
    };
    assert_eq!(p.grid.columns, 4);
}

#[test]
fn failed_apply_keeps_previous_geometry() {
    let mut session = LayoutSession::new();
    session.set_request(poster(2));
    session.apply().unwrap();

    session.set_request(LayoutRequest::DoorTags {
        request: crate::layout::door_tags::DoorTagRequest {
            page: PageSpec::new(PaperPreset::A4, Orientation::Portrait),
            grid: GridSpec {
                columns: 3,
                rows: 4,
            },
            spacing: SpacingSpec {
                margin_mm: 10.0,
                gap_mm: 4.0,
            },
            label_pt: 18.0,
            include_photo: false,
            dpi: 300,
        },
        entries: vec![],
    });
    assert!(session.apply().is_err());
    assert!(matches!(session.geometry(), Some(Geometry::Poster(_))));
}
