use super::*;
use crate::export::sink::{DrawOp, InMemorySink};
use crate::foundation::core::{
    GridSpec, Orientation, PageSpec, PaperPreset, SourceImage, SpacingSpec,
};
use crate::layout::poster::FitMode;

fn loaded(w: u32, h: u32, rgb: [u8; 3]) -> LoadedImage {
    LoadedImage {
        source: SourceImage::new(w, h).unwrap(),
        pixels: Arc::new(image::RgbaImage::from_pixel(
            w,
            h,
            image::Rgba([rgb[0], rgb[1], rgb[2], 255]),
        )),
        file_bytes: None,
    }
}

fn poster_request(cols: u32, rows: u32) -> PosterRequest {
    PosterRequest {
        page: PageSpec::new(PaperPreset::A4, Orientation::Portrait),
        grid: GridSpec {
            columns: cols,
            rows,
        },
        spacing: SpacingSpec {
            margin_mm: 20.0,
            gap_mm: 5.0,
        },
        dpi: 96,
        fit: FitMode::Cover,
        trim_marks: false,
    }
}

fn tags_request(include_photo: bool) -> DoorTagRequest {
    DoorTagRequest {
        page: PageSpec::new(PaperPreset::A4, Orientation::Portrait),
        grid: GridSpec {
            columns: 2,
            rows: 2,
        },
        spacing: SpacingSpec {
            margin_mm: 10.0,
            gap_mm: 4.0,
        },
        label_pt: 18.0,
        include_photo,
        dpi: 96,
    }
}

fn small_pool(chunk_size: usize) -> Exporter {
    Exporter::new(RenderThreading {
        threads: Some(2),
        chunk_size,
    })
}

#[test]
fn poster_pushes_one_page_per_tile_in_order() {
    let exporter = small_pool(2);
    let mut sink = InMemorySink::new();
    let stats = exporter
        .export_poster(&poster_request(3, 2), Some(&loaded(60, 40, [200, 10, 10])), &mut sink)
        .unwrap();

    assert_eq!(stats.pages, 6);
    assert_eq!(stats.effective_dpi, 96);
    assert!(sink.is_finished());
    assert_eq!(sink.config().unwrap().page_count, 6);
    let indices: Vec<u32> = sink.pages().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    for (_, page) in sink.pages() {
        assert_eq!(page.ops.len(), 1);
        assert!(matches!(&page.ops[0], DrawOp::Image { .. }));
    }
    assert!(!exporter.is_busy());
}

#[test]
fn poster_without_image_is_a_precondition_error() {
    let mut sink = InMemorySink::new();
    let err = Exporter::default()
        .export_poster(&poster_request(2, 2), None, &mut sink)
        .unwrap_err();
    assert!(matches!(err, TileError::Precondition(_)));
    assert!(sink.config().is_none());
}

#[test]
fn poster_guard_fails_before_sink_begins() {
    let mut sink = InMemorySink::new();
    let err = small_pool(4)
        .export_poster(&poster_request(9, 8), Some(&loaded(10, 10, [0, 0, 0])), &mut sink)
        .unwrap_err();
    assert!(matches!(err, TileError::ResourceGuard(_)));
    assert!(sink.config().is_none());
}

#[test]
fn door_tags_fit_photos_and_paginate() {
    let names: Vec<Entry> = (0..5)
        .map(|i| Entry {
            label: format!("Room {i}"),
            photo: Some(i % 2),
        })
        .collect();
    let photos = vec![loaded(30, 20, [255, 0, 0]), loaded(20, 30, [0, 0, 255])];
    let mut sink = InMemorySink::new();
    let stats = small_pool(1)
        .export_door_tags(&tags_request(true), &names, &photos, &mut sink)
        .unwrap();

    assert_eq!(stats.pages, 2);
    assert_eq!(sink.pages().len(), 2);
    let first = &sink.pages()[0].1;
    let images: Vec<&Arc<RgbImage>> = first
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Image { image, .. } => Some(image),
            _ => None,
        })
        .collect();
    assert_eq!(images.len(), 4);
    let red = images[0].get_pixel(0, 0).0;
    let blue = images[1].get_pixel(0, 0).0;
    assert!(red[0] > 250 && red[2] < 5, "{red:?}");
    assert!(blue[2] > 250 && blue[0] < 5, "{blue:?}");
    // Photo 0 is fitted once and shared.
    assert!(Arc::ptr_eq(images[0], images[2]));
    assert_eq!(sink.pages()[1].1.ops.len(), 4);
}

#[test]
fn door_tags_without_photos_draw_no_images() {
    let names: Vec<Entry> = ["A", "B", "C"].iter().map(|n| Entry::new(*n)).collect();
    let mut sink = InMemorySink::new();
    small_pool(8)
        .export_door_tags(&tags_request(false), &names, &[], &mut sink)
        .unwrap();
    let page = &sink.pages()[0].1;
    assert!(!page.ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));
}

#[test]
fn empty_name_list_is_rejected() {
    let mut sink = InMemorySink::new();
    let err = Exporter::default()
        .export_door_tags(&tags_request(true), &[], &[], &mut sink)
        .unwrap_err();
    assert!(matches!(err, TileError::Precondition(_)));
}

struct ReentrantSink<'e> {
    exporter: &'e Exporter,
    nested: Option<TileResult<ExportStats>>,
    inner: InMemorySink,
}

impl PageSink for ReentrantSink<'_> {
    fn begin(&mut self, cfg: SinkConfig) -> TileResult<()> {
        let mut scratch = InMemorySink::new();
        self.nested = Some(self.exporter.export_poster(
            &poster_request(1, 1),
            Some(&loaded(4, 4, [1, 2, 3])),
            &mut scratch,
        ));
        self.inner.begin(cfg)
    }

    fn push_page(&mut self, idx: PageIndex, page: &Page) -> TileResult<()> {
        self.inner.push_page(idx, page)
    }

    fn end(&mut self) -> TileResult<()> {
        self.inner.end()
    }
}

#[test]
fn second_export_while_busy_is_refused() {
    let exporter = small_pool(4);
    let mut sink = ReentrantSink {
        exporter: &exporter,
        nested: None,
        inner: InMemorySink::new(),
    };
    exporter
        .export_poster(&poster_request(1, 1), Some(&loaded(4, 4, [9, 9, 9])), &mut sink)
        .unwrap();
    assert!(matches!(sink.nested, Some(Err(TileError::ExportInProgress))));
    assert!(!exporter.is_busy());
    let again = exporter.export_poster(
        &poster_request(1, 1),
        Some(&loaded(4, 4, [9, 9, 9])),
        &mut InMemorySink::new(),
    );
    assert!(again.is_ok());
}

#[test]
fn zero_threads_is_invalid() {
    let exporter = Exporter::new(RenderThreading {
        threads: Some(0),
        chunk_size: 4,
    });
    let err = exporter
        .export_poster(
            &poster_request(1, 1),
            Some(&loaded(4, 4, [0, 0, 0])),
            &mut InMemorySink::new(),
        )
        .unwrap_err();
    assert!(matches!(err, TileError::Validation(_)));
}
