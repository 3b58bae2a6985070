use std::sync::Arc;

use super::*;
use crate::foundation::core::{Point, Size};

fn out_dir() -> PathBuf {
    let dir = PathBuf::from("target").join("unit_pdf");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn cfg(pages: u32) -> SinkConfig {
    SinkConfig {
        page_size_mm: Size::new(210.0, 297.0),
        page_count: pages,
        title: "unit".into(),
    }
}

fn sample_page() -> Page {
    Page {
        size_mm: Size::new(210.0, 297.0),
        ops: vec![
            DrawOp::FillRect {
                rect: Rect::new(10.0, 10.0, 50.0, 40.0),
                rgb: [250, 250, 250],
            },
            DrawOp::Image {
                rect: Rect::new(12.0, 12.0, 48.0, 30.0),
                image: Arc::new(image::RgbImage::from_pixel(4, 2, image::Rgb([10, 200, 30]))),
            },
            DrawOp::Text {
                anchor: Point::new(30.0, 36.0),
                size_pt: 12.0,
                text: "Zoë (Ops)".into(),
                rgb: [20, 20, 20],
            },
            DrawOp::StrokeRect {
                rect: Rect::new(10.0, 10.0, 50.0, 40.0),
                rgb: [160, 160, 160],
                width_mm: 0.2,
            },
        ],
    }
}

#[test]
fn writes_one_pdf_page_per_pushed_page() {
    let path = out_dir().join("two_pages.pdf");
    let _ = std::fs::remove_file(&path);

    let mut sink = PdfSink::new(&path);
    sink.begin(cfg(2)).unwrap();
    sink.push_page(PageIndex(0), &sample_page()).unwrap();
    sink.push_page(PageIndex(1), &sample_page()).unwrap();
    assert!(!path.exists(), "nothing is written before end()");
    sink.end().unwrap();

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
    assert!(!partial_path(&path).exists());
}

#[test]
fn media_box_matches_page_size_in_points() {
    let path = out_dir().join("media_box.pdf");
    let mut sink = PdfSink::new(&path);
    sink.begin(cfg(1)).unwrap();
    sink.push_page(PageIndex(0), &sample_page()).unwrap();
    sink.end().unwrap();

    let doc = Document::load(&path).unwrap();
    let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    let media = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let w = media[2].as_float().unwrap();
    let h = media[3].as_float().unwrap();
    assert!((w - 595.28).abs() < 0.1, "{w}");
    assert!((h - 841.89).abs() < 0.1, "{h}");
}

#[test]
fn abandoned_export_leaves_no_file() {
    let path = out_dir().join("abandoned.pdf");
    let _ = std::fs::remove_file(&path);
    {
        let mut sink = PdfSink::new(&path);
        sink.begin(cfg(3)).unwrap();
        sink.push_page(PageIndex(0), &sample_page()).unwrap();
    }
    assert!(!path.exists());
}

#[test]
fn end_without_pages_fails_and_writes_nothing() {
    let path = out_dir().join("empty.pdf");
    let _ = std::fs::remove_file(&path);
    let mut sink = PdfSink::new(&path);
    sink.begin(cfg(1)).unwrap();
    assert!(sink.end().is_err());
    assert!(!path.exists());
}

#[test]
fn pages_must_be_pushed_in_order() {
    let mut sink = PdfSink::new(out_dir().join("order.pdf"));
    sink.begin(cfg(2)).unwrap();
    assert!(sink.push_page(PageIndex(1), &sample_page()).is_err());
}

#[test]
fn text_is_encoded_as_latin1_with_fallback() {
    assert_eq!(win_ansi_bytes("Zoë"), (vec![b'Z', b'o', 0xeb], 0));
    assert_eq!(win_ansi_bytes("a😀b"), (b"a?b".to_vec(), 1));
    assert_eq!(win_ansi_bytes("Łódź").1, 2);
}

#[test]
fn rects_flip_to_bottom_left_origin() {
    let (x, y, w, h) = pdf_rect(Rect::new(0.0, 0.0, 25.4, 25.4), 792.0);
    assert!((x - 0.0).abs() < 1e-9);
    assert!((w - 72.0).abs() < 1e-9);
    assert!((h - 72.0).abs() < 1e-9);
    assert!((y - 720.0).abs() < 1e-9);
}

#[test]
fn label_width_follows_helvetica_metrics() {
    let wide = helvetica_text_width(b"WWW", 10.0);
    let narrow = helvetica_text_width(b"ill", 10.0);
    assert!((wide - 28.32).abs() < 1e-9, "{wide}");
    assert!((narrow - 6.66).abs() < 1e-9, "{narrow}");
    assert_eq!(
        helvetica_text_width(&[0xc9], 12.0),
        helvetica_text_width(b"E", 12.0)
    );
}
