use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::export::sink::{DrawOp, Page, PageSink, SinkConfig, check_next_index};
use crate::foundation::core::{PageIndex, Rect};
use crate::foundation::error::{TileError, TileResult};
use crate::foundation::units::mm_to_pt;

/// Helvetica advance widths (1/1000 em) for WinAnsi 0x20..=0x7E, from the standard AFM.
#[rustfmt::skip]
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

struct DocState {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
    title: String,
}

/// Sink writing a PDF document with `lopdf`.
///
/// Pages are assembled in memory; the file is only created in [`PageSink::end`], through a
/// temporary sibling that is renamed into place once fully written.
pub struct PdfSink {
    out_path: PathBuf,
    state: Option<DocState>,
    last: Option<PageIndex>,
}

impl PdfSink {
    /// Create a sink that will write to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            state: None,
            last: None,
        }
    }

    /// Destination path.
    pub fn out_path(&self) -> &Path {
        &self.out_path
    }
}

impl PageSink for PdfSink {
    fn begin(&mut self, cfg: SinkConfig) -> TileResult<()> {
        if cfg.page_count == 0 {
            return Err(TileError::validation("pdf export needs at least one page"));
        }
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.state = Some(DocState {
            doc,
            pages_id,
            font_id,
            kids: Vec::with_capacity(cfg.page_count as usize),
            title: cfg.title,
        });
        self.last = None;
        Ok(())
    }

    fn push_page(&mut self, idx: PageIndex, page: &Page) -> TileResult<()> {
        check_next_index(self.last, idx)?;
        let st = self
            .state
            .as_mut()
            .ok_or_else(|| TileError::validation("pdf sink: push_page called before begin"))?;

        let page_w = mm_to_pt(page.size_mm.width);
        let page_h = mm_to_pt(page.size_mm.height);
        let mut ops = Vec::new();
        let mut xobjects = Dictionary::new();

        for op in &page.ops {
            match op {
                DrawOp::Image { rect, image } => {
                    let name = format!("Im{}", xobjects.len());
                    let image_id = st.doc.add_object(image_stream(image)?);
                    xobjects.set(name.as_bytes().to_vec(), image_id);
                    let (x, y, w, h) = pdf_rect(*rect, page_h);
                    ops.push(Operation::new("q", vec![]));
                    ops.push(Operation::new(
                        "cm",
                        vec![
                            real(w),
                            real(0.0),
                            real(0.0),
                            real(h),
                            real(x),
                            real(y),
                        ],
                    ));
                    ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
                    ops.push(Operation::new("Q", vec![]));
                }
                DrawOp::FillRect { rect, rgb } => {
                    let (x, y, w, h) = pdf_rect(*rect, page_h);
                    ops.push(Operation::new("q", vec![]));
                    ops.push(Operation::new("rg", color(*rgb)));
                    ops.push(Operation::new("re", vec![real(x), real(y), real(w), real(h)]));
                    ops.push(Operation::new("f", vec![]));
                    ops.push(Operation::new("Q", vec![]));
                }
                DrawOp::StrokeRect {
                    rect,
                    rgb,
                    width_mm,
                } => {
                    let (x, y, w, h) = pdf_rect(*rect, page_h);
                    ops.push(Operation::new("q", vec![]));
                    ops.push(Operation::new("RG", color(*rgb)));
                    ops.push(Operation::new("w", vec![real(mm_to_pt(*width_mm))]));
                    ops.push(Operation::new("re", vec![real(x), real(y), real(w), real(h)]));
                    ops.push(Operation::new("S", vec![]));
                    ops.push(Operation::new("Q", vec![]));
                }
                DrawOp::Text {
                    anchor,
                    size_pt,
                    text,
                    rgb,
                } => {
                    let (encoded, replaced) = win_ansi_bytes(text);
                    if replaced > 0 {
                        tracing::warn!(
                            label = %text,
                            replaced,
                            "label has characters Helvetica cannot encode; printed as '?'"
                        );
                    }
                    let width = helvetica_text_width(&encoded, *size_pt);
                    let x = mm_to_pt(anchor.x) - width / 2.0;
                    let y = page_h - mm_to_pt(anchor.y);
                    ops.push(Operation::new("BT", vec![]));
                    ops.push(Operation::new("rg", color(*rgb)));
                    ops.push(Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), real(*size_pt)],
                    ));
                    ops.push(Operation::new("Td", vec![real(x), real(y)]));
                    ops.push(Operation::new(
                        "Tj",
                        vec![Object::String(encoded, StringFormat::Literal)],
                    ));
                    ops.push(Operation::new("ET", vec![]));
                }
            }
        }

        let content = Content { operations: ops }
            .encode()
            .context("encode pdf page content")?;
        let content_id = st.doc.add_object(Stream::new(Dictionary::new(), content));

        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => st.font_id },
        };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let page_id = st.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => st.pages_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(page_w), real(page_h)],
            "Contents" => content_id,
            "Resources" => resources,
        });
        st.kids.push(page_id.into());
        self.last = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> TileResult<()> {
        let mut st = self
            .state
            .take()
            .ok_or_else(|| TileError::validation("pdf sink: end called before begin"))?;
        if st.kids.is_empty() {
            return Err(TileError::validation("pdf sink: no pages were pushed"));
        }

        let count = st.kids.len() as i64;
        st.doc.objects.insert(
            st.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => st.kids,
                "Count" => count,
            }),
        );
        let catalog_id = st.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => st.pages_id,
        });
        let info_id = st.doc.add_object(dictionary! {
            "Title" => Object::string_literal(st.title.as_str()),
            "Producer" => Object::string_literal("tileprint"),
        });
        st.doc.trailer.set("Root", catalog_id);
        st.doc.trailer.set("Info", info_id);

        ensure_parent_dir(&self.out_path)?;
        let tmp_path = partial_path(&self.out_path);
        let mut guard = TempFileGuard(Some(tmp_path.clone()));
        {
            let file = std::fs::File::create(&tmp_path)
                .with_context(|| format!("create '{}'", tmp_path.display()))?;
            let mut writer = std::io::BufWriter::new(file);
            st.doc
                .save_to(&mut writer)
                .with_context(|| format!("write pdf '{}'", tmp_path.display()))?;
            writer
                .flush()
                .with_context(|| format!("flush '{}'", tmp_path.display()))?;
        }
        std::fs::rename(&tmp_path, &self.out_path).with_context(|| {
            format!(
                "move '{}' to '{}'",
                tmp_path.display(),
                self.out_path.display()
            )
        })?;
        guard.0 = None;

        tracing::debug!(path = %self.out_path.display(), pages = count, "pdf written");
        Ok(())
    }
}

/// Create the parent directory of `path` if it does not exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> TileResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

fn image_stream(image: &image::RgbImage) -> TileResult<Stream> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(image.as_raw()).context("compress image data")?;
    let data = enc.finish().context("finish image compression")?;
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width()),
        "Height" => i64::from(image.height()),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8i64,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, data).with_compression(false))
}

/// Page-mm rect (top-left origin) to PDF user space `(x, y, w, h)` (bottom-left origin).
fn pdf_rect(rect: Rect, page_h_pt: f64) -> (f64, f64, f64, f64) {
    let x = mm_to_pt(rect.x0);
    let w = mm_to_pt(rect.width());
    let h = mm_to_pt(rect.height());
    let y = page_h_pt - mm_to_pt(rect.y1);
    (x, y, w, h)
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn color(rgb: [u8; 3]) -> Vec<Object> {
    rgb.iter().map(|&c| real(f64::from(c) / 255.0)).collect()
}

/// Latin-1 subset of WinAnsi; anything else becomes `?`. Also returns the replacement count.
fn win_ansi_bytes(text: &str) -> (Vec<u8>, usize) {
    let mut replaced = 0;
    let bytes = text
        .chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) if b >= 0x20 && !(0x7f..0xa0).contains(&b) => b,
            _ => {
                replaced += 1;
                b'?'
            }
        })
        .collect();
    (bytes, replaced)
}

/// Advance width in points of WinAnsi-encoded `text` set in Helvetica at `size_pt`.
fn helvetica_text_width(text: &[u8], size_pt: f64) -> f64 {
    let units: u32 = text.iter().map(|&b| u32::from(helvetica_glyph_width(b))).sum();
    f64::from(units) * size_pt / 1000.0
}

fn helvetica_glyph_width(b: u8) -> u16 {
    match b {
        0x20..=0x7e => HELVETICA_ASCII_WIDTHS[usize::from(b - 0x20)],
        // Accented Latin-1 letters share their base letter's advance.
        0xc0..=0xc5 => helvetica_glyph_width(b'A'),
        0xc6 => 1000,
        0xc7 => helvetica_glyph_width(b'C'),
        0xc8..=0xcb => helvetica_glyph_width(b'E'),
        0xcc..=0xcf => helvetica_glyph_width(b'I'),
        0xd0 | 0xd1 => 722,
        0xd2..=0xd6 | 0xd8 => helvetica_glyph_width(b'O'),
        0xd7 | 0xf7 => 584,
        0xd9..=0xdc => helvetica_glyph_width(b'U'),
        0xdd | 0xde => 667,
        0xdf => 611,
        0xe0..=0xe5 => helvetica_glyph_width(b'a'),
        0xe6 => 889,
        0xe7 => helvetica_glyph_width(b'c'),
        0xe8..=0xeb => helvetica_glyph_width(b'e'),
        0xec..=0xef => 278,
        0xf0..=0xf6 | 0xf9..=0xfc | 0xfe => 556,
        0xf8 => 611,
        0xfd | 0xff => helvetica_glyph_width(b'y'),
        _ => 556,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pdf.rs"]
mod tests;
