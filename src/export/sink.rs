use std::sync::Arc;

use crate::foundation::core::{PageIndex, Point, Rect, Size};
use crate::foundation::error::{TileError, TileResult};

/// Default file name for poster exports.
pub const POSTER_FILE_NAME: &str = "tileprint-poster.pdf";
/// Default file name for door-tag exports.
pub const DOOR_TAGS_FILE_NAME: &str = "door-tags.pdf";

/// A single drawing operation in page millimeters (origin top-left, y down).
#[derive(Clone, Debug)]
pub enum DrawOp {
    /// Raster stretched to `rect`.
    Image {
        /// Destination on the page.
        rect: Rect,
        /// Opaque RGB pixels.
        image: Arc<image::RgbImage>,
    },
    /// Solid rectangle.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        rgb: [u8; 3],
    },
    /// Rectangle outline.
    StrokeRect {
        /// Outline path.
        rect: Rect,
        /// Stroke color.
        rgb: [u8; 3],
        /// Line width in millimeters.
        width_mm: f64,
    },
    /// Single line of text, horizontally centered on `anchor`, baseline at `anchor.y`.
    Text {
        /// Center/baseline point.
        anchor: Point,
        /// Font size in points.
        size_pt: f64,
        /// Text content.
        text: String,
        /// Text color.
        rgb: [u8; 3],
    },
}

/// One finished page.
#[derive(Clone, Debug)]
pub struct Page {
    /// Physical page size.
    pub size_mm: Size,
    /// Operations in paint order.
    pub ops: Vec<DrawOp>,
}

/// Configuration provided to a [`PageSink`] before the first page.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkConfig {
    /// Page size shared by every page.
    pub page_size_mm: Size,
    /// Number of pages that will be pushed.
    pub page_count: u32,
    /// Document title.
    pub title: String,
}

/// Sink contract for consuming pages in document order.
///
/// Ordering contract: `push_page` is called with strictly increasing [`PageIndex`] values
/// starting at 0. A sink must not produce visible output if `end` is never reached.
pub trait PageSink: Send {
    /// Called once before any pages are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> TileResult<()>;
    /// Push one page.
    fn push_page(&mut self, idx: PageIndex, page: &Page) -> TileResult<()>;
    /// Called once after the last page is pushed.
    fn end(&mut self) -> TileResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    pages: Vec<(PageIndex, Page)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured pages in push order.
    pub fn pages(&self) -> &[(PageIndex, Page)] {
        &self.pages
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl PageSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> TileResult<()> {
        self.cfg = Some(cfg);
        self.pages.clear();
        self.finished = false;
        Ok(())
    }

    fn push_page(&mut self, idx: PageIndex, page: &Page) -> TileResult<()> {
        check_next_index(self.pages.last().map(|(i, _)| *i), idx)?;
        self.pages.push((idx, page.clone()));
        Ok(())
    }

    fn end(&mut self) -> TileResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Enforce the ordering contract shared by built-in sinks.
pub(crate) fn check_next_index(last: Option<PageIndex>, idx: PageIndex) -> TileResult<()> {
    let expected = last.map_or(0, |l| l.0 + 1);
    if idx.0 != expected {
        return Err(TileError::validation(format!(
            "pages must arrive in order: expected page {expected}, got {}",
            idx.0
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
