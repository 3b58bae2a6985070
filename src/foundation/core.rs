use crate::foundation::error::{TileError, TileResult};
use crate::foundation::units::clamp_mm;

pub use kurbo::{Point, Rect, Size, Vec2};

/// Largest column/row count accepted for poster tiling.
pub const POSTER_MAX_GRID: u32 = 20;
/// Largest column/row count accepted for door-tag sheets.
pub const DOOR_TAG_MAX_GRID: u32 = 12;

/// Supported paper presets.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PaperPreset {
    /// ISO A4, 210×297 mm.
    #[default]
    A4,
    /// US Letter, 216×279 mm.
    Letter,
}

impl PaperPreset {
    /// Portrait `(width, height)` in millimeters.
    pub fn portrait_mm(self) -> (f64, f64) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::Letter => (216.0, 279.0),
        }
    }
}

/// Page orientation choice. `Auto` follows the source image.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Short edge on top.
    Portrait,
    /// Long edge on top.
    Landscape,
    /// Landscape iff the source image is at least as wide as it is tall; portrait without one.
    #[default]
    Auto,
}

impl Orientation {
    /// Resolve `Auto` against an optional source image. Never returns `Auto`.
    pub fn resolve(self, source: Option<SourceImage>) -> Self {
        match self {
            Self::Auto => match source {
                Some(img) if img.is_landscape() => Self::Landscape,
                _ => Self::Portrait,
            },
            other => other,
        }
    }
}

/// Physical page description. `width_mm`/`height_mm` already reflect the orientation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageSpec {
    /// Page width in millimeters.
    pub width_mm: f64,
    /// Page height in millimeters.
    pub height_mm: f64,
    /// Orientation the dimensions were derived from.
    pub orientation: Orientation,
}

impl PageSpec {
    /// Build a page from a preset. `Auto` keeps portrait dimensions until [`PageSpec::resolved`].
    pub fn new(preset: PaperPreset, orientation: Orientation) -> Self {
        let (w, h) = preset.portrait_mm();
        let (width_mm, height_mm) = match orientation {
            Orientation::Landscape => (h, w),
            Orientation::Portrait | Orientation::Auto => (w, h),
        };
        Self {
            width_mm,
            height_mm,
            orientation,
        }
    }

    /// Resolve `Auto` orientation, swapping dimensions when the result is landscape.
    pub fn resolved(self, source: Option<SourceImage>) -> Self {
        let orientation = self.orientation.resolve(source);
        let short = self.width_mm.min(self.height_mm);
        let long = self.width_mm.max(self.height_mm);
        let (width_mm, height_mm) = match (self.orientation, orientation) {
            (Orientation::Auto, Orientation::Landscape) => (long, short),
            (Orientation::Auto, _) => (short, long),
            _ => (self.width_mm, self.height_mm),
        };
        Self {
            width_mm,
            height_mm,
            orientation,
        }
    }

    /// Page size in millimeters.
    pub fn size_mm(&self) -> Size {
        Size::new(self.width_mm, self.height_mm)
    }
}

/// Grid cardinality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridSpec {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
}

impl GridSpec {
    /// Create a grid clamped to `[1, max]` on both axes.
    pub fn clamped(columns: u32, rows: u32, max: u32) -> Self {
        Self {
            columns: columns.clamp(1, max),
            rows: rows.clamp(1, max),
        }
    }

    /// Number of cells (`columns * rows`).
    pub fn cell_count(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }
}

/// Outer margin plus the spacing applied between adjacent cells.
///
/// For posters the spacing is an overlap (content repeated between tiles); for door tags it is a
/// gutter (empty space).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpacingSpec {
    /// Margin on every page edge in millimeters.
    pub margin_mm: f64,
    /// Overlap or gutter between adjacent cells in millimeters.
    pub gap_mm: f64,
}

impl SpacingSpec {
    /// Create spacing clamped to `[0, max_margin]` and `[0, max_gap]`.
    pub fn clamped(margin_mm: f64, gap_mm: f64, max_margin: f64, max_gap: f64) -> Self {
        Self {
            margin_mm: clamp_mm(margin_mm, max_margin),
            gap_mm: clamp_mm(gap_mm, max_gap),
        }
    }
}

/// Dimensions of a decoded source raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SourceImage {
    /// Create a source description; both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> TileResult<Self> {
        if width == 0 || height == 0 {
            return Err(TileError::validation(format!(
                "source image must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Pixel count in millions.
    pub fn megapixels(&self) -> f64 {
        (f64::from(self.width) * f64::from(self.height)) / 1_000_000.0
    }

    /// `true` when width ≥ height.
    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }
}

/// Integer pixel rectangle (origin top-left).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Create a rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    /// Overlapping region with `other`, if any.
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if u64::from(x0) >= x1 || u64::from(y0) >= y1 {
            return None;
        }
        Some(PixelRect::new(
            x0,
            y0,
            (x1 - u64::from(x0)) as u32,
            (y1 - u64::from(y0)) as u32,
        ))
    }
}

/// 0-based page index within an exported document.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PageIndex(pub u32);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
