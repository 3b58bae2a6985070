use crate::{
    foundation::core::{
        DOOR_TAG_MAX_GRID, GridSpec, PageIndex, PageSpec, Point, Rect, SpacingSpec,
    },
    foundation::error::{TileError, TileResult},
    foundation::units::clamp_dpi,
    layout::entries::Entry,
    policy::guardrail::{ResolutionSpec, check_door_tag_pages},
};

/// Largest door-tag page margin in millimeters.
pub const DOOR_TAG_MAX_MARGIN_MM: f64 = 30.0;
/// Largest door-tag gutter in millimeters.
pub const DOOR_TAG_MAX_GUTTER_MM: f64 = 20.0;
/// Smallest label size in points.
pub const LABEL_MIN_PT: f64 = 10.0;
/// Largest label size in points.
pub const LABEL_MAX_PT: f64 = 48.0;

const PHOTO_HEIGHT_FRACTION: f64 = 0.6;
const PHOTO_PADDING_MM: f64 = 2.0;
const LABEL_ANCHOR_FRACTION: f64 = 0.78;

/// Inputs for [`compute_door_tag_layout`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DoorTagRequest {
    /// Page preset and orientation (`Auto` resolves to portrait).
    pub page: PageSpec,
    /// Cells per page.
    pub grid: GridSpec,
    /// Margin and gutter.
    pub spacing: SpacingSpec,
    /// Label font size in points.
    pub label_pt: f64,
    /// Reserve and fill the photo box.
    pub include_photo: bool,
    /// Resolution photos are resampled at.
    pub dpi: u32,
}

impl DoorTagRequest {
    /// Clamp every numeric input into its supported range.
    pub fn sanitized(self) -> Self {
        let label_pt = if self.label_pt.is_finite() {
            self.label_pt.clamp(LABEL_MIN_PT, LABEL_MAX_PT)
        } else {
            LABEL_MIN_PT
        };
        Self {
            grid: GridSpec::clamped(self.grid.columns, self.grid.rows, DOOR_TAG_MAX_GRID),
            spacing: SpacingSpec::clamped(
                self.spacing.margin_mm,
                self.spacing.gap_mm,
                DOOR_TAG_MAX_MARGIN_MM,
                DOOR_TAG_MAX_GUTTER_MM,
            ),
            label_pt,
            dpi: clamp_dpi(self.dpi),
            ..self
        }
    }
}

/// Position of one cell on its page, in millimeters from the top-left page corner.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CellGeometry {
    /// Page the cell is on.
    pub page_index: PageIndex,
    /// 0-based row within the page.
    pub row: u32,
    /// 0-based column within the page.
    pub col: u32,
    /// Left edge.
    pub x_mm: f64,
    /// Top edge.
    pub y_mm: f64,
    /// Cell width.
    pub width_mm: f64,
    /// Cell height.
    pub height_mm: f64,
}

impl CellGeometry {
    /// Cell bounds as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x_mm,
            self.y_mm,
            self.x_mm + self.width_mm,
            self.y_mm + self.height_mm,
        )
    }
}

/// What is drawn inside a cell.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CellSlots {
    /// Background frame (whole cell).
    pub frame: Rect,
    /// Photo box: top 60% of the cell, inset by 2 mm. `None` when photos are off.
    pub photo: Option<Rect>,
    /// Horizontal center of the label at 78% of the cell height.
    pub label_anchor: Point,
    /// Thin cut guide around the cell.
    pub cut_border: Rect,
}

impl CellSlots {
    fn for_cell(cell: &CellGeometry, include_photo: bool) -> Self {
        let frame = cell.rect();
        let photo = include_photo
            .then(|| {
                Rect::new(
                    frame.x0 + PHOTO_PADDING_MM,
                    frame.y0 + PHOTO_PADDING_MM,
                    frame.x1 - PHOTO_PADDING_MM,
                    frame.y0 + cell.height_mm * PHOTO_HEIGHT_FRACTION - PHOTO_PADDING_MM,
                )
            })
            .filter(|r| r.width() > 0.0 && r.height() > 0.0);
        Self {
            frame,
            photo,
            label_anchor: Point::new(
                frame.x0 + cell.width_mm * 0.5,
                frame.y0 + cell.height_mm * LABEL_ANCHOR_FRACTION,
            ),
            cut_border: frame,
        }
    }
}

/// An entry bound to its cell.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacedEntry {
    /// Index into the input entry list.
    pub entry_index: usize,
    /// Cell geometry.
    pub cell: CellGeometry,
    /// Label text.
    pub label: String,
    /// Photo to draw, already filtered by `include_photo`.
    pub photo: Option<usize>,
    /// Drawing slots.
    pub slots: CellSlots,
}

/// Door-tag sheet geometry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DoorTagLayout {
    /// Page with orientation resolved.
    pub page: PageSpec,
    /// Cells per page.
    pub grid: GridSpec,
    /// Margin and gutter.
    pub spacing: SpacingSpec,
    /// Label font size in points.
    pub label_pt: f64,
    /// Whether photo boxes are drawn.
    pub include_photo: bool,
    /// Photo resampling resolution.
    pub resolution: ResolutionSpec,
    /// Uniform cell width.
    pub cell_width_mm: f64,
    /// Uniform cell height.
    pub cell_height_mm: f64,
    /// Number of pages.
    pub pages: u32,
    /// Placed entries, page-major then row-major; same order as the input.
    pub cells: Vec<PlacedEntry>,
}

impl DoorTagLayout {
    /// Cells per page.
    pub fn capacity(&self) -> usize {
        self.grid.cell_count() as usize
    }

    /// Entries on page `page` (contiguous in `cells`).
    pub fn cells_on_page(&self, page: PageIndex) -> &[PlacedEntry] {
        let cap = self.capacity();
        let start = (page.0 as usize).saturating_mul(cap).min(self.cells.len());
        let end = start.saturating_add(cap).min(self.cells.len());
        &self.cells[start..end]
    }

    /// Unused slots on the final page.
    pub fn trailing_empty_cells(&self) -> usize {
        self.capacity() * self.pages as usize - self.cells.len()
    }
}

/// Compute door-tag geometry for `entries`.
#[tracing::instrument(skip(req, entries), fields(entries = entries.len()))]
pub fn compute_door_tag_layout(
    req: &DoorTagRequest,
    entries: &[Entry],
) -> TileResult<DoorTagLayout> {
    if entries.is_empty() {
        return Err(TileError::precondition("no names to print"));
    }
    let req = req.sanitized();
    let page = req.page.resolved(None);
    let margin = req.spacing.margin_mm;
    let gutter = req.spacing.gap_mm;
    let cols = req.grid.columns;
    let rows = req.grid.rows;

    let content_w = page.width_mm - 2.0 * margin;
    let content_h = page.height_mm - 2.0 * margin;
    let cell_width_mm = (content_w - gutter * f64::from(cols - 1)) / f64::from(cols);
    let cell_height_mm = (content_h - gutter * f64::from(rows - 1)) / f64::from(rows);
    if cell_width_mm <= 0.0 || cell_height_mm <= 0.0 {
        return Err(TileError::validation(format!(
            "{cols}x{rows} cells do not fit on the page with {margin} mm margin and {gutter} mm gutter"
        )));
    }

    let capacity = req.grid.cell_count() as usize;
    let pages = entries.len().div_ceil(capacity);
    check_door_tag_pages(pages as u64)?;

    let mut cells = Vec::with_capacity(entries.len());
    'pages: for p in 0..pages {
        for r in 0..rows {
            for c in 0..cols {
                let idx = p * capacity + (r * cols + c) as usize;
                if idx >= entries.len() {
                    break 'pages;
                }
                let cell = CellGeometry {
                    page_index: PageIndex(p as u32),
                    row: r,
                    col: c,
                    x_mm: margin + f64::from(c) * (cell_width_mm + gutter),
                    y_mm: margin + f64::from(r) * (cell_height_mm + gutter),
                    width_mm: cell_width_mm,
                    height_mm: cell_height_mm,
                };
                let entry = &entries[idx];
                cells.push(PlacedEntry {
                    entry_index: idx,
                    cell,
                    label: entry.label.clone(),
                    photo: entry.photo.filter(|_| req.include_photo),
                    slots: CellSlots::for_cell(&cell, req.include_photo),
                });
            }
        }
    }

    tracing::debug!(pages, cell_width_mm, cell_height_mm, "door-tag layout");

    Ok(DoorTagLayout {
        page,
        grid: req.grid,
        spacing: req.spacing,
        label_pt: req.label_pt,
        include_photo: req.include_photo,
        resolution: ResolutionSpec::fixed(req.dpi),
        cell_width_mm,
        cell_height_mm,
        pages: pages as u32,
        cells,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/door_tags.rs"]
mod tests;
