use crate::{
    foundation::core::{
        GridSpec, POSTER_MAX_GRID, PageSpec, PixelRect, Rect, Size, SourceImage, SpacingSpec,
        Vec2,
    },
    foundation::error::{TileError, TileResult},
    foundation::units::{clamp_dpi, mm_to_px},
    policy::guardrail::{
        ResolutionSpec, check_canvas_area, check_tile_count, effective_resolution,
    },
};

/// Largest poster margin and overlap in millimeters.
pub const POSTER_MAX_SPACING_MM: f64 = 20.0;

/// How the source is fitted onto the virtual canvas.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fill the canvas, cropping overflow.
    #[default]
    Cover,
    /// Fit entirely inside the canvas, letterboxing the remainder.
    Contain,
}

/// Inputs for [`compute_poster_layout`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PosterRequest {
    /// Page preset and orientation (may be `Auto`).
    pub page: PageSpec,
    /// Tile grid.
    pub grid: GridSpec,
    /// Margin and overlap.
    pub spacing: SpacingSpec,
    /// Requested resolution before policy.
    pub dpi: u32,
    /// Cover or contain.
    pub fit: FitMode,
    /// Draw corner ticks on every tile.
    pub trim_marks: bool,
}

impl PosterRequest {
    /// Clamp every numeric input into its supported range.
    pub fn sanitized(self) -> Self {
        Self {
            grid: GridSpec::clamped(self.grid.columns, self.grid.rows, POSTER_MAX_GRID),
            spacing: SpacingSpec::clamped(
                self.spacing.margin_mm,
                self.spacing.gap_mm,
                POSTER_MAX_SPACING_MM,
                POSTER_MAX_SPACING_MM,
            ),
            dpi: clamp_dpi(self.dpi),
            ..self
        }
    }
}

/// Scale and offset mapping source pixels onto the virtual canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImagePlacement {
    /// Uniform source→canvas scale.
    pub scale: f64,
    /// Top-left of the scaled image on the canvas; negative components crop.
    pub offset: Vec2,
    /// Scaled image size on the canvas.
    pub drawn: Size,
}

impl ImagePlacement {
    /// Center `source` on a `canvas_w`×`canvas_h` canvas using `fit`.
    pub fn compute(source: SourceImage, canvas_w: u32, canvas_h: u32, fit: FitMode) -> Self {
        let sx = f64::from(canvas_w) / f64::from(source.width);
        let sy = f64::from(canvas_h) / f64::from(source.height);
        let scale = match fit {
            FitMode::Cover => sx.max(sy),
            FitMode::Contain => sx.min(sy),
        };
        let drawn = Size::new(
            f64::from(source.width) * scale,
            f64::from(source.height) * scale,
        );
        let offset = Vec2::new(
            (f64::from(canvas_w) - drawn.width) * 0.5,
            (f64::from(canvas_h) - drawn.height) * 0.5,
        );
        Self {
            scale,
            offset,
            drawn,
        }
    }

    /// Canvas-space rectangle covered by the image.
    pub fn drawn_rect(&self) -> Rect {
        Rect::from_origin_size(self.offset.to_point(), self.drawn)
    }

    /// Source→canvas transform.
    pub fn to_affine(&self) -> kurbo::Affine {
        kurbo::Affine::translate(self.offset) * kurbo::Affine::scale(self.scale)
    }

    /// The same placement on a canvas scaled by `factor` (used for previews).
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            scale: self.scale * factor,
            offset: self.offset * factor,
            drawn: self.drawn * factor,
        }
    }
}

/// One poster tile: a crop of the virtual canvas that becomes one printed page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TileGeometry {
    /// 0-based row.
    pub row: u32,
    /// 0-based column.
    pub col: u32,
    /// Crop region on the virtual canvas.
    pub crop: PixelRect,
}

/// A corner tick pair in tile-local pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TrimMark {
    /// Tick running along the top or bottom edge.
    pub horizontal: PixelRect,
    /// Tick running along the left or right edge.
    pub vertical: PixelRect,
}

/// Internal grid-line positions for the preview.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridLines {
    /// x positions of internal column boundaries.
    pub vertical: Vec<f64>,
    /// y positions of internal row boundaries.
    pub horizontal: Vec<f64>,
}

/// Full poster geometry: everything needed to crop, preview and paginate.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PosterLayout {
    /// Page with orientation resolved.
    pub page: PageSpec,
    /// Tile grid.
    pub grid: GridSpec,
    /// Margin and overlap.
    pub spacing: SpacingSpec,
    /// Requested and effective resolution.
    pub resolution: ResolutionSpec,
    /// Fit mode used for `placement`.
    pub fit: FitMode,
    /// Source dimensions.
    pub source: SourceImage,
    /// Printable width per tile in pixels.
    pub content_width_px: u32,
    /// Printable height per tile in pixels.
    pub content_height_px: u32,
    /// Pixels shared between adjacent tiles.
    pub overlap_px: u32,
    /// Composite canvas width.
    pub virtual_width: u32,
    /// Composite canvas height.
    pub virtual_height: u32,
    /// Source placement on the composite canvas.
    pub placement: ImagePlacement,
    /// Tiles in row-major order.
    pub tiles: Vec<TileGeometry>,
    /// Corner ticks (tile-local), identical for every tile; empty when disabled.
    pub trim_marks: Vec<TrimMark>,
}

impl PosterLayout {
    /// Horizontal distance between adjacent tile origins.
    pub fn step_x(&self) -> u32 {
        self.content_width_px - self.overlap_px
    }

    /// Vertical distance between adjacent tile origins.
    pub fn step_y(&self) -> u32 {
        self.content_height_px - self.overlap_px
    }

    /// Tile at `(row, col)`, if inside the grid.
    pub fn tile(&self, row: u32, col: u32) -> Option<&TileGeometry> {
        if row >= self.grid.rows || col >= self.grid.columns {
            return None;
        }
        self.tiles.get((row * self.grid.columns + col) as usize)
    }

    /// Printable area on the page in millimeters (origin top-left).
    pub fn content_rect_mm(&self) -> Rect {
        let m = self.spacing.margin_mm;
        Rect::new(m, m, self.page.width_mm - m, self.page.height_mm - m)
    }

    /// Factor that fits the virtual canvas inside `max_edge` preview pixels (never upscales).
    pub fn preview_scale(&self, max_edge: u32) -> f64 {
        let longest = self.virtual_width.max(self.virtual_height).max(1);
        (f64::from(max_edge) / f64::from(longest)).min(1.0)
    }

    /// Internal column/row boundaries at cumulative steps, multiplied by `scale`.
    pub fn grid_lines(&self, scale: f64) -> GridLines {
        let vertical = (1..self.grid.columns)
            .map(|c| f64::from(c) * f64::from(self.step_x()) * scale)
            .collect();
        let horizontal = (1..self.grid.rows)
            .map(|r| f64::from(r) * f64::from(self.step_y()) * scale)
            .collect();
        GridLines {
            vertical,
            horizontal,
        }
    }
}

/// Compute poster geometry.
///
/// Guards run before anything proportional to the canvas is allocated: a missing source, too
/// many tiles, or an oversized virtual canvas all fail here.
#[tracing::instrument(skip(req), fields(grid = ?req.grid))]
pub fn compute_poster_layout(
    req: &PosterRequest,
    source: Option<SourceImage>,
) -> TileResult<PosterLayout> {
    let source = source.ok_or_else(|| TileError::precondition("no source image loaded"))?;
    let req = req.sanitized();
    check_tile_count(req.grid)?;

    let resolution = effective_resolution(source, req.dpi);
    let dpi = resolution.effective_dpi;
    let page = req.page.resolved(Some(source));
    let margin = req.spacing.margin_mm;

    let content_width_px = mm_to_px(page.width_mm - 2.0 * margin, dpi);
    let content_height_px = mm_to_px(page.height_mm - 2.0 * margin, dpi);
    if content_width_px == 0 || content_height_px == 0 {
        return Err(TileError::validation(
            "margins leave no printable area on the page",
        ));
    }
    // Step between tiles must stay positive.
    let overlap_px = mm_to_px(req.spacing.gap_mm, dpi)
        .min(content_width_px.min(content_height_px).saturating_sub(1));

    let cols = req.grid.columns;
    let rows = req.grid.rows;
    let virtual_width = virtual_extent(cols, content_width_px, overlap_px);
    let virtual_height = virtual_extent(rows, content_height_px, overlap_px);
    check_canvas_area(virtual_width, virtual_height)?;

    let placement = ImagePlacement::compute(source, virtual_width, virtual_height, req.fit);

    let step_x = content_width_px - overlap_px;
    let step_y = content_height_px - overlap_px;
    let mut tiles = Vec::with_capacity(req.grid.cell_count() as usize);
    for row in 0..rows {
        for col in 0..cols {
            tiles.push(TileGeometry {
                row,
                col,
                crop: PixelRect::new(
                    col * step_x,
                    row * step_y,
                    content_width_px,
                    content_height_px,
                ),
            });
        }
    }

    let trim_marks = if req.trim_marks {
        trim_marks_for(content_width_px, content_height_px, dpi)
    } else {
        Vec::new()
    };

    tracing::debug!(
        dpi,
        content_width_px,
        content_height_px,
        overlap_px,
        virtual_width,
        virtual_height,
        scale = placement.scale,
        "poster layout"
    );

    Ok(PosterLayout {
        page,
        grid: req.grid,
        spacing: req.spacing,
        resolution,
        fit: req.fit,
        source,
        content_width_px,
        content_height_px,
        overlap_px,
        virtual_width,
        virtual_height,
        placement,
        tiles,
        trim_marks,
    })
}

fn virtual_extent(count: u32, content: u32, overlap: u32) -> u32 {
    count * content - (count - 1) * overlap
}

/// Corner ticks for a `w`×`h` tile, in order top-left, top-right, bottom-left, bottom-right.
pub fn trim_marks_for(w: u32, h: u32, dpi: u32) -> Vec<TrimMark> {
    let len = ((f64::from(w.min(h)) * 0.02).round() as u32).max(1);
    let thick = ((f64::from(clamp_dpi(dpi)) / 150.0).round() as u32).clamp(1, len);
    let right = w.saturating_sub(len);
    let bottom = h.saturating_sub(len);
    let right_t = w.saturating_sub(thick);
    let bottom_t = h.saturating_sub(thick);
    vec![
        TrimMark {
            horizontal: PixelRect::new(0, 0, len, thick),
            vertical: PixelRect::new(0, 0, thick, len),
        },
        TrimMark {
            horizontal: PixelRect::new(right, 0, len, thick),
            vertical: PixelRect::new(right_t, 0, thick, len),
        },
        TrimMark {
            horizontal: PixelRect::new(0, bottom_t, len, thick),
            vertical: PixelRect::new(0, bottom, thick, len),
        },
        TrimMark {
            horizontal: PixelRect::new(right, bottom_t, len, thick),
            vertical: PixelRect::new(right_t, bottom, thick, len),
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/layout/poster.rs"]
mod tests;
