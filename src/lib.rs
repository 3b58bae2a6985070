//! Tileprint is a print layout engine for two jobs:
//!
//! - Poster tiling: scale one raster across a grid of pages with overlap, margins and trim
//!   marks, so the printed sheets can be assembled into a large poster.
//! - Door-tag sheets: lay out one labeled cell (optionally with a photo) per name on paginated
//!   grids.
//!
//! Geometry is pure and deterministic ([`compute_layout`]). Exporting renders pages on a bounded
//! worker pool and streams them, in order, into a [`PageSink`] such as [`PdfSink`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub mod config;
pub mod export;
pub(crate) mod ingest;
pub(crate) mod layout;
pub(crate) mod policy;
pub(crate) mod render;

pub use crate::foundation::core::{
    DOOR_TAG_MAX_GRID, GridSpec, Orientation, POSTER_MAX_GRID, PageIndex, PageSpec, PaperPreset,
    PixelRect, Point, Rect, Size, SourceImage, SpacingSpec, Vec2,
};
pub use crate::foundation::error::{TileError, TileResult};
pub use crate::foundation::units::{
    MAX_DPI, MIN_DPI, MM_PER_INCH, POINTS_PER_INCH, clamp_dpi, mm_to_pt, mm_to_px,
    mm_to_px_exact, px_to_mm,
};

pub use crate::assets::decode::{LoadedImage, decode_image, load_image};
pub use crate::config::{DoorTagSettings, PosterSettings, Settings, load_settings};
pub use crate::export::pdf::PdfSink;
pub use crate::export::session::{ExportStats, Exporter, RenderThreading};
pub use crate::export::sink::{
    DOOR_TAGS_FILE_NAME, DrawOp, InMemorySink, POSTER_FILE_NAME, Page, PageSink, SinkConfig,
};
pub use crate::ingest::names::{parse_name_list, parse_names_csv};
pub use crate::layout::compute::{Geometry, LayoutRequest, LayoutSession, compute_layout};
pub use crate::layout::door_tags::{
    CellGeometry, CellSlots, DOOR_TAG_MAX_GUTTER_MM, DOOR_TAG_MAX_MARGIN_MM, DoorTagLayout,
    DoorTagRequest, LABEL_MAX_PT, LABEL_MIN_PT, PlacedEntry, compute_door_tag_layout,
};
pub use crate::layout::entries::{Entry, reconcile_assignments, reconcile_entries, round_robin};
pub use crate::layout::poster::{
    FitMode, GridLines, ImagePlacement, POSTER_MAX_SPACING_MM, PosterLayout, PosterRequest,
    TileGeometry, TrimMark, compute_poster_layout, trim_marks_for,
};
pub use crate::policy::guardrail::{
    Advisory, ClampReason, LARGE_FILE_BYTES, MAX_CANVAS_EDGE_PX, MAX_DOOR_TAG_PAGES,
    MAX_TILE_COUNT, ResolutionSpec, check_canvas_area, check_door_tag_pages, check_tile_count,
    effective_resolution, source_advisories,
};
pub use crate::render::door_tags::{cell_ops, door_tag_page, fit_photo};
pub use crate::render::poster::{PosterRaster, render_preview};
