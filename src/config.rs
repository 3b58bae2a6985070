//! Persisted settings for both layout modes.
//!
//! Settings files are JSON. Missing fields take their defaults, so a file can override only
//! what it cares about. Unknown fields are rejected to catch typos.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    export::session::RenderThreading,
    foundation::core::{GridSpec, Orientation, PageSpec, PaperPreset, SpacingSpec},
    foundation::error::{TileError, TileResult},
    layout::door_tags::DoorTagRequest,
    layout::poster::{FitMode, PosterRequest},
};

/// Poster tiling settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PosterSettings {
    /// Paper preset.
    pub paper: PaperPreset,
    /// Page orientation.
    pub orientation: Orientation,
    /// Tile columns.
    pub columns: u32,
    /// Tile rows.
    pub rows: u32,
    /// Page margin in millimeters.
    pub margin_mm: f64,
    /// Overlap between adjacent tiles in millimeters.
    pub overlap_mm: f64,
    /// Requested output resolution.
    pub dpi: u32,
    /// Cover or contain.
    pub fit: FitMode,
    /// Draw corner trim marks.
    pub trim_marks: bool,
}

impl Default for PosterSettings {
    fn default() -> Self {
        Self {
            paper: PaperPreset::A4,
            orientation: Orientation::Auto,
            columns: 3,
            rows: 3,
            margin_mm: 10.0,
            overlap_mm: 5.0,
            dpi: 300,
            fit: FitMode::Cover,
            trim_marks: true,
        }
    }
}

impl PosterSettings {
    /// Build the layout request these settings describe.
    pub fn to_request(&self) -> PosterRequest {
        PosterRequest {
            page: PageSpec::new(self.paper, self.orientation),
            grid: GridSpec {
                columns: self.columns,
                rows: self.rows,
            },
            spacing: SpacingSpec {
                margin_mm: self.margin_mm,
                gap_mm: self.overlap_mm,
            },
            dpi: self.dpi,
            fit: self.fit,
            trim_marks: self.trim_marks,
        }
    }

    /// Copy with every numeric field clamped into its supported range.
    pub fn sanitized(&self) -> Self {
        let req = self.to_request().sanitized();
        Self {
            columns: req.grid.columns,
            rows: req.grid.rows,
            margin_mm: req.spacing.margin_mm,
            overlap_mm: req.spacing.gap_mm,
            dpi: req.dpi,
            ..self.clone()
        }
    }
}

/// Door-tag sheet settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoorTagSettings {
    /// Paper preset.
    pub paper: PaperPreset,
    /// Page orientation; `auto` resolves to portrait.
    pub orientation: Orientation,
    /// Cells per row.
    pub columns: u32,
    /// Rows per page.
    pub rows: u32,
    /// Page margin in millimeters.
    pub margin_mm: f64,
    /// Gap between cells in millimeters.
    pub gutter_mm: f64,
    /// Label font size in points.
    pub label_pt: f64,
    /// Reserve and fill a photo slot in each cell.
    pub include_photo: bool,
    /// Photo raster resolution.
    pub dpi: u32,
}

impl Default for DoorTagSettings {
    fn default() -> Self {
        Self {
            paper: PaperPreset::A4,
            orientation: Orientation::Portrait,
            columns: 3,
            rows: 4,
            margin_mm: 10.0,
            gutter_mm: 4.0,
            label_pt: 18.0,
            include_photo: true,
            dpi: 300,
        }
    }
}

impl DoorTagSettings {
    /// Build the layout request these settings describe.
    pub fn to_request(&self) -> DoorTagRequest {
        DoorTagRequest {
            page: PageSpec::new(self.paper, self.orientation),
            grid: GridSpec {
                columns: self.columns,
                rows: self.rows,
            },
            spacing: SpacingSpec {
                margin_mm: self.margin_mm,
                gap_mm: self.gutter_mm,
            },
            label_pt: self.label_pt,
            include_photo: self.include_photo,
            dpi: self.dpi,
        }
    }

    /// Copy with every numeric field clamped into its supported range.
    pub fn sanitized(&self) -> Self {
        let req = self.to_request().sanitized();
        Self {
            columns: req.grid.columns,
            rows: req.grid.rows,
            margin_mm: req.spacing.margin_mm,
            gutter_mm: req.spacing.gap_mm,
            label_pt: req.label_pt,
            dpi: req.dpi,
            ..self.clone()
        }
    }
}

/// Contents of a settings file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Poster mode.
    pub poster: PosterSettings,
    /// Door-tag mode.
    pub door_tags: DoorTagSettings,
    /// Export worker pool.
    pub threading: RenderThreading,
}

impl Settings {
    /// Parse settings from JSON text.
    pub fn from_json_str(text: &str) -> TileResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| TileError::validation(format!("invalid settings JSON: {e}")))
    }

    /// Serialize as pretty JSON.
    pub fn to_json_string(&self) -> TileResult<String> {
        Ok(serde_json::to_string_pretty(self).context("serialize settings")?)
    }
}

/// Read a JSON settings file.
#[tracing::instrument]
pub fn load_settings(path: &Path) -> TileResult<Settings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read settings '{}'", path.display()))?;
    let settings = Settings::from_json_str(&text)?;
    tracing::debug!("settings loaded");
    Ok(settings)
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
