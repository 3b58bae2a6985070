//! Resource guardrails.
//!
//! Resolution capping is a silent adjustment reported through [`ClampReason`]; tile count,
//! canvas area and page count are hard stops that refuse an export before anything large is
//! allocated.

use crate::foundation::core::{GridSpec, SourceImage};
use crate::foundation::error::{TileError, TileResult};
use crate::foundation::units::clamp_dpi;

/// Most poster tiles a single export may produce.
pub const MAX_TILE_COUNT: u64 = 64;
/// Largest virtual canvas edge budget; area is checked against its square.
pub const MAX_CANVAS_EDGE_PX: u64 = 12_000;
/// Most door-tag pages a single export may produce.
pub const MAX_DOOR_TAG_PAGES: u64 = 100;
/// Source files above this size get an advisory.
pub const LARGE_FILE_BYTES: u64 = 20 * 1024 * 1024;

const LARGE_IMAGE_MEGAPIXELS: f64 = 50.0;
const LARGE_IMAGE_DPI_CAP: u32 = 200;
const BIG_IMAGE_MEGAPIXELS: f64 = 25.0;
const BIG_IMAGE_DPI_CAP: u32 = 240;

/// Why the effective resolution is lower than the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampReason {
    /// Source above 50 MP; capped to 200 dpi.
    LargeImage,
    /// Source above 25 MP; capped to 240 dpi.
    BigImage,
}

impl std::fmt::Display for ClampReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LargeImage => f.write_str("large image capped"),
            Self::BigImage => f.write_str("big image capped"),
        }
    }
}

/// Requested vs. effective resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolutionSpec {
    /// Requested dpi after clamping to the supported range.
    pub requested_dpi: u32,
    /// Resolution actually used for pixel math.
    pub effective_dpi: u32,
    /// Set when the policy lowered the resolution.
    pub clamp_reason: Option<ClampReason>,
}

impl ResolutionSpec {
    /// A resolution that was not adjusted by policy.
    pub fn fixed(dpi: u32) -> Self {
        let dpi = clamp_dpi(dpi);
        Self {
            requested_dpi: dpi,
            effective_dpi: dpi,
            clamp_reason: None,
        }
    }
}

/// Non-blocking notices surfaced next to the controls; export still proceeds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The resolution was lowered by [`effective_resolution`].
    ResolutionCapped {
        /// Requested dpi.
        requested_dpi: u32,
        /// Dpi in use.
        effective_dpi: u32,
        /// Policy branch that fired.
        reason: ClampReason,
    },
    /// The encoded source file is large.
    LargeSourceFile {
        /// File size in bytes.
        bytes: u64,
    },
    /// The decoded source has a high pixel count.
    LargeSourceImage {
        /// Pixel count in millions.
        megapixels: f64,
    },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolutionCapped {
                requested_dpi,
                effective_dpi,
                reason,
            } => write!(
                f,
                "{reason}: resolution lowered from {requested_dpi} to {effective_dpi} dpi"
            ),
            Self::LargeSourceFile { bytes } => write!(
                f,
                "source file is {:.1} MiB; export may be slow",
                *bytes as f64 / (1024.0 * 1024.0)
            ),
            Self::LargeSourceImage { megapixels } => {
                write!(f, "source image is {megapixels:.1} MP; export may be slow")
            }
        }
    }
}

/// Derive the effective resolution for `source` from a requested dpi.
pub fn effective_resolution(source: SourceImage, requested_dpi: u32) -> ResolutionSpec {
    let requested = clamp_dpi(requested_dpi);
    let mp = source.megapixels();
    let (effective, reason) = if mp > LARGE_IMAGE_MEGAPIXELS && requested > LARGE_IMAGE_DPI_CAP {
        (LARGE_IMAGE_DPI_CAP, Some(ClampReason::LargeImage))
    } else if mp > BIG_IMAGE_MEGAPIXELS && requested > BIG_IMAGE_DPI_CAP {
        (BIG_IMAGE_DPI_CAP, Some(ClampReason::BigImage))
    } else {
        (requested, None)
    };
    ResolutionSpec {
        requested_dpi: requested,
        effective_dpi: clamp_dpi(effective),
        clamp_reason: reason,
    }
}

/// Refuse grids with more than [`MAX_TILE_COUNT`] cells.
pub fn check_tile_count(grid: GridSpec) -> TileResult<()> {
    let count = grid.cell_count();
    if count > MAX_TILE_COUNT {
        return Err(TileError::resource_guard(format!(
            "{}x{} grid is {count} tiles; the limit is {MAX_TILE_COUNT}",
            grid.columns, grid.rows
        )));
    }
    Ok(())
}

/// Refuse virtual canvases larger than [`MAX_CANVAS_EDGE_PX`] squared.
pub fn check_canvas_area(width_px: u32, height_px: u32) -> TileResult<()> {
    let area = u64::from(width_px) * u64::from(height_px);
    if area > MAX_CANVAS_EDGE_PX * MAX_CANVAS_EDGE_PX {
        return Err(TileError::resource_guard(format!(
            "virtual canvas {width_px}x{height_px} exceeds the {MAX_CANVAS_EDGE_PX}x{MAX_CANVAS_EDGE_PX} pixel limit; \
             lower the resolution or the grid size"
        )));
    }
    Ok(())
}

/// Refuse door-tag exports longer than [`MAX_DOOR_TAG_PAGES`].
pub fn check_door_tag_pages(pages: u64) -> TileResult<()> {
    if pages > MAX_DOOR_TAG_PAGES {
        return Err(TileError::resource_guard(format!(
            "{pages} door-tag pages exceed the limit of {MAX_DOOR_TAG_PAGES}"
        )));
    }
    Ok(())
}

/// Collect advisories for a loaded source.
pub fn source_advisories(
    source: SourceImage,
    file_bytes: Option<u64>,
    resolution: &ResolutionSpec,
) -> Vec<Advisory> {
    let mut out = Vec::new();
    if let Some(reason) = resolution.clamp_reason {
        out.push(Advisory::ResolutionCapped {
            requested_dpi: resolution.requested_dpi,
            effective_dpi: resolution.effective_dpi,
            reason,
        });
    }
    if let Some(bytes) = file_bytes
        && bytes > LARGE_FILE_BYTES
    {
        out.push(Advisory::LargeSourceFile { bytes });
    }
    let megapixels = source.megapixels();
    if megapixels > BIG_IMAGE_MEGAPIXELS {
        out.push(Advisory::LargeSourceImage { megapixels });
    }
    for advisory in &out {
        tracing::warn!(%advisory, "advisory");
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/policy/guardrail.rs"]
mod tests;
