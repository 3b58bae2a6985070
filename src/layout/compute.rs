use crate::{
    foundation::core::SourceImage,
    foundation::error::TileResult,
    layout::door_tags::{DoorTagLayout, DoorTagRequest, compute_door_tag_layout},
    layout::entries::Entry,
    layout::poster::{PosterLayout, PosterRequest, compute_poster_layout},
};

/// Everything needed to compute one layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutRequest {
    /// Poster tiling of a single image.
    Poster {
        /// Page, grid, spacing, resolution and fit.
        request: PosterRequest,
        /// Loaded source, if any.
        source: Option<SourceImage>,
    },
    /// Door-tag sheet.
    DoorTags {
        /// Page, grid, spacing and label settings.
        request: DoorTagRequest,
        /// Entries in print order.
        entries: Vec<Entry>,
    },
}

/// Result of [`compute_layout`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    /// Poster geometry.
    Poster(PosterLayout),
    /// Door-tag geometry.
    DoorTags(DoorTagLayout),
}

/// Pure layout entry point: identical requests produce identical geometry.
pub fn compute_layout(req: &LayoutRequest) -> TileResult<Geometry> {
    match req {
        LayoutRequest::Poster { request, source } => {
            compute_poster_layout(request, *source).map(Geometry::Poster)
        }
        LayoutRequest::DoorTags { request, entries } => {
            compute_door_tag_layout(request, entries).map(Geometry::DoorTags)
        }
    }
}

/// Holds pending inputs and the last computed geometry.
///
/// Inputs can change any number of times; geometry is only recomputed when the caller invokes
/// [`LayoutSession::apply`], so a UI can debounce or wait for an explicit "apply".
#[derive(Debug, Default)]
pub struct LayoutSession {
    pending: Option<LayoutRequest>,
    applied: Option<LayoutRequest>,
    geometry: Option<Geometry>,
}

impl LayoutSession {
    /// Empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending inputs. Does not recompute.
    pub fn set_request(&mut self, req: LayoutRequest) {
        self.pending = Some(req);
    }

    /// `true` when pending inputs differ from the last applied ones.
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some() && self.pending != self.applied
    }

    /// Recompute if the inputs changed; returns the current geometry.
    ///
    /// On error the previous geometry is kept and the error is returned.
    pub fn apply(&mut self) -> TileResult<Option<&Geometry>> {
        if self.is_dirty()
            && let Some(req) = self.pending.as_ref()
        {
            let geometry = compute_layout(req)?;
            self.applied = self.pending.clone();
            self.geometry = Some(geometry);
        }
        Ok(self.geometry.as_ref())
    }

    /// Last successfully computed geometry.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/compute.rs"]
mod tests;
