use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbImage;
use rayon::prelude::*;

use crate::assets::decode::LoadedImage;
use crate::export::sink::{Page, PageSink, SinkConfig};
use crate::foundation::core::PageIndex;
use crate::foundation::error::{TileError, TileResult};
use crate::layout::door_tags::{DoorTagLayout, DoorTagRequest, compute_door_tag_layout};
use crate::layout::entries::Entry;
use crate::layout::poster::{PosterRequest, compute_poster_layout};
use crate::policy::guardrail::{Advisory, source_advisories};
use crate::render::door_tags::{door_tag_page, fit_photo};
use crate::render::poster::PosterRaster;

/// Worker pool settings for export rendering.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Worker thread cap; `None` lets rayon pick.
    pub threads: Option<usize>,
    /// Pages rendered per batch before they are handed to the sink.
    pub chunk_size: usize,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            threads: None,
            chunk_size: 8,
        }
    }
}

/// Summary of a finished export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportStats {
    /// Pages pushed to the sink.
    pub pages: u32,
    /// Resolution the rasters were rendered at.
    pub effective_dpi: u32,
    /// Non-fatal notices collected while exporting.
    pub advisories: Vec<Advisory>,
}

/// Drives layout, rendering and a [`PageSink`] for one export at a time.
#[derive(Debug, Default)]
pub struct Exporter {
    threading: RenderThreading,
    busy: AtomicBool,
}

struct ExportTicket<'a>(&'a AtomicBool);

impl Drop for ExportTicket<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Exporter {
    /// Create an exporter with the given worker settings.
    pub fn new(threading: RenderThreading) -> Self {
        Self {
            threading,
            busy: AtomicBool::new(false),
        }
    }

    /// Worker settings in use.
    pub fn threading(&self) -> &RenderThreading {
        &self.threading
    }

    /// Whether an export is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> TileResult<ExportTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TileError::ExportInProgress)?;
        Ok(ExportTicket(&self.busy))
    }

    /// Export one page per poster tile, in row-major order.
    ///
    /// Layout guards (tile count, canvas area) run before any tile raster is allocated.
    #[tracing::instrument(skip_all, fields(grid = ?req.grid, dpi = req.dpi))]
    pub fn export_poster(
        &self,
        req: &PosterRequest,
        image: Option<&LoadedImage>,
        sink: &mut dyn PageSink,
    ) -> TileResult<ExportStats> {
        let _ticket = self.acquire()?;
        let image = image.ok_or_else(|| TileError::precondition("no source image loaded"))?;
        let layout = Arc::new(compute_poster_layout(req, Some(image.source))?);
        let advisories = source_advisories(image.source, image.file_bytes, &layout.resolution);
        let effective_dpi = layout.resolution.effective_dpi;
        let raster = PosterRaster::prepare(Arc::clone(&layout), Arc::clone(&image.pixels))?;

        let page_count = u32::try_from(layout.tiles.len())
            .map_err(|_| TileError::resource_guard("tile count overflow"))?;
        sink.begin(SinkConfig {
            page_size_mm: layout.page.size_mm(),
            page_count,
            title: format!("Poster {}x{}", layout.grid.columns, layout.grid.rows),
        })?;

        let pool = build_thread_pool(self.threading.threads)?;
        let chunk_size = normalized_chunk_size(self.threading.chunk_size);
        let mut next = 0u32;
        for chunk in layout.tiles.chunks(chunk_size) {
            let pages: Vec<Page> = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|tile| raster.page_for(raster.render_tile(tile)))
                    .collect()
            });
            for page in &pages {
                sink.push_page(PageIndex(next), page)?;
                next += 1;
            }
            tracing::debug!(done = next, total = page_count, "poster chunk pushed");
        }
        sink.end()?;

        tracing::info!(pages = page_count, effective_dpi, "poster exported");
        Ok(ExportStats {
            pages: page_count,
            effective_dpi,
            advisories,
        })
    }

    /// Export door-tag sheets. `photos` is indexed by [`Entry::photo`].
    ///
    /// Each referenced photo is fitted once to the shared photo slot size; pages are then
    /// assembled in batches and pushed in order.
    #[tracing::instrument(skip_all, fields(entries = entries.len(), photos = photos.len()))]
    pub fn export_door_tags(
        &self,
        req: &DoorTagRequest,
        entries: &[Entry],
        photos: &[LoadedImage],
        sink: &mut dyn PageSink,
    ) -> TileResult<ExportStats> {
        let _ticket = self.acquire()?;
        let layout = compute_door_tag_layout(req, entries)?;
        let effective_dpi = layout.resolution.effective_dpi;
        let pool = build_thread_pool(self.threading.threads)?;

        let fitted = pool.install(|| fit_used_photos(&layout, photos));

        sink.begin(SinkConfig {
            page_size_mm: layout.page.size_mm(),
            page_count: layout.pages,
            title: "Door tags".to_owned(),
        })?;

        let page_indices: Vec<u32> = (0..layout.pages).collect();
        let chunk_size = normalized_chunk_size(self.threading.chunk_size);
        for chunk in page_indices.chunks(chunk_size) {
            let pages: Vec<Page> = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|&p| {
                        let page = PageIndex(p);
                        let cell_photos: Vec<Option<Arc<RgbImage>>> = layout
                            .cells_on_page(page)
                            .iter()
                            .map(|placed| {
                                placed
                                    .photo
                                    .and_then(|i| fitted.get(i).cloned().flatten())
                            })
                            .collect();
                        door_tag_page(&layout, page, &cell_photos)
                    })
                    .collect()
            });
            for (p, page) in chunk.iter().zip(&pages) {
                sink.push_page(PageIndex(*p), page)?;
            }
        }
        sink.end()?;

        let advisories = photos
            .iter()
            .flat_map(|p| source_advisories(p.source, p.file_bytes, &layout.resolution))
            .collect();
        tracing::info!(
            pages = layout.pages,
            cells = layout.cells.len(),
            "door tags exported"
        );
        Ok(ExportStats {
            pages: layout.pages,
            effective_dpi,
            advisories,
        })
    }
}

/// Fit every photo referenced by a placed cell; unreferenced slots stay `None`.
fn fit_used_photos(layout: &DoorTagLayout, photos: &[LoadedImage]) -> Vec<Option<Arc<RgbImage>>> {
    let Some(photo_box) = layout.cells.first().and_then(|c| c.slots.photo) else {
        return vec![None; photos.len()];
    };
    let mut used = vec![false; photos.len()];
    for placed in &layout.cells {
        if let Some(i) = placed.photo
            && let Some(slot) = used.get_mut(i)
        {
            *slot = true;
        }
    }
    let dpi = layout.resolution.effective_dpi;
    photos
        .par_iter()
        .zip(used.par_iter())
        .map(|(photo, &used)| used.then(|| Arc::new(fit_photo(&photo.pixels, photo_box, dpi))))
        .collect()
}

fn build_thread_pool(threads: Option<usize>) -> TileResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TileError::validation(
            "export threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TileError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/export/session.rs"]
mod tests;
