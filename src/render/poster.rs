//! Poster tile and preview rasterization.

use std::sync::Arc;

use image::{Rgb, RgbImage, RgbaImage, imageops};

use crate::{
    export::sink::{DrawOp, Page},
    foundation::core::{PixelRect, Rect, Vec2},
    foundation::error::{TileError, TileResult},
    layout::poster::{PosterLayout, TileGeometry},
};

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const PREVIEW_BG: Rgb<u8> = Rgb([236, 236, 236]);
const PREVIEW_GRID: Rgb<u8> = Rgb([220, 40, 40]);

/// Source pixels prepared for tile sampling.
///
/// When the placement shrinks the source, it is resampled once up front so every tile samples
/// at roughly 1:1 instead of aliasing.
#[derive(Clone, Debug)]
pub struct PosterRaster {
    layout: Arc<PosterLayout>,
    src: Arc<RgbaImage>,
    scale_x: f64,
    scale_y: f64,
    offset: Vec2,
}

impl PosterRaster {
    /// Prepare `pixels` (the decoded source) for `layout`.
    pub fn prepare(layout: Arc<PosterLayout>, pixels: Arc<RgbaImage>) -> TileResult<Self> {
        let (w, h) = pixels.dimensions();
        if w != layout.source.width || h != layout.source.height {
            return Err(TileError::validation(format!(
                "pixels are {w}x{h} but the layout was computed for {}x{}",
                layout.source.width, layout.source.height
            )));
        }
        let placement = layout.placement;
        let src = if placement.scale < 1.0 {
            let tw = (placement.drawn.width.round() as u32).max(1);
            let th = (placement.drawn.height.round() as u32).max(1);
            tracing::debug!(from = ?(w, h), to = ?(tw, th), "prescaling poster source");
            Arc::new(imageops::resize(
                &*pixels,
                tw,
                th,
                imageops::FilterType::Triangle,
            ))
        } else {
            pixels
        };
        let scale_x = placement.drawn.width / f64::from(src.width());
        let scale_y = placement.drawn.height / f64::from(src.height());
        Ok(Self {
            layout,
            src,
            scale_x,
            scale_y,
            offset: placement.offset,
        })
    }

    /// Layout this raster was prepared for.
    pub fn layout(&self) -> &PosterLayout {
        &self.layout
    }

    /// Compose one tile: paper background, sampled source, optional trim marks.
    pub fn render_tile(&self, tile: &TileGeometry) -> RgbImage {
        let crop = tile.crop;
        let mut out = RgbImage::from_pixel(crop.width, crop.height, PAPER);

        let drawn = self.layout.placement.drawn_rect();
        let x0 = (drawn.x0 - f64::from(crop.x)).max(0.0).floor() as u32;
        let y0 = (drawn.y0 - f64::from(crop.y)).max(0.0).floor() as u32;
        let x1 = ((drawn.x1 - f64::from(crop.x)).ceil().max(0.0) as u32).min(crop.width);
        let y1 = ((drawn.y1 - f64::from(crop.y)).ceil().max(0.0) as u32).min(crop.height);

        for y in y0..y1 {
            let cy = f64::from(crop.y + y) + 0.5;
            let v = (cy - self.offset.y) / self.scale_y - 0.5;
            for x in x0..x1 {
                let cx = f64::from(crop.x + x) + 0.5;
                if cx < drawn.x0 || cx >= drawn.x1 || cy < drawn.y0 || cy >= drawn.y1 {
                    continue;
                }
                let u = (cx - self.offset.x) / self.scale_x - 0.5;
                out.put_pixel(x, y, over_paper(sample_bilinear(&self.src, u, v)));
            }
        }

        for mark in &self.layout.trim_marks {
            fill_rect(&mut out, mark.horizontal, INK);
            fill_rect(&mut out, mark.vertical, INK);
        }
        out
    }

    /// Wrap a rendered tile into a page: the bitmap fills the printable area.
    pub fn page_for(&self, tile_image: RgbImage) -> Page {
        Page {
            size_mm: self.layout.page.size_mm(),
            ops: vec![DrawOp::Image {
                rect: self.layout.content_rect_mm(),
                image: Arc::new(tile_image),
            }],
        }
    }
}

/// Downscaled virtual canvas with internal grid lines.
pub fn render_preview(layout: &PosterLayout, pixels: &RgbaImage, max_edge: u32) -> RgbImage {
    let scale = layout.preview_scale(max_edge);
    let pw = ((f64::from(layout.virtual_width) * scale).round() as u32).max(1);
    let ph = ((f64::from(layout.virtual_height) * scale).round() as u32).max(1);

    let placement = layout.placement.scaled(scale);
    let mut canvas = RgbaImage::from_pixel(pw, ph, image::Rgba([255, 255, 255, 255]));

    // Only the part of the drawn image that lands on the preview is resampled.
    let visible = placement
        .drawn_rect()
        .intersect(Rect::new(0.0, 0.0, f64::from(pw), f64::from(ph)));
    if visible.width() > 0.0 && visible.height() > 0.0 {
        let (sw, sh) = pixels.dimensions();
        let to_src = |v: f64, off: f64| (v - off) / placement.scale;
        let sx0 = (to_src(visible.x0, placement.offset.x).floor().max(0.0) as u32).min(sw - 1);
        let sy0 = (to_src(visible.y0, placement.offset.y).floor().max(0.0) as u32).min(sh - 1);
        let sx1 = (to_src(visible.x1, placement.offset.x).ceil() as u32).clamp(sx0 + 1, sw);
        let sy1 = (to_src(visible.y1, placement.offset.y).ceil() as u32).clamp(sy0 + 1, sh);
        let window = imageops::crop_imm(pixels, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();

        let tw = (visible.width().round() as u32).clamp(1, pw);
        let th = (visible.height().round() as u32).clamp(1, ph);
        let scaled = imageops::resize(&window, tw, th, imageops::FilterType::Triangle);
        imageops::overlay(
            &mut canvas,
            &scaled,
            visible.x0.round() as i64,
            visible.y0.round() as i64,
        );
    }
    let mut out = image::DynamicImage::ImageRgba8(canvas).to_rgb8();

    // Letterbox areas for contain are outside the drawn image; tint them.
    let drawn = placement.drawn_rect();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let (fx, fy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
        if fx < drawn.x0 || fx >= drawn.x1 || fy < drawn.y0 || fy >= drawn.y1 {
            *px = PREVIEW_BG;
        }
    }

    let lines = layout.grid_lines(scale);
    for x in lines.vertical {
        let x = (x.round() as u32).min(pw - 1);
        fill_rect(&mut out, PixelRect::new(x, 0, 1, ph), PREVIEW_GRID);
    }
    for y in lines.horizontal {
        let y = (y.round() as u32).min(ph - 1);
        fill_rect(&mut out, PixelRect::new(0, y, pw, 1), PREVIEW_GRID);
    }
    out
}

fn sample_bilinear(src: &RgbaImage, u: f64, v: f64) -> [u8; 4] {
    let (w, h) = src.dimensions();
    let u = u.clamp(0.0, f64::from(w - 1));
    let v = v.clamp(0.0, f64::from(h - 1));
    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = u - f64::from(x0);
    let fy = v - f64::from(y0);

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
        let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Straight-alpha source over white paper.
fn over_paper(px: [u8; 4]) -> Rgb<u8> {
    let a = u16::from(px[3]);
    let inv = 255 - a;
    let ch = |c: u8| ((u16::from(c) * a + 255 * inv + 127) / 255) as u8;
    Rgb([ch(px[0]), ch(px[1]), ch(px[2])])
}

pub(crate) fn fill_rect(img: &mut RgbImage, rect: PixelRect, color: Rgb<u8>) {
    let x1 = (rect.right()).min(u64::from(img.width())) as u32;
    let y1 = (rect.bottom()).min(u64::from(img.height())) as u32;
    for y in rect.y..y1 {
        for x in rect.x..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/poster.rs"]
mod tests;
