//! Door-tag page assembly.

use std::sync::Arc;

use image::{RgbImage, RgbaImage, imageops};

use crate::{
    export::sink::{DrawOp, Page},
    foundation::core::{PageIndex, Rect},
    foundation::units::mm_to_px,
    layout::door_tags::{DoorTagLayout, PlacedEntry},
};

const FRAME_FILL: [u8; 3] = [250, 250, 250];
const CUT_GUIDE: [u8; 3] = [160, 160, 160];
const CUT_GUIDE_WIDTH_MM: f64 = 0.2;
const LABEL_INK: [u8; 3] = [20, 20, 20];

/// Cover-fit `photo` into a box of `box_mm` at `dpi`, center-cropping the overflow.
pub fn fit_photo(photo: &RgbaImage, box_mm: Rect, dpi: u32) -> RgbImage {
    let tw = mm_to_px(box_mm.width(), dpi).max(1);
    let th = mm_to_px(box_mm.height(), dpi).max(1);
    let (sw, sh) = photo.dimensions();

    // Largest centered source region with the target aspect ratio.
    let target_aspect = f64::from(tw) / f64::from(th);
    let (cw, ch) = if f64::from(sw) / f64::from(sh) > target_aspect {
        (
            ((f64::from(sh) * target_aspect).round() as u32).clamp(1, sw),
            sh,
        )
    } else {
        (
            sw,
            ((f64::from(sw) / target_aspect).round() as u32).clamp(1, sh),
        )
    };
    let cx = (sw - cw) / 2;
    let cy = (sh - ch) / 2;

    let cropped = imageops::crop_imm(photo, cx, cy, cw, ch).to_image();
    let resized = imageops::resize(&cropped, tw, th, imageops::FilterType::Triangle);
    let mut out = RgbaImage::from_pixel(tw, th, image::Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut out, &resized, 0, 0);
    image::DynamicImage::ImageRgba8(out).to_rgb8()
}

/// Draw list for one cell.
pub fn cell_ops(
    layout: &DoorTagLayout,
    placed: &PlacedEntry,
    photo: Option<Arc<RgbImage>>,
) -> Vec<DrawOp> {
    let slots = &placed.slots;
    let mut ops = Vec::with_capacity(4);
    ops.push(DrawOp::FillRect {
        rect: slots.frame,
        rgb: FRAME_FILL,
    });
    if let (Some(rect), Some(image)) = (slots.photo, photo) {
        ops.push(DrawOp::Image { rect, image });
    }
    if !placed.label.is_empty() {
        ops.push(DrawOp::Text {
            anchor: slots.label_anchor,
            size_pt: layout.label_pt,
            text: placed.label.clone(),
            rgb: LABEL_INK,
        });
    }
    ops.push(DrawOp::StrokeRect {
        rect: slots.cut_border,
        rgb: CUT_GUIDE,
        width_mm: CUT_GUIDE_WIDTH_MM,
    });
    ops
}

/// Assemble page `page`; `photos[i]` is the fitted photo for the i-th cell on that page.
pub fn door_tag_page(
    layout: &DoorTagLayout,
    page: PageIndex,
    photos: &[Option<Arc<RgbImage>>],
) -> Page {
    let cells = layout.cells_on_page(page);
    let ops = cells
        .iter()
        .enumerate()
        .flat_map(|(i, placed)| cell_ops(layout, placed, photos.get(i).cloned().flatten()))
        .collect();
    Page {
        size_mm: layout.page.size_mm(),
        ops,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/door_tags.rs"]
mod tests;
