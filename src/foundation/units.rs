//! Physical-to-pixel unit conversion.
//!
//! Every conversion clamps instead of failing: a DPI outside `[MIN_DPI, MAX_DPI]` is pulled to
//! the nearest bound and negative lengths convert to zero pixels.

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;
/// PDF points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;
/// Lowest supported resolution.
pub const MIN_DPI: u32 = 96;
/// Highest supported resolution.
pub const MAX_DPI: u32 = 600;

/// Clamp a requested resolution into `[MIN_DPI, MAX_DPI]`.
pub fn clamp_dpi(dpi: u32) -> u32 {
    dpi.clamp(MIN_DPI, MAX_DPI)
}

/// Convert a length in millimeters to whole pixels at `dpi` (rounded to nearest).
pub fn mm_to_px(value_mm: f64, dpi: u32) -> u32 {
    let px = mm_to_px_exact(value_mm, dpi).round();
    if px.is_finite() && px > 0.0 {
        px as u32
    } else {
        0
    }
}

/// Unrounded pixel length; used where sub-pixel positions matter (preview scaling, photo boxes).
pub fn mm_to_px_exact(value_mm: f64, dpi: u32) -> f64 {
    value_mm / MM_PER_INCH * f64::from(clamp_dpi(dpi))
}

/// Convert pixels back to millimeters at `dpi`.
pub fn px_to_mm(px: u32, dpi: u32) -> f64 {
    f64::from(px) * MM_PER_INCH / f64::from(clamp_dpi(dpi))
}

/// Convert millimeters to PDF points.
pub fn mm_to_pt(value_mm: f64) -> f64 {
    value_mm * POINTS_PER_INCH / MM_PER_INCH
}

/// Clamp a non-negative length setting, mapping NaN and infinities to `0.0`.
pub(crate) fn clamp_mm(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/units.rs"]
mod tests;
