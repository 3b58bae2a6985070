//! Document export.
//!
//! Sinks consume finished pages in page order and are driven by [`session::Exporter`].

/// PDF output via `lopdf`.
pub mod pdf;
/// Export orchestration: guards, worker pool, page ordering.
pub mod session;
/// Page model, sink trait and built-in sinks.
pub mod sink;
