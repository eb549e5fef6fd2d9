//! filmsim-export: Pure encoders and output naming (sans-IO)
//!
//! Turns transformed pixel buffers into downloadable bytes. Supports
//! JPEG (the download format, quality 98) and PNG (lossless previews),
//! names downloads after the recipe, and provides [`render_preview`],
//! which falls back to the untouched input when any step fails.

pub mod encode;
pub mod naming;
pub mod preview;

pub use encode::{EncodeError, JPEG_QUALITY, encode_jpeg, encode_png};
pub use naming::{download_filename, download_filename_now, unix_millis};
pub use preview::{Preview, PreviewError, render_preview};
