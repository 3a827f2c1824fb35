//! Export module for writing layers to lossless PNG files.

mod debug;
mod png;

pub use debug::DebugDump;
pub use png::{export_field_png, export_mask_png, export_rgba_png, ExportError, PngOptions};
