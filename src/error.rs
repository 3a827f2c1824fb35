//! Errors raised while generating cloud and atmosphere layers.

use thiserror::Error;

use crate::export::ExportError;
use crate::palette::PaletteError;

/// Smallest canvas side accepted by the generators.
pub const MIN_CANVAS_SIZE: u32 = 16;

/// A cloud or atmosphere layer could not be produced.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Palette lookup failed: {0}")]
    Palette(#[from] PaletteError),
    #[error("Debug export failed: {0}")]
    Export(#[from] ExportError),
    #[error("Invalid canvas size: {0} (must be at least {1})")]
    InvalidCanvas(u32, u32),
}

/// Rejects canvases too small to hold a disc with a soft edge.
pub fn check_canvas(size: u32) -> Result<(), GenerationError> {
    if size < MIN_CANVAS_SIZE {
        return Err(GenerationError::InvalidCanvas(size, MIN_CANVAS_SIZE));
    }
    Ok(())
}
