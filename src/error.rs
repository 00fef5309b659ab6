//! Error types for tile codecs, projections, decomposition and configuration.

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuadtileError {
    /// A quadstr contained a character other than `0`..`3` after stripping.
    #[error("Invalid quadstr '{quadstr}': {reason}")]
    InvalidQuadstr { quadstr: String, reason: String },

    /// Zoom level outside `[0, 28]`.
    #[error("Zoom level {0} is out of range (0..=28)")]
    InvalidZoom(u32),

    /// A qmorton used at a zoom level it does not belong to: it carries more
    /// bits than the zoom allows, or it is compared across zoom levels.
    #[error("qmorton {qmorton:#x} does not match zoom level {zl}")]
    ZoomMismatch { qmorton: u64, zl: u8 },

    /// Coarse zoom is finer than the fine zoom.
    #[error("Invalid zoom range: coarse level {coarse} is finer than fine level {fine}")]
    InvalidZoomRange { coarse: u8, fine: u8 },

    /// Tile index outside the map at the given zoom level.
    #[error("Tile ({tile_i}, {tile_j}) is outside the map at zoom level {zl}")]
    TileOutOfRange { tile_i: u64, tile_j: u64, zl: u8 },

    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QuadtileError {
    pub(crate) fn invalid_quadstr(quadstr: &str, reason: impl Into<String>) -> Self {
        QuadtileError::InvalidQuadstr {
            quadstr: quadstr.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for quadtile operations.
pub type Result<T> = std::result::Result<T, QuadtileError>;
