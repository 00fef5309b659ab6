//! Tile key encodings.
//!
//! A quadtree tile at zoom level `zl` is addressed by its column/row
//! `(tile_i, tile_j)` with the origin at the top-left of the map. Three
//! interchangeable keys are derived from it:
//!
//! - **qmorton**: the Z-order interleave of `tile_i` (even bits) and `tile_j`
//!   (odd bits). Only meaningful together with its zoom level.
//! - **quadord**: qmorton left-aligned into a 64-bit word with the zoom level
//!   in the low bits. Sorting quadords is a pre-order walk of the quadtree.
//! - **quadstr**: the qmorton written in base 4, exactly `zl` digits long.
//!
//! ```rust
//! use quadtile::codec::{qmorton_to_quadord, qmorton_to_quadstr, tile_ij_to_qmorton};
//!
//! let qmorton = tile_ij_to_qmorton(1, 1);
//! assert_eq!(qmorton, 3);
//! assert_eq!(qmorton_to_quadord(qmorton, 1)?, (3 << 60) | 1);
//! assert_eq!(qmorton_to_quadstr(qmorton, 1)?, "3");
//! # Ok::<(), quadtile::QuadtileError>(())
//! ```

mod grid;
mod morton;
mod quadord;
mod quadstr;

pub use grid::{
    grid_box_to_tile_ij_range, grid_xy_to_tile_ij, qmorton_to_tile_center, qmorton_to_world,
    qmorton_to_world_wsen, tile_ij_to_grid_xy, tile_ij_to_world, tile_ij_to_world_wsen,
    world_to_qmorton, world_to_quadstr, world_to_tile_ij, wsen_to_qmorton_zl,
};
pub(crate) use morton::neighbor_step;
pub use morton::{
    Heading, QMORTON_LUT, qmorton_ancestor, qmorton_children, qmorton_neighbor,
    qmorton_neighborhood, qmorton_to_tile_ij, qmorton_zoom_by, smallest_common_ancestor,
    tile_ij_to_qmorton,
};
pub use quadord::{
    QUADORD_QM_MASK, QUADORD_ZL_MASK, qmorton_to_quadord, quadord_contains, quadord_to_qmorton,
    quadord_to_qmorton_zl, quadord_zl,
};
pub use quadstr::{
    qmorton_to_quadstr, quadstr_to_qmorton, quadstr_to_qmorton_zl, quadstr_zl,
    smallest_containing_quadstr, strip_quadstr, tile_ij_to_quadstr,
};

pub(crate) use quadord::pack_quadord;
pub(crate) use quadstr::render_quadstr;

use crate::error::{QuadtileError, Result};

/// Finest supported zoom level. A zoom-28 qmorton uses 56 bits.
pub const MAX_ZOOM_LEVEL: u8 = 28;

/// Returns `zl` if it lies in `[0, MAX_ZOOM_LEVEL]`.
pub fn check_zoom(zl: u8) -> Result<u8> {
    if zl > MAX_ZOOM_LEVEL {
        return Err(QuadtileError::InvalidZoom(u32::from(zl)));
    }
    Ok(zl)
}

/// Number of tiles along one side of the map, `2^zl`.
///
/// `zl` must already be a valid zoom level.
pub const fn map_tile_size(zl: u8) -> u32 {
    1u32 << zl
}

/// Largest tile index along one axis, `2^zl - 1`.
///
/// `zl` must already be a valid zoom level.
pub const fn max_tile_idx(zl: u8) -> u32 {
    map_tile_size(zl) - 1
}

/// Largest qmorton at the given zoom level, `4^zl - 1`.
///
/// `zl` must already be a valid zoom level.
pub const fn max_qmorton(zl: u8) -> u64 {
    0x3FFF_FFFF_FFFF_FFFF >> (62 - 2 * zl as u32)
}

pub(crate) fn check_qmorton(qmorton: u64, zl: u8) -> Result<()> {
    check_zoom(zl)?;
    if qmorton > max_qmorton(zl) {
        return Err(QuadtileError::ZoomMismatch { qmorton, zl });
    }
    Ok(())
}

pub(crate) fn check_tile_ij(tile_i: u32, tile_j: u32, zl: u8) -> Result<()> {
    check_zoom(zl)?;
    let max = max_tile_idx(zl);
    if tile_i > max || tile_j > max {
        return Err(QuadtileError::TileOutOfRange {
            tile_i: u64::from(tile_i),
            tile_j: u64::from(tile_j),
            zl,
        });
    }
    Ok(())
}
