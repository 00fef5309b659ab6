//! quadord: a sortable 64-bit tile key.
//!
//! Layout, most significant first: two zero bits, the qmorton left-aligned in
//! the next 56 bits, one zero bit, then the zoom level in the low 5 bits. The
//! top bit stays clear, so a quadord is also a valid non-negative `i64`.

use super::{MAX_ZOOM_LEVEL, check_qmorton};
use crate::error::{QuadtileError, Result};

/// Low bits holding the zoom level.
pub const QUADORD_ZL_MASK: u64 = 0x1f;
/// Bits holding the left-aligned qmorton.
pub const QUADORD_QM_MASK: u64 = 0x3fff_ffff_ffff_ffc0;

#[inline]
pub(crate) const fn pack_quadord(qmorton: u64, zl: u8) -> u64 {
    (qmorton << (62 - 2 * zl as u32)) | zl as u64
}

/// Packs a qmorton and its zoom level into a quadord.
///
/// # Examples
///
/// ```rust
/// use quadtile::codec::qmorton_to_quadord;
///
/// assert_eq!(qmorton_to_quadord(3, 1)?, (3u64 << 60) | 1);
/// assert_eq!(qmorton_to_quadord(0, 0)?, 0);
/// # Ok::<(), quadtile::QuadtileError>(())
/// ```
pub fn qmorton_to_quadord(qmorton: u64, zl: u8) -> Result<u64> {
    check_qmorton(qmorton, zl)?;
    Ok(pack_quadord(qmorton, zl))
}

/// Zoom level stored in a quadord.
#[inline]
pub const fn quadord_zl(quadord: u64) -> u8 {
    (quadord & QUADORD_ZL_MASK) as u8
}

/// qmorton stored in a quadord. The key is assumed well formed.
#[inline]
pub fn quadord_to_qmorton(quadord: u64) -> u64 {
    let zl = quadord_zl(quadord).min(MAX_ZOOM_LEVEL);
    (quadord & QUADORD_QM_MASK) >> (62 - 2 * u32::from(zl))
}

/// Unpacks a quadord into `(qmorton, zl)`, rejecting malformed keys.
pub fn quadord_to_qmorton_zl(quadord: u64) -> Result<(u64, u8)> {
    let zl = quadord_zl(quadord);
    if zl > MAX_ZOOM_LEVEL {
        return Err(QuadtileError::InvalidZoom(u32::from(zl)));
    }
    let unused_low_bits = (1u64 << (62 - 2 * u32::from(zl))) - 1;
    let reserved = !(QUADORD_QM_MASK | QUADORD_ZL_MASK) | (unused_low_bits & QUADORD_QM_MASK);
    if quadord & reserved != 0 {
        return Err(QuadtileError::InvalidInput(format!(
            "quadord {quadord:#x} has bits set outside its zoom-{zl} key"
        )));
    }
    Ok((quadord_to_qmorton(quadord), zl))
}

/// True when tile `outer` equals or contains tile `inner`.
///
/// Compares the leading `zl(outer)` base-4 digits of both keys, which are
/// already aligned in the quadord layout.
#[inline]
pub fn quadord_contains(outer: u64, inner: u64) -> bool {
    if outer == inner {
        return true;
    }
    let zl_outer = quadord_zl(outer).min(MAX_ZOOM_LEVEL);
    if quadord_zl(inner) < zl_outer {
        return false;
    }
    let prefix_mask = QUADORD_QM_MASK << (56 - 2 * u32::from(zl_outer));
    (inner & prefix_mask) == (outer & QUADORD_QM_MASK)
}
