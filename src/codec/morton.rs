//! Morton (Z-order) interleaving and qmorton arithmetic.

use super::{check_qmorton, check_zoom, max_qmorton};
use crate::error::Result;

/// Even bit positions, the `tile_i` half of a qmorton.
const I_BITS: u64 = 0x5555_5555_5555_5555;
/// Odd bit positions, the `tile_j` half of a qmorton.
const J_BITS: u64 = 0xAAAA_AAAA_AAAA_AAAA;

const fn build_qmorton_lut() -> [u64; 256] {
    let mut lut = [0u64; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut spread = 0u64;
        let mut bit = 0;
        while bit < 8 {
            if byte & (1 << bit) != 0 {
                spread |= 1 << (2 * bit);
            }
            bit += 1;
        }
        lut[byte] = spread;
        byte += 1;
    }
    lut
}

/// Spreads the 8 bits of a byte onto the even bits of a 16-bit word.
pub const QMORTON_LUT: [u64; 256] = build_qmorton_lut();

/// Interleaves a tile column and row into a qmorton.
///
/// `tile_i` lands on the even bits and `tile_j` on the odd bits, one table
/// lookup per byte of each axis.
#[inline]
pub fn tile_ij_to_qmorton(tile_i: u32, tile_j: u32) -> u64 {
    let i = tile_i as usize;
    let j = tile_j as usize;
    QMORTON_LUT[i & 0xff]
        | QMORTON_LUT[j & 0xff] << 1
        | QMORTON_LUT[(i >> 8) & 0xff] << 16
        | QMORTON_LUT[(j >> 8) & 0xff] << 17
        | QMORTON_LUT[(i >> 16) & 0xff] << 32
        | QMORTON_LUT[(j >> 16) & 0xff] << 33
        | QMORTON_LUT[(i >> 24) & 0xff] << 48
        | QMORTON_LUT[(j >> 24) & 0xff] << 49
}

#[inline]
fn compact_even_bits(word: u64) -> u32 {
    let mut x = word & I_BITS;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x >> 16)) & 0x0000_0000_FFFF_FFFF;
    x as u32
}

/// Splits a qmorton back into `(tile_i, tile_j)`.
#[inline]
pub fn qmorton_to_tile_ij(qmorton: u64) -> (u32, u32) {
    (compact_even_bits(qmorton), compact_even_bits(qmorton >> 1))
}

/// The four children of a tile one level finer, in quadord order:
/// north-west, north-east, south-west, south-east.
#[inline]
pub fn qmorton_children(qmorton: u64) -> [u64; 4] {
    let base = qmorton << 2;
    [base, base | 1, base | 2, base | 3]
}

/// Shifts a qmorton by `zl_diff` levels. Positive values zoom in to the
/// top-left descendant, negative values zoom out to the ancestor.
#[inline]
pub fn qmorton_zoom_by(qmorton: u64, zl_diff: i32) -> u64 {
    if zl_diff >= 0 {
        qmorton << (2 * zl_diff as u32)
    } else {
        qmorton >> (2 * zl_diff.unsigned_abs())
    }
}

/// Re-expresses a tile at `zl_target`.
///
/// Coarser targets give the containing ancestor. Finer targets give the
/// top-left descendant.
pub fn qmorton_ancestor(qmorton: u64, zl: u8, zl_target: u8) -> Result<u64> {
    check_qmorton(qmorton, zl)?;
    check_zoom(zl_target)?;
    Ok(qmorton_zoom_by(
        qmorton,
        i32::from(zl_target) - i32::from(zl),
    ))
}

/// Finds the finest tile containing both tiles (given at the same zoom).
///
/// Returns the ancestor qmorton and its zoom level; two tiles in different
/// top-level quadrants share only the world tile at zoom 0.
pub fn smallest_common_ancestor(qmorton_1: u64, qmorton_2: u64, zl: u8) -> Result<(u64, u8)> {
    check_qmorton(qmorton_1, zl)?;
    check_qmorton(qmorton_2, zl)?;

    let diff = qmorton_1 ^ qmorton_2;
    if diff == 0 {
        return Ok((qmorton_1, zl));
    }
    let highest_bit = 63 - diff.leading_zeros();
    let levels_up = (highest_bit / 2 + 1) as u8;
    Ok((qmorton_1 >> (2 * u32::from(levels_up)), zl - levels_up))
}

/// Compass direction for neighbour lookups. North is toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

/// Adjacent tile at the same zoom level, or `None` past the map edge.
///
/// Uses dilated-integer arithmetic on each half of the interleave, so no
/// round trip through `(tile_i, tile_j)` is needed.
pub fn qmorton_neighbor(qmorton: u64, zl: u8, heading: Heading) -> Result<Option<u64>> {
    check_qmorton(qmorton, zl)?;
    Ok(neighbor_step(qmorton, zl, heading))
}

/// [`qmorton_neighbor`] for a key already known to be valid at `zl`.
pub(crate) fn neighbor_step(qmorton: u64, zl: u8, heading: Heading) -> Option<u64> {
    let neighbor = match heading {
        Heading::West => ((qmorton & I_BITS).wrapping_sub(1) & I_BITS) | (qmorton & J_BITS),
        Heading::East => ((qmorton | J_BITS).wrapping_add(1) & I_BITS) | (qmorton & J_BITS),
        Heading::North => ((qmorton & J_BITS).wrapping_sub(1) & J_BITS) | (qmorton & I_BITS),
        Heading::South => ((qmorton | I_BITS).wrapping_add(1) & J_BITS) | (qmorton & I_BITS),
    };
    (neighbor <= max_qmorton(zl)).then_some(neighbor)
}

/// The 3x3 block around a tile in row-major order (north-west first, the
/// tile itself in the middle). Cells off the map are `None`.
pub fn qmorton_neighborhood(qmorton: u64, zl: u8) -> Result<[Option<u64>; 9]> {
    check_qmorton(qmorton, zl)?;
    let north = neighbor_step(qmorton, zl, Heading::North);
    let south = neighbor_step(qmorton, zl, Heading::South);
    let row = |center: Option<u64>| {
        [
            center.and_then(|qm| neighbor_step(qm, zl, Heading::West)),
            center,
            center.and_then(|qm| neighbor_step(qm, zl, Heading::East)),
        ]
    };
    let [nw, n, ne] = row(north);
    let [w, c, e] = row(Some(qmorton));
    let [sw, s, se] = row(south);
    Ok([nw, n, ne, w, c, e, sw, s, se])
}
