//! quadstr: the base-4 text form of a qmorton.

use super::{
    MAX_ZOOM_LEVEL, check_qmorton, check_tile_ij, smallest_common_ancestor, tile_ij_to_qmorton,
};
use crate::error::{QuadtileError, Result};

/// Renders a qmorton as exactly `zl` base-4 digits, zero padded.
///
/// The world tile at zoom 0 is the empty string.
pub fn qmorton_to_quadstr(qmorton: u64, zl: u8) -> Result<String> {
    check_qmorton(qmorton, zl)?;
    Ok(render_quadstr(qmorton, zl))
}

pub(crate) fn render_quadstr(qmorton: u64, zl: u8) -> String {
    let mut quadstr = String::with_capacity(usize::from(zl));
    for level in (0..u32::from(zl)).rev() {
        let digit = ((qmorton >> (2 * level)) & 0b11) as u8;
        quadstr.push(char::from(b'0' + digit));
    }
    quadstr
}

/// Quadstr of the tile at `(tile_i, tile_j)`.
pub fn tile_ij_to_quadstr(tile_i: u32, tile_j: u32, zl: u8) -> Result<String> {
    check_tile_ij(tile_i, tile_j, zl)?;
    qmorton_to_quadstr(tile_ij_to_qmorton(tile_i, tile_j), zl)
}

/// Removes embedded spaces and any trailing run of non-digit characters.
///
/// Sorted outputs append a sentinel such as `"*"` after the digits so that a
/// tile sorts after its descendants; stripping makes those keys decodable.
pub fn strip_quadstr(quadstr: &str) -> String {
    quadstr
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .filter(|&c| c != ' ')
        .collect()
}

/// Parses a quadstr into `(qmorton, zl)`. Zoom is the number of digits.
///
/// # Examples
///
/// ```rust
/// use quadtile::codec::quadstr_to_qmorton_zl;
///
/// assert_eq!(quadstr_to_qmorton_zl("3")?, (3, 1));
/// assert_eq!(quadstr_to_qmorton_zl("0123 *")?, (0b00_01_10_11, 4));
/// assert_eq!(quadstr_to_qmorton_zl("")?, (0, 0));
/// assert!(quadstr_to_qmorton_zl("0124").is_err());
/// # Ok::<(), quadtile::QuadtileError>(())
/// ```
pub fn quadstr_to_qmorton_zl(quadstr: &str) -> Result<(u64, u8)> {
    let digits = strip_quadstr(quadstr);
    if digits.len() > usize::from(MAX_ZOOM_LEVEL) {
        return Err(QuadtileError::invalid_quadstr(
            quadstr,
            format!("{} digits exceeds zoom level {MAX_ZOOM_LEVEL}", digits.len()),
        ));
    }

    let mut qmorton = 0u64;
    for byte in digits.bytes() {
        let digit = match byte {
            b'0'..=b'3' => u64::from(byte - b'0'),
            other => {
                return Err(QuadtileError::invalid_quadstr(
                    quadstr,
                    format!("'{}' is not a base-4 digit", char::from(other)),
                ));
            }
        };
        qmorton = (qmorton << 2) | digit;
    }
    Ok((qmorton, digits.len() as u8))
}

pub fn quadstr_to_qmorton(quadstr: &str) -> Result<u64> {
    quadstr_to_qmorton_zl(quadstr).map(|(qmorton, _)| qmorton)
}

/// Zoom level of a quadstr, after stripping.
pub fn quadstr_zl(quadstr: &str) -> Result<u8> {
    quadstr_to_qmorton_zl(quadstr).map(|(_, zl)| zl)
}

/// Quadstr of the finest tile containing two same-zoom tiles.
pub fn smallest_containing_quadstr(quadstr_1: &str, quadstr_2: &str) -> Result<String> {
    let (qmorton_1, zl_1) = quadstr_to_qmorton_zl(quadstr_1)?;
    let (qmorton_2, zl_2) = quadstr_to_qmorton_zl(quadstr_2)?;
    if zl_1 != zl_2 {
        return Err(QuadtileError::ZoomMismatch {
            qmorton: qmorton_2,
            zl: zl_1,
        });
    }
    let (ancestor, zl) = smallest_common_ancestor(qmorton_1, qmorton_2, zl_1)?;
    qmorton_to_quadstr(ancestor, zl)
}
