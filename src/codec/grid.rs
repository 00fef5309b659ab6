//! Conversions between world coordinates, grid coordinates and tiles.

use geo::{Rect, coord};

use super::{
    check_qmorton, check_tile_ij, check_zoom, map_tile_size, max_tile_idx, qmorton_to_quadstr,
    qmorton_to_tile_ij, smallest_common_ancestor, tile_ij_to_qmorton,
};
use crate::error::{QuadtileError, Result};
use crate::projection::Projection;

#[inline]
fn floor_tile_idx(grid: f64, zl: u8, fudge: f64) -> u32 {
    let size = f64::from(map_tile_size(zl));
    (grid * size + fudge).floor().clamp(0.0, size - 1.0) as u32
}

/// Index of the last tile a far edge at `grid` reaches. An edge lying on a
/// tile boundary belongs to the tile before it.
#[inline]
fn ceil_tile_idx(grid: f64, zl: u8, fudge: f64) -> u32 {
    let size = f64::from(map_tile_size(zl));
    ((grid * size - fudge).ceil() - 1.0).clamp(0.0, size - 1.0) as u32
}

fn check_finite(x: f64, y: f64) -> Result<()> {
    if !(x.is_finite() && y.is_finite()) {
        return Err(QuadtileError::InvalidInput(format!(
            "coordinates must be finite, got ({x}, {y})"
        )));
    }
    Ok(())
}

/// Tile containing a grid coordinate. Out-of-map values clamp to the edge.
pub fn grid_xy_to_tile_ij(grid_x: f64, grid_y: f64, zl: u8) -> Result<(u32, u32)> {
    check_zoom(zl)?;
    check_finite(grid_x, grid_y)?;
    Ok((floor_tile_idx(grid_x, zl, 0.0), floor_tile_idx(grid_y, zl, 0.0)))
}

/// Grid coordinate of a tile's top-left corner.
///
/// Indices up to `2^zl` are accepted so the far edge of the last tile can be
/// addressed.
pub fn tile_ij_to_grid_xy(tile_i: u32, tile_j: u32, zl: u8) -> Result<(f64, f64)> {
    check_zoom(zl)?;
    let size = map_tile_size(zl);
    if tile_i > size || tile_j > size {
        return Err(QuadtileError::TileOutOfRange {
            tile_i: u64::from(tile_i),
            tile_j: u64::from(tile_j),
            zl,
        });
    }
    let size = f64::from(size);
    Ok((f64::from(tile_i) / size, f64::from(tile_j) / size))
}

/// Range of tiles `(i_min, j_min, i_max, j_max)` touched by a grid box.
pub fn grid_box_to_tile_ij_range(
    grid_box: &Rect<f64>,
    zl: u8,
    projection: &Projection,
) -> Result<(u32, u32, u32, u32)> {
    check_zoom(zl)?;
    let (min, max) = (grid_box.min(), grid_box.max());
    check_finite(min.x, min.y)?;
    check_finite(max.x, max.y)?;

    let fudge = projection.edge_fudge_at(zl);
    let i_min = floor_tile_idx(min.x, zl, fudge);
    let j_min = floor_tile_idx(min.y, zl, fudge);
    let i_max = ceil_tile_idx(max.x, zl, fudge).max(i_min);
    let j_max = ceil_tile_idx(max.y, zl, fudge).max(j_min);
    Ok((i_min, j_min, i_max, j_max))
}

/// Tile containing a world coordinate.
///
/// # Examples
///
/// ```rust
/// use quadtile::Projection;
/// use quadtile::codec::world_to_tile_ij;
///
/// let austin = (-97.759003, 30.273884);
/// let tile = world_to_tile_ij(austin.0, austin.1, 16, &Projection::Mercator)?;
/// assert_eq!(tile, (14971, 26980));
/// # Ok::<(), quadtile::QuadtileError>(())
/// ```
pub fn world_to_tile_ij(lng: f64, lat: f64, zl: u8, projection: &Projection) -> Result<(u32, u32)> {
    check_zoom(zl)?;
    check_finite(lng, lat)?;
    let (grid_x, grid_y) = projection.to_grid(lng, lat);
    let fudge = projection.edge_fudge_at(zl);
    Ok((
        floor_tile_idx(grid_x, zl, fudge),
        floor_tile_idx(grid_y, zl, fudge),
    ))
}

pub fn world_to_qmorton(lng: f64, lat: f64, zl: u8, projection: &Projection) -> Result<u64> {
    let (tile_i, tile_j) = world_to_tile_ij(lng, lat, zl, projection)?;
    Ok(tile_ij_to_qmorton(tile_i, tile_j))
}

pub fn world_to_quadstr(lng: f64, lat: f64, zl: u8, projection: &Projection) -> Result<String> {
    qmorton_to_quadstr(world_to_qmorton(lng, lat, zl, projection)?, zl)
}

/// World coordinate of a tile's top-left grid corner.
pub fn tile_ij_to_world(
    tile_i: u32,
    tile_j: u32,
    zl: u8,
    projection: &Projection,
) -> Result<(f64, f64)> {
    let (grid_x, grid_y) = tile_ij_to_grid_xy(tile_i, tile_j, zl)?;
    Ok(projection.to_geo(grid_x, grid_y))
}

pub fn qmorton_to_world(qmorton: u64, zl: u8, projection: &Projection) -> Result<(f64, f64)> {
    check_qmorton(qmorton, zl)?;
    let (tile_i, tile_j) = qmorton_to_tile_ij(qmorton);
    tile_ij_to_world(tile_i, tile_j, zl, projection)
}

/// World bounding box of a tile as a `Rect` (west/south in `min`, east/north
/// in `max` for globe projections).
pub fn tile_ij_to_world_wsen(
    tile_i: u32,
    tile_j: u32,
    zl: u8,
    projection: &Projection,
) -> Result<Rect<f64>> {
    check_tile_ij(tile_i, tile_j, zl)?;
    let (x0, y0) = tile_ij_to_grid_xy(tile_i, tile_j, zl)?;
    let (x1, y1) = tile_ij_to_grid_xy(tile_i + 1, tile_j + 1, zl)?;
    let grid_box = Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 });
    Ok(projection.grid_box_to_geo_box(&grid_box))
}

pub fn qmorton_to_world_wsen(qmorton: u64, zl: u8, projection: &Projection) -> Result<Rect<f64>> {
    check_qmorton(qmorton, zl)?;
    let (tile_i, tile_j) = qmorton_to_tile_ij(qmorton);
    tile_ij_to_world_wsen(tile_i, tile_j, zl, projection)
}

/// World coordinate of the tile's grid centre.
pub fn qmorton_to_tile_center(qmorton: u64, zl: u8, projection: &Projection) -> Result<(f64, f64)> {
    check_qmorton(qmorton, zl)?;
    let (tile_i, tile_j) = qmorton_to_tile_ij(qmorton);
    let size = f64::from(map_tile_size(zl));
    let grid_x = (f64::from(tile_i) + 0.5) / size;
    let grid_y = (f64::from(tile_j) + 0.5) / size;
    Ok(projection.to_geo(grid_x, grid_y))
}

/// Finest tile, no finer than `zl`, whose extent holds the whole box.
///
/// Returns `(qmorton, zoom)`.
pub fn wsen_to_qmorton_zl(wsen: &Rect<f64>, zl: u8, projection: &Projection) -> Result<(u64, u8)> {
    let grid_box = projection.geo_box_to_grid_box(wsen);
    let (i_min, j_min, i_max, j_max) = grid_box_to_tile_ij_range(&grid_box, zl, projection)?;
    debug_assert!(i_max <= max_tile_idx(zl) && j_max <= max_tile_idx(zl));
    smallest_common_ancestor(
        tile_ij_to_qmorton(i_min, j_min),
        tile_ij_to_qmorton(i_max, j_max),
        zl,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::max_qmorton;
    use crate::projection::MIN_MERC_LAT;

    const AUSTIN: (f64, f64) = (-97.759003, 30.273884);

    #[test]
    fn test_grid_to_tile_clamps() {
        assert_eq!(grid_xy_to_tile_ij(0.5, 0.5, 1).unwrap(), (1, 1));
        assert_eq!(grid_xy_to_tile_ij(-0.2, 1.7, 3).unwrap(), (0, 7));
        assert_eq!(grid_xy_to_tile_ij(1.0, 1.0, 3).unwrap(), (7, 7));
        assert!(grid_xy_to_tile_ij(f64::NAN, 0.0, 3).is_err());
        assert!(grid_xy_to_tile_ij(0.0, 0.0, 29).is_err());
    }

    #[test]
    fn test_tile_to_grid_allows_far_edge() {
        assert_eq!(tile_ij_to_grid_xy(8, 8, 3).unwrap(), (1.0, 1.0));
        assert_eq!(tile_ij_to_grid_xy(2, 6, 3).unwrap(), (0.25, 0.75));
        assert!(tile_ij_to_grid_xy(9, 0, 3).is_err());
    }

    #[test]
    fn test_austin_tiles() {
        let merc = Projection::Mercator;
        for &(zl, expected) in &[
            (3u8, (1, 3)),
            (8, (58, 105)),
            (11, (467, 843)),
            (16, (14971, 26980)),
        ] {
            assert_eq!(world_to_tile_ij(AUSTIN.0, AUSTIN.1, zl, &merc).unwrap(), expected);
        }
        assert_eq!(
            world_to_quadstr(AUSTIN.0, AUSTIN.1, 16, &merc).unwrap(),
            "0231301203311211"
        );
        assert_eq!(world_to_qmorton(AUSTIN.0, AUSTIN.1, 16, &merc).unwrap(), 767_966_565);
    }

    #[test]
    fn test_austin_tile_envelope() {
        let wsen = tile_ij_to_world_wsen(14971, 26980, 16, &Projection::Mercator).unwrap();
        assert!((wsen.min().x - -97.7618408203125).abs() < 1e-9);
        assert!((wsen.min().y - 30.273300428069934).abs() < 1e-9);
        assert!((wsen.max().x - -97.75634765625).abs() < 1e-9);
        assert!((wsen.max().y - 30.278044377800153).abs() < 1e-9);
    }

    #[test]
    fn test_end_of_world() {
        let merc = Projection::Mercator;
        let last = (2_097_151, 2_097_151);
        assert_eq!(
            world_to_tile_ij(179.9998285, -85.0511139712, 21, &merc).unwrap(),
            last
        );
        assert_eq!(world_to_tile_ij(180.0, MIN_MERC_LAT, 21, &merc).unwrap(), last);
        assert_eq!(world_to_tile_ij(-180.0, 90.0, 21, &merc).unwrap(), (0, 0));
    }

    #[test]
    fn test_tile_corner_round_trips_into_same_tile() {
        let merc = Projection::Mercator;
        for &(i, j) in &[(14971u32, 26980u32), (0, 0), (32767, 12345)] {
            let (lng, lat) = tile_ij_to_world(i, j, 16, &merc).unwrap();
            assert_eq!(world_to_tile_ij(lng, lat, 16, &merc).unwrap(), (i, j));
        }
    }

    /// Tiles spread over the whole map at `zl`, from a fixed linear
    /// congruential sequence.
    fn scattered_tiles(zl: u8, count: usize) -> Vec<(u32, u32)> {
        let mask = u64::from(max_tile_idx(zl));
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        (0..count)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                let tile_i = (state >> 11) & mask;
                let tile_j = (state >> 37) & mask;
                (tile_i as u32, tile_j as u32)
            })
            .collect()
    }

    #[test]
    fn test_tile_corners_round_trip_at_deep_zooms() {
        for projection in [Projection::Mercator, Projection::Equirectangular] {
            for zl in [16u8, 20, 24, 28] {
                for (i, j) in scattered_tiles(zl, 2000) {
                    let (lng, lat) = tile_ij_to_world(i, j, zl, &projection).unwrap();
                    assert_eq!(
                        world_to_tile_ij(lng, lat, zl, &projection).unwrap(),
                        (i, j),
                        "{projection} zoom {zl}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_tile_envelope_resolves_to_same_tile_at_deep_zooms() {
        let merc = Projection::Mercator;
        for zl in [20u8, 22, 24, 28] {
            for (i, j) in scattered_tiles(zl, 500) {
                let qmorton = tile_ij_to_qmorton(i, j);
                let wsen = qmorton_to_world_wsen(qmorton, zl, &merc).unwrap();
                assert_eq!(wsen_to_qmorton_zl(&wsen, zl, &merc).unwrap(), (qmorton, zl));
            }
        }

        let (qmorton, zl) = crate::codec::quadstr_to_qmorton_zl("0013003221012122220303").unwrap();
        let wsen = qmorton_to_world_wsen(qmorton, zl, &merc).unwrap();
        assert_eq!(wsen_to_qmorton_zl(&wsen, zl, &merc).unwrap(), (qmorton, 22));
    }

    #[test]
    fn test_tile_center_inside_envelope() {
        let merc = Projection::Mercator;
        let (lng, lat) = qmorton_to_tile_center(767_966_565, 16, &merc).unwrap();
        let wsen = qmorton_to_world_wsen(767_966_565, 16, &merc).unwrap();
        assert!(lng > wsen.min().x && lng < wsen.max().x);
        assert!(lat > wsen.min().y && lat < wsen.max().y);
    }

    #[test]
    fn test_wsen_to_qmorton_zl() {
        let linear = Projection::linear(1280.0);
        // exactly one zoom-4 tile (80 units wide)
        let tile = Rect::new(coord! { x: 80.0, y: 0.0 }, coord! { x: 160.0, y: 80.0 });
        assert_eq!(wsen_to_qmorton_zl(&tile, 7, &linear).unwrap(), (1, 4));

        // straddles the centre lines of the map
        let middle = Rect::new(coord! { x: 600.0, y: 600.0 }, coord! { x: 700.0, y: 700.0 });
        assert_eq!(wsen_to_qmorton_zl(&middle, 7, &linear).unwrap(), (0, 0));

        let point = Rect::new(coord! { x: 5.0, y: 5.0 }, coord! { x: 5.0, y: 5.0 });
        assert_eq!(wsen_to_qmorton_zl(&point, 7, &linear).unwrap(), (0, 7));

        let whole = Rect::new(coord! { x: -180.0, y: -85.0 }, coord! { x: 180.0, y: 85.0 });
        let (qmorton, zl) = wsen_to_qmorton_zl(&whole, 12, &Projection::Mercator).unwrap();
        assert_eq!((qmorton, zl), (0, 0));
        assert!(qmorton <= max_qmorton(zl));
    }
}
