//! Distance helpers on a spherical globe and tile covers for circles.
//!
//! Distances are in meters on a sphere of [`GLOBE_RADIUS`]. Boxes are clipped
//! at the poles; a box that would wrap across the antimeridian is widened to
//! the full longitude range so tile covers never miss the wrapped part.

use geo::{Rect, coord};

use crate::codec::{check_zoom, grid_box_to_tile_ij_range};
use crate::error::{QuadtileError, Result};
use crate::projection::{GLOBE_RADIUS, MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG, Projection};
use crate::quadtile::Quadtile;

/// Radius of the circle of latitude at `lat` degrees, in meters.
pub fn radius_of_latitude(lat: f64) -> f64 {
    GLOBE_RADIUS * lat.to_radians().cos()
}

/// Latitude reached by moving `distance_m` meters north (negative for
/// south), capped at the poles.
pub fn lat_north(lat: f64, distance_m: f64) -> f64 {
    (lat + (distance_m / GLOBE_RADIUS).to_degrees()).clamp(MIN_LAT, MAX_LAT)
}

/// Longitude reached by moving `distance_m` meters east along the circle of
/// latitude, wrapped into `[-180, 180)`.
pub fn lng_east(lng: f64, lat: f64, distance_m: f64) -> f64 {
    let radius = radius_of_latitude(lat);
    if radius <= f64::EPSILON {
        return lng;
    }
    let lng = lng + (distance_m / radius).to_degrees();
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Bounding box of a circle of `radius_m` meters around `(lng, lat)`.
pub fn bbox_for_circle(lng: f64, lat: f64, radius_m: f64) -> Result<Rect<f64>> {
    if !(lng.is_finite() && lat.is_finite()) {
        return Err(QuadtileError::InvalidInput(format!(
            "circle centre must be finite, got ({lng}, {lat})"
        )));
    }
    if !(radius_m.is_finite() && radius_m >= 0.0) {
        return Err(QuadtileError::InvalidInput(format!(
            "circle radius must be finite and non-negative, got {radius_m}"
        )));
    }

    let south = lat_north(lat, -radius_m);
    let north = lat_north(lat, radius_m);

    // the poleward edge has the shortest circle of latitude
    let poleward = south.abs().max(north.abs());
    let radius = radius_of_latitude(poleward);
    let (west, east) = if poleward >= MAX_LAT || radius <= f64::EPSILON {
        (MIN_LNG, MAX_LNG)
    } else {
        let delta = (radius_m / radius).to_degrees();
        if lng - delta < MIN_LNG || lng + delta > MAX_LNG {
            (MIN_LNG, MAX_LNG)
        } else {
            (lng - delta, lng + delta)
        }
    };

    Ok(Rect::new(
        coord! { x: west, y: south },
        coord! { x: east, y: north },
    ))
}

/// Every tile at `zl` whose extent touches the box.
pub fn tiles_covering_bbox(
    projection: &Projection,
    wsen: &Rect<f64>,
    zl: u8,
) -> Result<Vec<Quadtile>> {
    check_zoom(zl)?;
    let grid_box = projection.geo_box_to_grid_box(wsen);
    let (i_min, j_min, i_max, j_max) = grid_box_to_tile_ij_range(&grid_box, zl, projection)?;
    Quadtile::tiles_covering_ij_rect(i_min, j_min, i_max, j_max, zl)
}

/// Every tile at `zl` touched by the bounding box of a circle.
pub fn tiles_covering_circle(
    projection: &Projection,
    lng: f64,
    lat: f64,
    radius_m: f64,
    zl: u8,
) -> Result<Vec<Quadtile>> {
    let bbox = bbox_for_circle(lng, lat, radius_m)?;
    let tiles = tiles_covering_bbox(projection, &bbox, zl)?;
    log::debug!(
        "circle ({lng}, {lat}) r={radius_m}m covers {} tiles at zoom {zl}",
        tiles.len()
    );
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::GLOBE_CIRCUM;

    #[test]
    fn test_lat_north_caps_at_poles() {
        let quarter = GLOBE_CIRCUM / 4.0;
        assert!((lat_north(0.0, quarter) - 90.0).abs() < 1e-9);
        assert_eq!(lat_north(80.0, quarter), 90.0);
        assert_eq!(lat_north(-80.0, -quarter), -90.0);
    }

    #[test]
    fn test_lng_east_wraps() {
        let quarter = GLOBE_CIRCUM / 4.0;
        assert!((lng_east(0.0, 0.0, quarter) - 90.0).abs() < 1e-9);
        assert!((lng_east(170.0, 0.0, quarter) - -100.0).abs() < 1e-9);
        assert_eq!(lng_east(12.0, 90.0, 1000.0), 12.0);
    }

    #[test]
    fn test_bbox_for_circle() {
        let bbox = bbox_for_circle(-97.75, 30.27, 1000.0).unwrap();
        assert!(bbox.min().x < -97.75 && bbox.max().x > -97.75);
        assert!(bbox.min().y < 30.27 && bbox.max().y > 30.27);
        let lat_span = bbox.max().y - bbox.min().y;
        assert!((lat_span - 2.0 * (1000.0 / GLOBE_RADIUS).to_degrees()).abs() < 1e-12);
    }

    #[test]
    fn test_bbox_for_circle_wraps_to_full_longitude() {
        let bbox = bbox_for_circle(179.99, 0.0, 10_000.0).unwrap();
        assert_eq!(bbox.min().x, MIN_LNG);
        assert_eq!(bbox.max().x, MAX_LNG);

        let polar = bbox_for_circle(0.0, 89.99, 10_000.0).unwrap();
        assert_eq!(polar.max().y, MAX_LAT);
        assert_eq!((polar.min().x, polar.max().x), (MIN_LNG, MAX_LNG));

        assert!(bbox_for_circle(0.0, 0.0, -1.0).is_err());
        assert!(bbox_for_circle(f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_tiles_covering_circle() {
        let tiles =
            tiles_covering_circle(&Projection::Mercator, -97.759003, 30.273884, 10.0, 16).unwrap();
        assert!(!tiles.is_empty() && tiles.len() <= 4);
        let home = Quadtile::containing_point(-97.759003, 30.273884, 16, &Projection::Mercator)
            .unwrap();
        assert!(tiles.contains(&home));
    }

    #[test]
    fn test_tiles_covering_bbox_whole_world() {
        let world = Rect::new(coord! { x: -180.0, y: -90.0 }, coord! { x: 180.0, y: 90.0 });
        let tiles = tiles_covering_bbox(&Projection::Equirectangular, &world, 2).unwrap();
        assert_eq!(tiles.len(), 16);
    }
}
