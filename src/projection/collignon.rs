//! Polar Collignon: a whole-globe, equal-area square map.
//!
//! The globe is cut into four 90° wedges of longitude centred on -135°, -45°,
//! 45° and 135°. Each northern wedge is a Collignon triangle with its apex on
//! the north pole at the grid centre and its base on the equator, which runs
//! as a diamond through the edge midpoints of the unit square. The southern
//! half of each wedge is the same triangle folded outward across the equator,
//! so the south pole lands on the four corners of the square.
//!
//! Within a wedge, a point is placed by two coordinates: `a`, its distance
//! from the centre along the wedge's axis (0 at the north pole, 1 on the
//! equator, 2 at the south pole), and `b`, its offset across the axis.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, SQRT_2};

use geo::{Rect, coord};

use super::{MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG};

/// Central meridian of each wedge, west to east.
const WEDGE_CENTERS: [f64; 4] = [-135.0, -45.0, 45.0, 135.0];

/// Per-wedge axis `d` (toward the south pole corner) and cross axis `t`
/// (toward increasing longitude), as `(dx, dy, tx, ty)` in grid units.
const WEDGE_AXES: [(f64, f64, f64, f64); 4] = [
    (-1.0, -1.0, -1.0, 1.0),
    (-1.0, 1.0, 1.0, 1.0),
    (1.0, 1.0, 1.0, -1.0),
    (1.0, -1.0, -1.0, -1.0),
];

/// Below this polar distance a point is treated as sitting on a pole.
const POLE_EPSILON: f64 = 1e-12;

/// `sqrt(1 - sin(phi))` for `phi` in radians, written to stay accurate near
/// the north pole.
#[inline]
fn polar_distance(phi: f64) -> f64 {
    SQRT_2 * (FRAC_PI_4 - phi / 2.0).sin()
}

#[inline]
fn latitude_from_polar_distance(s: f64) -> f64 {
    FRAC_PI_2 - 2.0 * (s / SQRT_2).clamp(-1.0, 1.0).asin()
}

/// Collignon projection of `(lambda, phi)` in radians.
///
/// The equator spans `x ∈ [-2√π, 2√π]` at `y = √π`; the north pole sits at
/// the origin.
pub fn collignon_raw(lambda: f64, phi: f64) -> (f64, f64) {
    let s = polar_distance(phi);
    let sqrt_pi = PI.sqrt();
    (2.0 / sqrt_pi * lambda * s, sqrt_pi * (1.0 - s))
}

/// Inverse of [`collignon_raw`], returning `(lambda, phi)` in radians.
pub fn collignon_raw_inverse(x: f64, y: f64) -> (f64, f64) {
    let sqrt_pi = PI.sqrt();
    let s = 1.0 - y / sqrt_pi;
    let phi = latitude_from_polar_distance(s);
    let lambda = if s.abs() > POLE_EPSILON {
        x * sqrt_pi / (2.0 * s)
    } else {
        0.0
    };
    (lambda, phi)
}

#[inline]
fn wedge_for_lng(lng: f64) -> usize {
    (((lng + 180.0) / 90.0).floor() as i64).clamp(0, 3) as usize
}

#[inline]
fn wedge_for_grid(grid_x: f64, grid_y: f64) -> usize {
    match (grid_x >= 0.5, grid_y >= 0.5) {
        (false, false) => 0,
        (false, true) => 1,
        (true, true) => 2,
        (true, false) => 3,
    }
}

fn forward_in_wedge(wedge: usize, lng: f64, lat: f64) -> (f64, f64) {
    let s = polar_distance(lat.abs().to_radians());
    let b = s * (lng - WEDGE_CENTERS[wedge]) / 45.0;
    let a = if lat >= 0.0 { s } else { 2.0 - s };
    let (dx, dy, tx, ty) = WEDGE_AXES[wedge];
    (0.5 + 0.25 * (a * dx + b * tx), 0.5 + 0.25 * (a * dy + b * ty))
}

/// Inverts a grid point assuming it lies in `wedge`.
///
/// Returns `(lng, lat, s)` where `s` is the polar distance; `s` near zero
/// means the point is on a pole and its longitude is arbitrary.
fn inverse_in_wedge(wedge: usize, grid_x: f64, grid_y: f64) -> (f64, f64, f64) {
    let (dx, dy, tx, ty) = WEDGE_AXES[wedge];
    let (rx, ry) = (grid_x - 0.5, grid_y - 0.5);
    let a = 2.0 * (rx * dx + ry * dy);
    let b = 2.0 * (rx * tx + ry * ty);

    let (s, north) = if a <= 1.0 {
        (a.max(0.0), true)
    } else {
        ((2.0 - a).max(0.0), false)
    };
    let phi = latitude_from_polar_distance(s).to_degrees();
    let lat = if north { phi } else { -phi };
    let offset = if s > POLE_EPSILON {
        (b / s * 45.0).clamp(-45.0, 45.0)
    } else {
        0.0
    };
    (WEDGE_CENTERS[wedge] + offset, lat, s)
}

pub(super) fn forward(lng: f64, lat: f64) -> (f64, f64) {
    let lng = lng.clamp(MIN_LNG, MAX_LNG);
    let lat = lat.clamp(MIN_LAT, MAX_LAT);
    forward_in_wedge(wedge_for_lng(lng), lng, lat)
}

pub(super) fn inverse(grid_x: f64, grid_y: f64) -> (f64, f64) {
    let x = grid_x.clamp(0.0, 1.0);
    let y = grid_y.clamp(0.0, 1.0);
    let (lng, lat, _) = inverse_in_wedge(wedge_for_grid(x, y), x, y);
    (lng, lat)
}

/// Running min/max over a set of points.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn extend(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn into_rect(self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
    }
}

/// Grid-space ranges of the quadrant holding each wedge.
fn wedge_quadrant(wedge: usize) -> ((f64, f64), (f64, f64)) {
    let x_range = if wedge >= 2 { (0.5, 1.0) } else { (0.0, 0.5) };
    let y_range = if wedge == 1 || wedge == 2 {
        (0.5, 1.0)
    } else {
        (0.0, 0.5)
    };
    (x_range, y_range)
}

/// Geographic bounds of a grid box.
///
/// The box is split along the quadrant lines. Within one wedge, latitude is
/// monotone along the wedge axis and longitude is a ratio of linear terms on
/// each side of the equator, so the extremes sit on the corners of each
/// piece or where its edges cross the equator. A piece touching a pole spans
/// the full longitude range of its wedge.
pub(super) fn grid_box_to_geo_box(grid_box: &Rect<f64>) -> Rect<f64> {
    let x0 = grid_box.min().x.clamp(0.0, 1.0);
    let y0 = grid_box.min().y.clamp(0.0, 1.0);
    let x1 = grid_box.max().x.clamp(0.0, 1.0);
    let y1 = grid_box.max().y.clamp(0.0, 1.0);

    let mut extent = Extent::empty();
    for wedge in 0..4 {
        let ((qx0, qx1), (qy0, qy1)) = wedge_quadrant(wedge);
        let (px0, px1) = (x0.max(qx0), x1.min(qx1));
        let (py0, py1) = (y0.max(qy0), y1.min(qy1));
        if px0 > px1 || py0 > py1 {
            continue;
        }

        let (dx, dy, _, _) = WEDGE_AXES[wedge];
        let mut samples = vec![(px0, py0), (px0, py1), (px1, py0), (px1, py1)];
        // equator: rx * dx + ry * dy = 0.5
        for y in [py0, py1] {
            let x = 0.5 + dx * (0.5 - (y - 0.5) * dy);
            if (px0..=px1).contains(&x) {
                samples.push((x, y));
            }
        }
        for x in [px0, px1] {
            let y = 0.5 + dy * (0.5 - (x - 0.5) * dx);
            if (py0..=py1).contains(&y) {
                samples.push((x, y));
            }
        }

        for (x, y) in samples {
            let (lng, lat, s) = inverse_in_wedge(wedge, x, y);
            if s <= POLE_EPSILON {
                let center = WEDGE_CENTERS[wedge];
                extent.extend(center - 45.0, lat);
                extent.extend(center + 45.0, lat);
            } else {
                extent.extend(lng, lat);
            }
        }
    }
    extent.into_rect()
}

/// Grid bounds of a geographic box.
///
/// Within one wedge and one hemisphere the map is bilinear in polar distance
/// and longitude, so the corners of each piece bound its image.
pub(super) fn geo_box_to_grid_box(geo_box: &Rect<f64>) -> Rect<f64> {
    let west = geo_box.min().x.clamp(MIN_LNG, MAX_LNG);
    let east = geo_box.max().x.clamp(MIN_LNG, MAX_LNG);
    let south = geo_box.min().y.clamp(MIN_LAT, MAX_LAT);
    let north = geo_box.max().y.clamp(MIN_LAT, MAX_LAT);

    let lat_pieces: &[(f64, f64)] = if south < 0.0 && north > 0.0 {
        &[(south, 0.0), (0.0, north)]
    } else {
        &[(south, north)]
    };

    let mut extent = Extent::empty();
    for (wedge, center) in WEDGE_CENTERS.iter().enumerate() {
        let w = west.max(center - 45.0);
        let e = east.min(center + 45.0);
        if w > e {
            continue;
        }
        for &(lat_lo, lat_hi) in lat_pieces {
            for lng in [w, e] {
                for lat in [lat_lo, lat_hi] {
                    let (x, y) = forward_in_wedge(wedge, lng, lat);
                    extent.extend(x, y);
                }
            }
        }
    }
    extent.into_rect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lng_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_landmarks() {
        let (x, y) = forward(0.0, 90.0);
        assert!((x - 0.5).abs() < 1e-12 && (y - 0.5).abs() < 1e-12);

        // south pole on a corner
        let (x, y) = forward(-135.0, -90.0);
        assert!(x.abs() < 1e-12 && y.abs() < 1e-12);
        let (x, y) = forward(45.0, -90.0);
        assert!((x - 1.0).abs() < 1e-12 && (y - 1.0).abs() < 1e-12);

        // equator meets the edge midpoints at wedge boundaries
        let (x, y) = forward(0.0, 0.0);
        assert!((x - 0.5).abs() < 1e-12 && (y - 1.0).abs() < 1e-12);
        let (x, y) = forward(90.0, 0.0);
        assert!((x - 1.0).abs() < 1e-12 && (y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_grid() {
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lng = -180.0;
            while lng <= 180.0 {
                let (x, y) = forward(lng, lat);
                assert!((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y));
                let (lng2, lat2) = inverse(x, y);
                assert!((lat - lat2).abs() < 1e-7, "lat {lat} -> {lat2}");
                if lat.abs() < 90.0 {
                    assert!(lng_diff(lng, lng2) < 1e-7, "({lng}, {lat}) -> {lng2}");
                }
                lng += 8.95;
            }
            lat += 8.95;
        }
    }

    #[test]
    fn test_round_trip_near_poles_and_seam() {
        for &(lng, lat) in &[
            (180.0, 45.0),
            (-180.0, -45.0),
            (179.999_999, 89.999_9),
            (-90.0, -89.999_9),
            (0.0, -0.000_001),
        ] {
            let (x, y) = forward(lng, lat);
            let (lng2, lat2) = inverse(x, y);
            assert!((lat - lat2).abs() < 1e-7);
            assert!(lng_diff(lng, lng2) < 1e-6, "({lng}, {lat}) -> {lng2}");
        }
    }

    #[test]
    fn test_equal_area_hemispheres() {
        // northern hemisphere is the central diamond: half of the square
        let (_, lat) = inverse(0.75, 0.75);
        assert!((lat - 0.0).abs() < 1e-9);
        let (_, lat) = inverse(0.5, 0.5);
        assert!((lat - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_raw_round_trip() {
        for &(lambda, phi) in &[(0.3, 0.2), (-0.7, -1.1), (0.0, 1.5)] {
            let (x, y) = collignon_raw(lambda, phi);
            let (lambda2, phi2) = collignon_raw_inverse(x, y);
            assert!((lambda - lambda2).abs() < 1e-12);
            assert!((phi - phi2).abs() < 1e-12);
        }
        let (x, y) = collignon_raw(1.0, FRAC_PI_2);
        assert!(x.abs() < 1e-12 && y.abs() < 1e-12);
    }

    #[test]
    fn test_whole_grid_is_whole_globe() {
        let world = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let geo = grid_box_to_geo_box(&world);
        assert!((geo.min().x + 180.0).abs() < 1e-9 && (geo.max().x - 180.0).abs() < 1e-9);
        assert!((geo.min().y + 90.0).abs() < 1e-9 && (geo.max().y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_quadrant_box_is_one_wedge() {
        // south-east quadrant holds the wedge centred on 45°
        let quadrant = Rect::new(coord! { x: 0.5, y: 0.5 }, coord! { x: 1.0, y: 1.0 });
        let geo = grid_box_to_geo_box(&quadrant);
        assert!(geo.min().x <= 0.0 + 1e-9 && geo.max().x >= 90.0 - 1e-9);
        assert!((geo.max().y - 90.0).abs() < 1e-9);
        assert!((geo.min().y + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_geo_box_covers_forward_points() {
        let geo = Rect::new(coord! { x: -100.0, y: -20.0 }, coord! { x: 30.0, y: 60.0 });
        let grid = geo_box_to_grid_box(&geo);
        let mut lng = -100.0;
        while lng <= 30.0 {
            let mut lat = -20.0;
            while lat <= 60.0 {
                let (x, y) = forward(lng, lat);
                assert!(x >= grid.min().x - 1e-12 && x <= grid.max().x + 1e-12);
                assert!(y >= grid.min().y - 1e-12 && y <= grid.max().y + 1e-12);
                lat += 5.0;
            }
            lng += 5.0;
        }
    }

    #[test]
    fn test_grid_box_covers_inverse_points() {
        let grid = Rect::new(coord! { x: 0.6, y: 0.1 }, coord! { x: 0.9, y: 0.45 });
        let geo = grid_box_to_geo_box(&grid);
        for step_x in 0..=10 {
            for step_y in 0..=10 {
                let x = 0.6 + 0.03 * f64::from(step_x);
                let y = 0.1 + 0.035 * f64::from(step_y);
                let (lng, lat) = inverse(x, y);
                assert!(lng >= geo.min().x - 1e-9 && lng <= geo.max().x + 1e-9);
                assert!(lat >= geo.min().y - 1e-9 && lat <= geo.max().y + 1e-9);
            }
        }
    }
}
