//! Map projections between geographic coordinates and the unit tile grid.
//!
//! Every projection maps world coordinates onto grid coordinates where the
//! whole map spans `[0, 1] x [0, 1]` with `y` growing southward (for the
//! globe projections). Tile indices are obtained by scaling the grid by
//! `2^zl`, see [`crate::codec`].

mod collignon;

pub use collignon::{collignon_raw, collignon_raw_inverse};

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use geo::{Rect, coord};
use serde::{Deserialize, Serialize};

use crate::error::{QuadtileError, Result};

pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Southern limit of the square Web Mercator map.
pub const MIN_MERC_LAT: f64 = -85.05112878;
/// Northern limit of the square Web Mercator map.
pub const MAX_MERC_LAT: f64 = 85.05112878;

/// Equatorial radius in meters (WGS84).
pub const GLOBE_RADIUS: f64 = 6_378_137.0;
pub const GLOBE_CIRCUM: f64 = 2.0 * PI * GLOBE_RADIUS;

/// Tile-unit nudge applied when a world coordinate is assigned to a tile.
///
/// Keeps a tile corner that went through `to_geo` and back inside the tile
/// it came from.
pub const EDGE_FUDGE: f64 = 1e-10;

/// Grid-unit floor of the nudge. A `to_geo`/`to_grid` round trip drifts by a
/// few ulps of the grid coordinate, which at deep zooms is many tile units
/// wider than [`EDGE_FUDGE`].
pub const GRID_EDGE_FUDGE: f64 = 1e-12;

/// A projection from world coordinates onto the unit tile grid.
///
/// Projections are plain values; the same one must be used for encoding and
/// decoding a given dataset. Serialized as its name, for example
/// `"mercator"` or `"linear_1280"`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Projection {
    /// Grid coordinates are world coordinates.
    Identity,
    /// Grid coordinates are world coordinates divided by `scale`. No axis flip.
    Linear { scale: f64 },
    /// Plate carrée: longitude and latitude scaled linearly, north on top.
    Equirectangular,
    /// Web Mercator, clipped to ±85.05112878° latitude.
    #[default]
    Mercator,
    /// Whole-globe equal-area projection with the north pole at the grid
    /// centre and the south pole folded out to the four corners.
    PolarCollignon,
}

impl Projection {
    pub const fn linear(scale: f64) -> Self {
        Projection::Linear { scale }
    }

    /// Name this projection is looked up and serialized by.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// True for projections whose world coordinates are longitude/latitude.
    pub fn is_globe(&self) -> bool {
        matches!(
            self,
            Projection::Equirectangular | Projection::Mercator | Projection::PolarCollignon
        )
    }

    /// Nudge, in tile units, applied before flooring a grid coordinate.
    pub fn edge_fudge(&self) -> f64 {
        if self.is_globe() { EDGE_FUDGE } else { 0.0 }
    }

    /// [`Projection::edge_fudge`] widened to outlast round-trip error at `zl`.
    pub fn edge_fudge_at(&self, zl: u8) -> f64 {
        if self.is_globe() {
            let size = (1u64 << zl.min(63)) as f64;
            EDGE_FUDGE.max(GRID_EDGE_FUDGE * size)
        } else {
            0.0
        }
    }

    /// True when the grid axes follow longitude and latitude, so a tile's
    /// world bounding box is exactly the tile.
    pub fn is_rectilinear(&self) -> bool {
        !matches!(self, Projection::PolarCollignon)
    }

    pub fn validate(&self) -> Result<()> {
        if let Projection::Linear { scale } = self
            && !(scale.is_finite() && *scale > 0.0)
        {
            return Err(QuadtileError::InvalidInput(format!(
                "linear projection scale must be finite and positive, got {scale}"
            )));
        }
        Ok(())
    }

    /// Projects a world coordinate onto the grid.
    ///
    /// Globe projections clamp inputs to their valid domain first.
    pub fn to_grid(&self, lng: f64, lat: f64) -> (f64, f64) {
        match *self {
            Projection::Identity => (lng, lat),
            Projection::Linear { scale } => (lng / scale, lat / scale),
            Projection::Equirectangular => {
                let lng = lng.clamp(MIN_LNG, MAX_LNG);
                let lat = lat.clamp(MIN_LAT, MAX_LAT);
                ((lng + 180.0) / 360.0, (90.0 - lat) / 180.0)
            }
            Projection::Mercator => {
                let lng = lng.clamp(MIN_LNG, MAX_LNG);
                let lat = lat.clamp(MIN_MERC_LAT, MAX_MERC_LAT);
                let y = (1.0 - ((90.0 + lat) * PI / 360.0).tan().ln() / PI) / 2.0;
                ((lng + 180.0) / 360.0, y)
            }
            Projection::PolarCollignon => collignon::forward(lng, lat),
        }
    }

    /// Inverse of [`Projection::to_grid`].
    pub fn to_geo(&self, grid_x: f64, grid_y: f64) -> (f64, f64) {
        match *self {
            Projection::Identity => (grid_x, grid_y),
            Projection::Linear { scale } => (grid_x * scale, grid_y * scale),
            Projection::Equirectangular => {
                let x = grid_x.clamp(0.0, 1.0);
                let y = grid_y.clamp(0.0, 1.0);
                (x * 360.0 - 180.0, 90.0 - y * 180.0)
            }
            Projection::Mercator => {
                let x = grid_x.clamp(0.0, 1.0);
                let y = grid_y.clamp(0.0, 1.0);
                let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
                (x * 360.0 - 180.0, lat)
            }
            Projection::PolarCollignon => collignon::inverse(grid_x, grid_y),
        }
    }

    /// World-coordinate bounding box of a grid-space box.
    pub fn grid_box_to_geo_box(&self, grid_box: &Rect<f64>) -> Rect<f64> {
        match self {
            Projection::PolarCollignon => collignon::grid_box_to_geo_box(grid_box),
            _ => {
                let (west, north) = self.to_geo(grid_box.min().x, grid_box.min().y);
                let (east, south) = self.to_geo(grid_box.max().x, grid_box.max().y);
                Rect::new(coord! { x: west, y: south }, coord! { x: east, y: north })
            }
        }
    }

    /// Grid-space bounding box of a world-coordinate box.
    pub fn geo_box_to_grid_box(&self, geo_box: &Rect<f64>) -> Rect<f64> {
        match self {
            Projection::PolarCollignon => collignon::geo_box_to_grid_box(geo_box),
            _ => {
                let (x_min, y_a) = self.to_grid(geo_box.min().x, geo_box.min().y);
                let (x_max, y_b) = self.to_grid(geo_box.max().x, geo_box.max().y);
                Rect::new(coord! { x: x_min, y: y_a }, coord! { x: x_max, y: y_b })
            }
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Identity => write!(f, "identity"),
            Projection::Linear { scale } => write!(f, "linear_{scale}"),
            Projection::Equirectangular => write!(f, "equirectangular"),
            Projection::Mercator => write!(f, "mercator"),
            Projection::PolarCollignon => write!(f, "polar_collignon"),
        }
    }
}

impl FromStr for Projection {
    type Err = QuadtileError;

    /// Looks a projection up by name, ignoring case.
    ///
    /// Linear projections carry their scale: `linear_1280` or `linear:1280`.
    fn from_str(name: &str) -> Result<Self> {
        let key = name.trim().to_ascii_lowercase();
        let projection = match key.as_str() {
            "identity" => Projection::Identity,
            "linear" => Projection::Linear { scale: 1.0 },
            "equirectangular" => Projection::Equirectangular,
            "mercator" => Projection::Mercator,
            "polar_collignon" | "polarcollignon" => Projection::PolarCollignon,
            other => {
                let scale = other
                    .strip_prefix("linear_")
                    .or_else(|| other.strip_prefix("linear:"))
                    .and_then(|scale| scale.parse::<f64>().ok())
                    .ok_or_else(|| QuadtileError::UnknownProjection(name.to_string()))?;
                Projection::Linear { scale }
            }
        };
        projection.validate()?;
        Ok(projection)
    }
}

impl TryFrom<String> for Projection {
    type Error = QuadtileError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<Projection> for String {
    fn from(projection: Projection) -> Self {
        projection.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(projection: Projection, lng: f64, lat: f64, tolerance: f64) {
        let (x, y) = projection.to_grid(lng, lat);
        let (lng2, lat2) = projection.to_geo(x, y);
        assert!(
            (lng - lng2).abs() <= tolerance && (lat - lat2).abs() <= tolerance,
            "{projection}: ({lng}, {lat}) came back as ({lng2}, {lat2})"
        );
    }

    #[test]
    fn test_identity_and_linear() {
        assert_eq!(Projection::Identity.to_grid(3.5, -2.0), (3.5, -2.0));
        let linear = Projection::linear(1280.0);
        assert_eq!(linear.to_grid(640.0, 320.0), (0.5, 0.25));
        assert_eq!(linear.to_geo(0.5, 0.25), (640.0, 320.0));
    }

    #[test]
    fn test_equirectangular_corners() {
        let proj = Projection::Equirectangular;
        assert_eq!(proj.to_grid(-180.0, 90.0), (0.0, 0.0));
        assert_eq!(proj.to_grid(180.0, -90.0), (1.0, 1.0));
        assert_eq!(proj.to_grid(0.0, 0.0), (0.5, 0.5));
    }

    #[test]
    fn test_mercator_known_points() {
        let proj = Projection::Mercator;
        let (x, y) = proj.to_grid(0.0, 0.0);
        assert!((x - 0.5).abs() < 1e-15 && (y - 0.5).abs() < 1e-15);
        let (_, top) = proj.to_grid(0.0, MAX_MERC_LAT);
        assert!(top.abs() < 1e-8);
        let (_, bottom) = proj.to_grid(0.0, -89.0);
        assert!((bottom - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_mercator_round_trip() {
        let proj = Projection::Mercator;
        let mut lat = -84.9;
        while lat < 85.0 {
            let mut lng = -180.0;
            while lng <= 180.0 {
                assert_round_trip(proj, lng, lat, 1e-9);
                lng += 7.3;
            }
            lat += 2.9;
        }
    }

    #[test]
    fn test_equirectangular_round_trip() {
        for &(lng, lat) in &[(-180.0, -90.0), (12.5, 45.25), (179.99, 89.99), (0.0, 0.0)] {
            assert_round_trip(Projection::Equirectangular, lng, lat, 1e-9);
        }
    }

    #[test]
    fn test_grid_box_to_geo_box_flips_globe() {
        let proj = Projection::Mercator;
        let grid = Rect::new(coord! { x: 0.5, y: 0.0 }, coord! { x: 1.0, y: 0.5 });
        let geo = proj.grid_box_to_geo_box(&grid);
        assert!((geo.min().x - 0.0).abs() < 1e-12);
        assert!((geo.max().x - 180.0).abs() < 1e-12);
        assert!(geo.min().y.abs() < 1e-12);
        assert!((geo.max().y - MAX_MERC_LAT).abs() < 1e-6);

        let back = proj.geo_box_to_grid_box(&geo);
        assert!((back.min().y - 0.0).abs() < 1e-8);
        assert!((back.max().y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("mercator".parse::<Projection>().unwrap(), Projection::Mercator);
        assert_eq!("Identity".parse::<Projection>().unwrap(), Projection::Identity);
        assert_eq!(
            "linear_1280".parse::<Projection>().unwrap(),
            Projection::linear(1280.0)
        );
        assert_eq!(
            "linear:0.5".parse::<Projection>().unwrap(),
            Projection::linear(0.5)
        );
        assert_eq!(
            "polar_collignon".parse::<Projection>().unwrap(),
            Projection::PolarCollignon
        );
        assert!(matches!(
            "cool_hat".parse::<Projection>(),
            Err(QuadtileError::UnknownProjection(_))
        ));
        assert!("linear_0".parse::<Projection>().is_err());
        assert!("linear_abc".parse::<Projection>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for proj in [
            Projection::Identity,
            Projection::linear(1280.0),
            Projection::Equirectangular,
            Projection::Mercator,
            Projection::PolarCollignon,
        ] {
            assert_eq!(proj.to_string().parse::<Projection>().unwrap(), proj);
        }
    }

    #[test]
    fn test_serde_as_name() {
        let json = serde_json::to_string(&Projection::linear(1280.0)).unwrap();
        assert_eq!(json, "\"linear_1280\"");
        let proj: Projection = serde_json::from_str("\"polar_collignon\"").unwrap();
        assert_eq!(proj, Projection::PolarCollignon);
        assert!(serde_json::from_str::<Projection>("\"cool_hat\"").is_err());
    }

    #[test]
    fn test_edge_fudge() {
        assert_eq!(Projection::Mercator.edge_fudge(), EDGE_FUDGE);
        assert_eq!(Projection::linear(10.0).edge_fudge(), 0.0);
        assert_eq!(Projection::Mercator.edge_fudge_at(0), EDGE_FUDGE);
        assert_eq!(Projection::Mercator.edge_fudge_at(28), GRID_EDGE_FUDGE * 268_435_456.0);
        assert_eq!(Projection::Identity.edge_fudge_at(28), 0.0);
    }

    #[test]
    fn test_rectilinear_projections() {
        assert!(Projection::Mercator.is_rectilinear());
        assert!(Projection::linear(10.0).is_rectilinear());
        assert!(!Projection::PolarCollignon.is_rectilinear());
    }
}
