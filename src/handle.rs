//! Interchangeable ways of naming a tile.
//!
//! A [`TileHandle`] is any one of the tile representations used across the
//! crate. Every handle converts into a [`Quadtile`], and a `Quadtile` renders
//! back into any [`HandleKind`], so a handle of one kind can be converted to
//! any other through [`TileHandle::convert`].
//!
//! The one exception is a [`HandleKind::Wsen`] box under a projection whose
//! grid does not follow longitude and latitude
//! ([`Projection::is_rectilinear`]). There the box only bounds the tile, so
//! resolving it is refused rather than answered with a coarser tile.

use std::fmt;
use std::str::FromStr;

use geo::Rect;

use crate::codec::{grid_xy_to_tile_ij, map_tile_size};
use crate::error::{QuadtileError, Result};
use crate::projection::Projection;
use crate::quadtile::Quadtile;

/// The representation a [`TileHandle`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    QmortonZl,
    Quadstr,
    Quadord,
    TileIjZl,
    GridXy,
    LngLat,
    Wsen,
}

impl HandleKind {
    pub const ALL: [HandleKind; 7] = [
        HandleKind::QmortonZl,
        HandleKind::Quadstr,
        HandleKind::Quadord,
        HandleKind::TileIjZl,
        HandleKind::GridXy,
        HandleKind::LngLat,
        HandleKind::Wsen,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HandleKind::QmortonZl => "qmorton_zl",
            HandleKind::Quadstr => "quadstr",
            HandleKind::Quadord => "quadord",
            HandleKind::TileIjZl => "tile_ij_zl",
            HandleKind::GridXy => "grid_xy",
            HandleKind::LngLat => "lng_lat",
            HandleKind::Wsen => "wsen",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HandleKind {
    type Err = QuadtileError;

    fn from_str(name: &str) -> Result<Self> {
        let key = name.trim().to_ascii_lowercase();
        HandleKind::ALL
            .into_iter()
            .find(|kind| kind.name() == key)
            .ok_or_else(|| QuadtileError::InvalidInput(format!("unknown tile handle kind '{name}'")))
    }
}

/// A tile named in one of several representations.
///
/// Point-like handles (`GridXy`, `LngLat`) name the tile containing the
/// point; rendering a tile into them gives its top-left corner. `Wsen` names
/// the finest tile holding the box; rendering gives the tile envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum TileHandle {
    QmortonZl { qmorton: u64, zl: u8 },
    Quadstr(String),
    Quadord(u64),
    TileIjZl { tile_i: u32, tile_j: u32, zl: u8 },
    GridXy { grid_x: f64, grid_y: f64, zl: u8 },
    LngLat { lng: f64, lat: f64, zl: u8 },
    Wsen { wsen: Rect<f64>, zl: u8 },
}

impl TileHandle {
    pub fn kind(&self) -> HandleKind {
        match self {
            TileHandle::QmortonZl { .. } => HandleKind::QmortonZl,
            TileHandle::Quadstr(_) => HandleKind::Quadstr,
            TileHandle::Quadord(_) => HandleKind::Quadord,
            TileHandle::TileIjZl { .. } => HandleKind::TileIjZl,
            TileHandle::GridXy { .. } => HandleKind::GridXy,
            TileHandle::LngLat { .. } => HandleKind::LngLat,
            TileHandle::Wsen { .. } => HandleKind::Wsen,
        }
    }

    /// Resolves the handle to the tile it names.
    pub fn to_quadtile(&self, projection: &Projection) -> Result<Quadtile> {
        match self {
            TileHandle::QmortonZl { qmorton, zl } => Quadtile::new(*qmorton, *zl),
            TileHandle::Quadstr(quadstr) => Quadtile::from_quadstr(quadstr),
            TileHandle::Quadord(quadord) => Quadtile::from_quadord(*quadord),
            TileHandle::TileIjZl { tile_i, tile_j, zl } => {
                Quadtile::from_tile_ij(*tile_i, *tile_j, *zl)
            }
            TileHandle::GridXy { grid_x, grid_y, zl } => {
                let (tile_i, tile_j) = grid_xy_to_tile_ij(*grid_x, *grid_y, *zl)?;
                Quadtile::from_tile_ij(tile_i, tile_j, *zl)
            }
            TileHandle::LngLat { lng, lat, zl } => {
                Quadtile::containing_point(*lng, *lat, *zl, projection)
            }
            TileHandle::Wsen { wsen, zl } => {
                if !projection.is_rectilinear() {
                    return Err(QuadtileError::InvalidInput(format!(
                        "a wsen box does not name a single tile under {projection}"
                    )));
                }
                Quadtile::containing_rect(wsen, *zl, projection)
            }
        }
    }

    /// Renders a tile as a handle of the given kind.
    pub fn from_quadtile(tile: Quadtile, kind: HandleKind, projection: &Projection) -> Self {
        let zl = tile.zoom_level();
        match kind {
            HandleKind::QmortonZl => TileHandle::QmortonZl {
                qmorton: tile.qmorton(),
                zl,
            },
            HandleKind::Quadstr => TileHandle::Quadstr(tile.quadstr()),
            HandleKind::Quadord => TileHandle::Quadord(tile.quadord()),
            HandleKind::TileIjZl => {
                let (tile_i, tile_j) = tile.tile_ij();
                TileHandle::TileIjZl { tile_i, tile_j, zl }
            }
            HandleKind::GridXy => {
                let (tile_i, tile_j) = tile.tile_ij();
                let size = f64::from(map_tile_size(zl));
                TileHandle::GridXy {
                    grid_x: f64::from(tile_i) / size,
                    grid_y: f64::from(tile_j) / size,
                    zl,
                }
            }
            HandleKind::LngLat => {
                let (tile_i, tile_j) = tile.tile_ij();
                let size = f64::from(map_tile_size(zl));
                let (lng, lat) =
                    projection.to_geo(f64::from(tile_i) / size, f64::from(tile_j) / size);
                TileHandle::LngLat { lng, lat, zl }
            }
            HandleKind::Wsen => TileHandle::Wsen {
                wsen: tile.envelope(projection),
                zl,
            },
        }
    }

    /// Converts this handle into another representation of the same tile.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadtile::{HandleKind, Projection, TileHandle};
    ///
    /// let handle = TileHandle::Quadstr("023".to_string());
    /// let ij = handle.convert(HandleKind::TileIjZl, &Projection::Mercator)?;
    /// assert_eq!(ij, TileHandle::TileIjZl { tile_i: 1, tile_j: 3, zl: 3 });
    /// # Ok::<(), quadtile::QuadtileError>(())
    /// ```
    pub fn convert(&self, kind: HandleKind, projection: &Projection) -> Result<TileHandle> {
        let tile = self.to_quadtile(projection)?;
        Ok(TileHandle::from_quadtile(tile, kind, projection))
    }
}

impl From<Quadtile> for TileHandle {
    fn from(tile: Quadtile) -> Self {
        TileHandle::QmortonZl {
            qmorton: tile.qmorton(),
            zl: tile.zoom_level(),
        }
    }
}
