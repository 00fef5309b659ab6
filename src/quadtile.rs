//! The `Quadtile` value: one tile of the quadtree.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use geo::{Rect, coord};
use serde::{Deserialize, Serialize};

use crate::codec::{
    self, MAX_ZOOM_LEVEL, check_qmorton, check_tile_ij, pack_quadord, qmorton_children,
    qmorton_to_tile_ij, quadord_contains, quadord_to_qmorton_zl, quadstr_to_qmorton_zl,
    render_quadstr, tile_ij_to_qmorton,
};
use crate::error::{QuadtileError, Result};
use crate::projection::Projection;

/// An immutable quadtree tile, identified by qmorton and zoom level.
///
/// Tiles order by their quadord, so a sorted list of tiles is a pre-order
/// walk of the tree: every tile comes right before its descendants.
///
/// # Examples
///
/// ```rust
/// use quadtile::{Projection, Quadtile};
///
/// let tile: Quadtile = "023".parse()?;
/// assert_eq!(tile.tile_ij(), (1, 3));
/// assert_eq!(tile.parent()?.to_string(), "02");
///
/// let austin = Quadtile::containing_point(-97.759003, 30.273884, 3, &Projection::Mercator)?;
/// assert_eq!(austin, tile);
/// # Ok::<(), quadtile::QuadtileError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quadtile {
    qmorton: u64,
    zl: u8,
}

impl Quadtile {
    /// The zoom-0 tile covering the whole map.
    pub const WORLD: Quadtile = Quadtile { qmorton: 0, zl: 0 };

    pub fn new(qmorton: u64, zl: u8) -> Result<Self> {
        check_qmorton(qmorton, zl)?;
        Ok(Self { qmorton, zl })
    }

    pub fn from_tile_ij(tile_i: u32, tile_j: u32, zl: u8) -> Result<Self> {
        check_tile_ij(tile_i, tile_j, zl)?;
        Ok(Self {
            qmorton: tile_ij_to_qmorton(tile_i, tile_j),
            zl,
        })
    }

    pub fn from_quadord(quadord: u64) -> Result<Self> {
        let (qmorton, zl) = quadord_to_qmorton_zl(quadord)?;
        Ok(Self { qmorton, zl })
    }

    pub fn from_quadstr(quadstr: &str) -> Result<Self> {
        let (qmorton, zl) = quadstr_to_qmorton_zl(quadstr)?;
        Ok(Self { qmorton, zl })
    }

    /// Tile at `zl` holding a world coordinate.
    pub fn containing_point(lng: f64, lat: f64, zl: u8, projection: &Projection) -> Result<Self> {
        let qmorton = codec::world_to_qmorton(lng, lat, zl, projection)?;
        Ok(Self { qmorton, zl })
    }

    /// Finest tile, at zoom `zl` or coarser, whose extent holds all of `wsen`.
    pub fn containing_rect(wsen: &Rect<f64>, zl: u8, projection: &Projection) -> Result<Self> {
        let (qmorton, zl) = codec::wsen_to_qmorton_zl(wsen, zl, projection)?;
        Ok(Self { qmorton, zl })
    }

    #[inline]
    pub fn qmorton(&self) -> u64 {
        self.qmorton
    }

    #[inline]
    pub fn zoom_level(&self) -> u8 {
        self.zl
    }

    #[inline]
    pub fn quadord(&self) -> u64 {
        pack_quadord(self.qmorton, self.zl)
    }

    pub fn quadstr(&self) -> String {
        render_quadstr(self.qmorton, self.zl)
    }

    #[inline]
    pub fn tile_ij(&self) -> (u32, u32) {
        qmorton_to_tile_ij(self.qmorton)
    }

    /// World bounding box of this tile.
    pub fn envelope(&self, projection: &Projection) -> Rect<f64> {
        let (tile_i, tile_j) = self.tile_ij();
        let size = f64::from(codec::map_tile_size(self.zl));
        let grid_box = Rect::new(
            coord! { x: f64::from(tile_i) / size, y: f64::from(tile_j) / size },
            coord! { x: f64::from(tile_i + 1) / size, y: f64::from(tile_j + 1) / size },
        );
        projection.grid_box_to_geo_box(&grid_box)
    }

    /// World coordinate of the tile's grid centre.
    pub fn center(&self, projection: &Projection) -> (f64, f64) {
        let (tile_i, tile_j) = self.tile_ij();
        let size = f64::from(codec::map_tile_size(self.zl));
        projection.to_geo(
            (f64::from(tile_i) + 0.5) / size,
            (f64::from(tile_j) + 0.5) / size,
        )
    }

    /// The four children in quadord order (NW, NE, SW, SE).
    pub fn children(&self) -> Result<[Quadtile; 4]> {
        if self.zl >= MAX_ZOOM_LEVEL {
            return Err(QuadtileError::InvalidZoom(u32::from(self.zl) + 1));
        }
        let zl = self.zl + 1;
        Ok(qmorton_children(self.qmorton).map(|qmorton| Quadtile { qmorton, zl }))
    }

    pub fn parent(&self) -> Result<Quadtile> {
        if self.zl == 0 {
            return Err(QuadtileError::InvalidInput(
                "the world tile has no parent".to_string(),
            ));
        }
        self.ancestor(self.zl - 1)
    }

    /// The containing tile at a coarser (or equal) zoom level.
    pub fn ancestor(&self, zl: u8) -> Result<Quadtile> {
        if zl > self.zl {
            return Err(QuadtileError::ZoomMismatch {
                qmorton: self.qmorton,
                zl,
            });
        }
        Ok(Quadtile {
            qmorton: self.qmorton >> (2 * u32::from(self.zl - zl)),
            zl,
        })
    }

    /// True when `other` is this tile or one of its descendants.
    #[inline]
    pub fn contains(&self, other: &Quadtile) -> bool {
        quadord_contains(self.quadord(), other.quadord())
    }

    /// Adjacent tile at the same zoom, `None` past the map edge.
    pub fn neighbor(&self, heading: codec::Heading) -> Option<Quadtile> {
        codec::neighbor_step(self.qmorton, self.zl, heading).map(|qmorton| Quadtile {
            qmorton,
            zl: self.zl,
        })
    }

    /// Every tile at `zl` inside the inclusive tile index rectangle, in
    /// row-major order.
    pub fn tiles_covering_ij_rect(
        i_min: u32,
        j_min: u32,
        i_max: u32,
        j_max: u32,
        zl: u8,
    ) -> Result<Vec<Quadtile>> {
        check_tile_ij(i_max, j_max, zl)?;
        if i_min > i_max || j_min > j_max {
            return Err(QuadtileError::InvalidInput(format!(
                "empty tile range ({i_min}, {j_min})..=({i_max}, {j_max})"
            )));
        }
        let mut tiles =
            Vec::with_capacity(((i_max - i_min + 1) as usize) * ((j_max - j_min + 1) as usize));
        for tile_j in j_min..=j_max {
            for tile_i in i_min..=i_max {
                tiles.push(Quadtile {
                    qmorton: tile_ij_to_qmorton(tile_i, tile_j),
                    zl,
                });
            }
        }
        Ok(tiles)
    }
}

impl Ord for Quadtile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.quadord().cmp(&other.quadord())
    }
}

impl PartialOrd for Quadtile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Quadtile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.quadstr())
    }
}

impl FromStr for Quadtile {
    type Err = QuadtileError;

    fn from_str(quadstr: &str) -> Result<Self> {
        Quadtile::from_quadstr(quadstr)
    }
}

impl TryFrom<String> for Quadtile {
    type Error = QuadtileError;

    fn try_from(quadstr: String) -> Result<Self> {
        Quadtile::from_quadstr(&quadstr)
    }
}

impl From<Quadtile> for String {
    fn from(tile: Quadtile) -> Self {
        tile.quadstr()
    }
}
