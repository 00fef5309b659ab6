//! Recursive decomposition of a shape into quadtree tiles.
//!
//! A shape is covered by a set of tiles between two zoom levels: interior
//! regions are emitted as soon as a tile lies completely inside the shape
//! (but never coarser than `zl_coarse`), edges are followed down to
//! `zl_fine`. Every emitted tile carries the part of the shape inside it.
//!
//! ```rust
//! use geo::{Geometry, polygon};
//! use quadtile::{Projection, decompose::decompose};
//!
//! let square = Geometry::Polygon(polygon![
//!     (x: 40.0, y: 40.0),
//!     (x: 40.0, y: 120.0),
//!     (x: 120.0, y: 120.0),
//!     (x: 120.0, y: 40.0),
//!     (x: 40.0, y: 40.0),
//! ]);
//! let tiles = decompose(&square, 4, 7, Projection::linear(1280.0))?;
//! let mut names: Vec<String> = tiles.iter().map(|t| t.tile.to_string()).collect();
//! names.sort();
//! assert_eq!(names, vec!["00003", "00012", "00021", "00030"]);
//! # Ok::<(), quadtile::QuadtileError>(())
//! ```

use crate::codec::check_zoom;
use crate::config::TilingConfig;
use crate::error::{QuadtileError, Result};
use crate::geometry::TileGeometry;
use crate::projection::Projection;
use crate::quadtile::Quadtile;

/// One tile of a decomposition and the part of the shape inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecomposedTile<G> {
    pub tile: Quadtile,
    pub geometry: G,
}

impl<G> DecomposedTile<G> {
    #[inline]
    pub fn quadord(&self) -> u64 {
        self.tile.quadord()
    }
}

/// Splits shapes into tiles between two zoom levels under one projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposer {
    projection: Projection,
    zl_coarse: u8,
    zl_fine: u8,
}

#[derive(Debug, Default)]
struct DecomposeStats {
    visited: usize,
    interior: usize,
}

impl Decomposer {
    pub fn new(projection: Projection, zl_coarse: u8, zl_fine: u8) -> Result<Self> {
        check_zoom(zl_coarse)?;
        check_zoom(zl_fine)?;
        if zl_coarse > zl_fine {
            return Err(QuadtileError::InvalidZoomRange {
                coarse: zl_coarse,
                fine: zl_fine,
            });
        }
        projection.validate()?;
        Ok(Self {
            projection,
            zl_coarse,
            zl_fine,
        })
    }

    pub fn from_config(config: &TilingConfig) -> Result<Self> {
        config.validate().map_err(QuadtileError::InvalidConfig)?;
        Self::new(config.projection, config.zl_coarse, config.zl_fine)
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn zl_coarse(&self) -> u8 {
        self.zl_coarse
    }

    pub fn zl_fine(&self) -> u8 {
        self.zl_fine
    }

    /// Finest tile, no finer than `zl_fine`, whose extent holds the shape's
    /// bounding box. `None` for an empty shape.
    pub fn start_tile<G: TileGeometry>(&self, shape: &G) -> Result<Option<Quadtile>> {
        if shape.is_empty() {
            return Ok(None);
        }
        match shape.query_envelope() {
            Some(envelope) => {
                Quadtile::containing_rect(&envelope, self.zl_fine, &self.projection).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Covers `shape` with tiles, in pre-order.
    ///
    /// The tiles cover the whole shape, each one touches the shape, and no
    /// tile contains another.
    pub fn decompose<G: TileGeometry>(&self, shape: &G) -> Result<Vec<DecomposedTile<G>>> {
        match self.start_tile(shape)? {
            Some(start) => self.decompose_from(shape, start),
            None => Ok(Vec::new()),
        }
    }

    /// Covers the part of `shape` inside `start` with tiles, in pre-order.
    pub fn decompose_from<G: TileGeometry>(
        &self,
        shape: &G,
        start: Quadtile,
    ) -> Result<Vec<DecomposedTile<G>>> {
        let mut tiles = Vec::new();
        let mut stats = DecomposeStats::default();
        self.add_tiles_on(shape, None, start, &mut tiles, &mut stats)?;
        log::debug!(
            "decomposed from tile '{start}' at zoom {}..={}: {} tiles ({} interior), {} visited",
            self.zl_coarse,
            self.zl_fine,
            tiles.len(),
            stats.interior,
            stats.visited,
        );
        Ok(tiles)
    }

    /// Clips the carried geometry to `tile` and either emits the tile or
    /// descends into its children.
    ///
    /// `carried` is the shape already clipped to the parent tile; `None`
    /// means the shape itself. The interior test runs against the unclipped
    /// shape, which is equivalent since the tile lies inside its parent.
    fn add_tiles_on<G: TileGeometry>(
        &self,
        shape: &G,
        carried: Option<&G>,
        tile: Quadtile,
        out: &mut Vec<DecomposedTile<G>>,
        stats: &mut DecomposeStats,
    ) -> Result<()> {
        stats.visited += 1;
        let envelope = tile.envelope(&self.projection);
        let on_tile = carried.unwrap_or(shape).intersect_envelope(&envelope);
        if on_tile.is_empty() {
            log::trace!("tile '{tile}' misses the shape");
            return Ok(());
        }

        let zl = tile.zoom_level();
        if zl >= self.zl_fine {
            log::trace!("tile '{tile}' reached the fine zoom level");
            out.push(DecomposedTile {
                tile,
                geometry: on_tile,
            });
            return Ok(());
        }
        if zl >= self.zl_coarse && shape.envelope_within(&envelope) {
            log::trace!("tile '{tile}' lies inside the shape");
            stats.interior += 1;
            out.push(DecomposedTile {
                tile,
                geometry: on_tile,
            });
            return Ok(());
        }

        for child in tile.children()? {
            self.add_tiles_on(shape, Some(&on_tile), child, out, stats)?;
        }
        Ok(())
    }
}

/// Decomposes `shape` into tiles between `zl_coarse` and `zl_fine`.
pub fn decompose<G: TileGeometry>(
    shape: &G,
    zl_coarse: u8,
    zl_fine: u8,
    projection: Projection,
) -> Result<Vec<DecomposedTile<G>>> {
    Decomposer::new(projection, zl_coarse, zl_fine)?.decompose(shape)
}

/// Sorts decomposed tiles by quadord, the order the spatial join expects.
pub fn sort_by_quadord<G>(tiles: &mut [DecomposedTile<G>]) {
    tiles.sort_by_key(DecomposedTile::quadord);
}
