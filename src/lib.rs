//! Hierarchical quadtree tile index with sortable keys, shape decomposition,
//! and a streaming spatial join.
//!
//! ```rust
//! use quadtile::prelude::*;
//!
//! let tile = Quadtile::containing_point(-97.759003, 30.273884, 16, &Projection::Mercator)?;
//! assert_eq!(tile.quadstr(), "0231301203311211");
//! assert_eq!(tile.tile_ij(), (14971, 26980));
//!
//! let parent = tile.ancestor(3)?;
//! assert_eq!(parent.to_string(), "023");
//! assert!(parent.contains(&tile));
//! # Ok::<(), quadtile::QuadtileError>(())
//! ```

pub mod codec;
pub mod config;
pub mod decompose;
pub mod error;
pub mod geometry;
pub mod globe;
pub mod handle;
pub mod join;
pub mod projection;
pub mod quadtile;

pub use config::TilingConfig;
pub use decompose::{DecomposedTile, Decomposer, decompose, sort_by_quadord};
pub use error::{QuadtileError, Result};
pub use geometry::TileGeometry;
pub use handle::{HandleKind, TileHandle};
pub use join::{
    JoinRecord, JoinStats, JoinedPair, Source, SpatialJoin, SweepJoin, SweepStack,
    sort_for_join, spatial_join,
};
pub use projection::Projection;
pub use quadtile::Quadtile;

pub use codec::{Heading, MAX_ZOOM_LEVEL};

pub use geo::{Geometry, Point, Polygon, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{QuadtileError, Result};

    pub use crate::{Heading, Projection, Quadtile, TilingConfig};

    pub use crate::{DecomposedTile, Decomposer, TileGeometry, decompose};

    pub use crate::{JoinRecord, JoinedPair, Source, SpatialJoin, spatial_join};

    pub use geo::{Geometry, Point, Polygon, Rect};
}
