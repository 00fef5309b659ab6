//! Streaming spatial join of two quadord-sorted tile streams.
//!
//! Both inputs are decomposed into tiles, merged and sorted by quadord (ties
//! broken by source, see [`sort_for_join`]). Sorted quadords walk the
//! quadtree in pre-order, so the tiles that can overlap the current one are
//! exactly its ancestors and itself. Each source keeps those on a
//! [`SweepStack`]; memory is bounded by the tree depth rather than the input
//! size.
//!
//! Input order is not checked. An unsorted stream silently produces missing
//! pairs.
//!
//! ```rust
//! use quadtile::join::{JoinRecord, Source, spatial_join};
//! use quadtile::Quadtile;
//!
//! let record = |quadstr: &str, source, id| {
//!     let tile: Quadtile = quadstr.parse().unwrap();
//!     JoinRecord::new(tile.quadord(), source, id, ())
//! };
//! let mut records = vec![
//!     record("00", Source::A, "a0"),
//!     record("01", Source::A, "a1"),
//!     record("10", Source::A, "a2"),
//!     record("01", Source::B, "b0"),
//!     record("02", Source::B, "b1"),
//! ];
//! quadtile::join::sort_for_join(&mut records);
//!
//! let pairs = spatial_join(records);
//! assert_eq!(pairs.len(), 1);
//! assert_eq!((pairs[0].id_a, pairs[0].id_b), ("a1", "b0"));
//! ```

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::codec::quadord_contains;
use crate::decompose::DecomposedTile;

/// Inline capacity of a sweep stack: one entry per zoom level 0..=28 fits
/// without spilling to the heap.
const SWEEP_STACK_INLINE: usize = 32;

/// Which of the two joined inputs a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    A,
    B,
}

impl Source {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Source::A => 0,
            Source::B => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Source {
        match self {
            Source::A => Source::B,
            Source::B => Source::A,
        }
    }
}

/// One tile of one shape, tagged with its input and the shape's id.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRecord<I, G> {
    pub quadord: u64,
    pub source: Source,
    pub id: I,
    pub geometry: G,
}

impl<I, G> JoinRecord<I, G> {
    pub fn new(quadord: u64, source: Source, id: I, geometry: G) -> Self {
        Self {
            quadord,
            source,
            id,
            geometry,
        }
    }

    pub fn from_decomposed(source: Source, id: I, tile: DecomposedTile<G>) -> Self {
        Self {
            quadord: tile.tile.quadord(),
            source,
            id,
            geometry: tile.geometry,
        }
    }

    /// Key the join input must be sorted by.
    #[inline]
    pub fn sort_key(&self) -> (u64, Source) {
        (self.quadord, self.source)
    }
}

/// Two records from opposite inputs whose tiles overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPair<I, G> {
    pub id_a: I,
    pub id_b: I,
    pub geometry_a: G,
    pub geometry_b: G,
}

/// Sorts records into join order: by quadord, then source. The sort is
/// stable, so records with equal keys keep their relative order.
pub fn sort_for_join<I, G>(records: &mut [JoinRecord<I, G>]) {
    records.sort_by_key(JoinRecord::sort_key);
}

/// The chain of records from one input whose tiles contain the current
/// sweep position.
#[derive(Debug, Clone)]
pub struct SweepStack<I, G> {
    entries: SmallVec<[JoinRecord<I, G>; SWEEP_STACK_INLINE]>,
}

impl<I, G> SweepStack<I, G> {
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Pops entries whose tile does not contain `quadord`. Returns how many
    /// were dropped.
    pub fn flush(&mut self, quadord: u64) -> usize {
        let mut dropped = 0;
        while let Some(top) = self.entries.last() {
            if quadord_contains(top.quadord, quadord) {
                break;
            }
            self.entries.pop();
            dropped += 1;
        }
        dropped
    }

    pub fn push(&mut self, record: JoinRecord<I, G>) {
        self.entries.push(record);
    }

    pub fn top(&self) -> Option<&JoinRecord<I, G>> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JoinRecord<I, G>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<I, G> Default for SweepStack<I, G> {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for one join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub records: usize,
    pub pairs: usize,
    /// Deepest combined size of both stacks.
    pub max_depth: usize,
}

/// Incremental sweep state for one join. Feed records in join order.
#[derive(Debug, Clone)]
pub struct SweepJoin<I, G> {
    stacks: [SweepStack<I, G>; 2],
    stats: JoinStats,
}

impl<I: Clone, G: Clone> SweepJoin<I, G> {
    pub fn new() -> Self {
        Self {
            stacks: [SweepStack::new(), SweepStack::new()],
            stats: JoinStats::default(),
        }
    }

    /// Advances the sweep to `record` and emits its pairs into `out`.
    ///
    /// Both stacks drop tiles that do not contain the record's tile; the
    /// record then pairs with everything left on the opposite stack and is
    /// pushed onto its own.
    pub fn sweep_and_match<E>(&mut self, record: JoinRecord<I, G>, out: &mut E)
    where
        E: Extend<JoinedPair<I, G>>,
    {
        for stack in &mut self.stacks {
            stack.flush(record.quadord);
        }

        let partners = &self.stacks[record.source.opposite().index()];
        let matched = partners.len();
        out.extend(partners.iter().map(|partner| pair_up(&record, partner)));

        self.stacks[record.source.index()].push(record);

        self.stats.records += 1;
        self.stats.pairs += matched;
        let depth = self.stacks[0].len() + self.stacks[1].len();
        self.stats.max_depth = self.stats.max_depth.max(depth);
    }

    pub fn stack(&self, source: Source) -> &SweepStack<I, G> {
        &self.stacks[source.index()]
    }

    pub fn stats(&self) -> JoinStats {
        self.stats
    }

    /// Clears both stacks and counters for another join.
    pub fn reset(&mut self) {
        for stack in &mut self.stacks {
            stack.clear();
        }
        self.stats = JoinStats::default();
    }
}

impl<I: Clone, G: Clone> Default for SweepJoin<I, G> {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_up<I: Clone, G: Clone>(
    record: &JoinRecord<I, G>,
    partner: &JoinRecord<I, G>,
) -> JoinedPair<I, G> {
    let (a, b) = match record.source {
        Source::A => (record, partner),
        Source::B => (partner, record),
    };
    JoinedPair {
        id_a: a.id.clone(),
        id_b: b.id.clone(),
        geometry_a: a.geometry.clone(),
        geometry_b: b.geometry.clone(),
    }
}

/// Lazy join over a sorted record stream.
pub struct SpatialJoin<It, I, G>
where
    It: Iterator<Item = JoinRecord<I, G>>,
{
    records: It,
    sweep: SweepJoin<I, G>,
    pending: VecDeque<JoinedPair<I, G>>,
    finished: bool,
}

impl<It, I, G> SpatialJoin<It, I, G>
where
    It: Iterator<Item = JoinRecord<I, G>>,
    I: Clone,
    G: Clone,
{
    pub fn new(records: It) -> Self {
        Self {
            records,
            sweep: SweepJoin::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    pub fn stats(&self) -> JoinStats {
        self.sweep.stats()
    }
}

impl<It, I, G> Iterator for SpatialJoin<It, I, G>
where
    It: Iterator<Item = JoinRecord<I, G>>,
    I: Clone,
    G: Clone,
{
    type Item = JoinedPair<I, G>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.pending.pop_front() {
                return Some(pair);
            }
            if self.finished {
                return None;
            }
            match self.records.next() {
                Some(record) => self.sweep.sweep_and_match(record, &mut self.pending),
                None => {
                    self.finished = true;
                    let stats = self.sweep.stats();
                    log::debug!(
                        "spatial join: {} records, {} pairs, max stack depth {}",
                        stats.records,
                        stats.pairs,
                        stats.max_depth
                    );
                }
            }
        }
    }
}

/// Joins a sorted record stream and collects every pair.
pub fn spatial_join<R, I, G>(records: R) -> Vec<JoinedPair<I, G>>
where
    R: IntoIterator<Item = JoinRecord<I, G>>,
    I: Clone,
    G: Clone,
{
    SpatialJoin::new(records.into_iter()).collect()
}
