use geo_types::Rect;
use rstar::{RTree, RTreeObject, AABB};

/// R-tree entry: one feature's envelope keyed by its position in the source
/// collection. Positions stay valid even when domain identifiers repeat.
#[derive(Debug, Clone, PartialEq)]
struct BoundsEntry {
    pos: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BoundsEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn to_aabb(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Spatial index over feature bounding rectangles.
///
/// Queries return candidate positions whose envelopes intersect the query
/// rectangle; callers still run the exact geometric predicate on the
/// candidates. Result order is not meaningful.
#[derive(Debug, Default)]
pub struct BoundsIndex {
    tree: RTree<BoundsEntry>,
}

impl BoundsIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load an index from `(position, bounds)` pairs.
    pub fn from_bounds<I>(bounds: I) -> Self
    where
        I: IntoIterator<Item = (usize, Rect<f64>)>,
    {
        let entries: Vec<BoundsEntry> = bounds
            .into_iter()
            .map(|(pos, rect)| BoundsEntry { pos, envelope: to_aabb(&rect) })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn insert(&mut self, pos: usize, bounds: Rect<f64>) {
        self.tree.insert(BoundsEntry { pos, envelope: to_aabb(&bounds) });
    }

    /// Positions of all entries whose envelope intersects `query`. Envelope
    /// intersection includes shared edges and corners.
    pub fn query(&self, query: &Rect<f64>) -> Vec<usize> {
        self.tree
            .locate_in_envelope_intersecting(&to_aabb(query))
            .map(|entry| entry.pos)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
