use crate::geometry::{Position, Segment, UndirectedSegment};
use crate::osm_parser::CoastlineWay;
use fnv::FnvHashMap;
use geo::{LineString, Point, Polygon};

/// One entry of a ring chain: a node id and its position. The position
/// stays undefined until the location pass has run.
#[derive(Copy, Clone, Debug)]
pub struct RingNode {
    pub id: u64,
    pub position: Position,
}

impl RingNode {
    fn new(id: u64) -> Self {
        Self {
            id,
            position: Position::undefined(),
        }
    }
}

/// A maximal chain of coastline ways. Rings grow by having ways and other
/// rings attached at either end until the two endpoints meet.
#[derive(Debug)]
pub struct CoastlineRing {
    nodes: Vec<RingNode>,
    ring_id: u64,
    nways: u32,
    fixed: bool,
    fake_closed: bool,
    outer: bool,
}

impl CoastlineRing {
    pub fn from_way(way: &CoastlineWay) -> Self {
        Self {
            nodes: way.node_ids.iter().copied().map(RingNode::new).collect(),
            ring_id: *way.node_ids.iter().min().unwrap(),
            nways: 1,
            fixed: false,
            fake_closed: false,
            outer: false,
        }
    }

    /// Smallest node id ever seen in this ring. Merging can only lower it.
    pub fn ring_id(&self) -> u64 {
        self.ring_id
    }

    pub fn nways(&self) -> u32 {
        self.nways
    }

    pub fn npoints(&self) -> usize {
        self.nodes.len()
    }

    pub fn first_node_id(&self) -> u64 {
        self.nodes[0].id
    }

    pub fn last_node_id(&self) -> u64 {
        self.nodes[self.nodes.len() - 1].id
    }

    pub fn first_position(&self) -> Position {
        self.nodes[0].position
    }

    pub fn last_position(&self) -> Position {
        self.nodes[self.nodes.len() - 1].position
    }

    pub fn is_closed(&self) -> bool {
        self.fake_closed || self.first_node_id() == self.last_node_id()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn is_outer(&self) -> bool {
        self.outer
    }

    pub fn set_outer(&mut self) {
        self.outer = true;
    }

    fn update_ring_id(&mut self, candidate: u64) {
        if candidate < self.ring_id {
            self.ring_id = candidate;
        }
    }

    /// Attach a way whose first node is this ring's current last node.
    pub fn add_at_end(&mut self, way: &CoastlineWay) {
        debug_assert_eq!(way.first_node_id(), self.last_node_id());
        self.nodes
            .extend(way.node_ids[1..].iter().copied().map(RingNode::new));
        self.update_ring_id(*way.node_ids.iter().min().unwrap());
        self.nways += 1;
    }

    /// Attach a way whose last node is this ring's current first node.
    pub fn add_at_front(&mut self, way: &CoastlineWay) {
        debug_assert_eq!(way.last_node_id(), self.first_node_id());
        let end = way.node_ids.len() - 1;
        let mut nodes: Vec<RingNode> = way.node_ids[..end]
            .iter()
            .copied()
            .map(RingNode::new)
            .collect();
        nodes.append(&mut self.nodes);
        self.nodes = nodes;
        self.update_ring_id(*way.node_ids.iter().min().unwrap());
        self.nways += 1;
    }

    /// Merge another ring into this one at whichever end connects. The
    /// other ring is consumed and the shared node is kept once.
    pub fn join(&mut self, other: CoastlineRing) {
        if other.first_node_id() == self.last_node_id() {
            self.nodes.extend(other.nodes.into_iter().skip(1));
        } else {
            debug_assert_eq!(other.last_node_id(), self.first_node_id());
            let mut nodes = other.nodes;
            nodes.extend(self.nodes.drain(..).skip(1));
            self.nodes = nodes;
        }
        self.update_ring_id(other.ring_id);
        self.nways += other.nways;
    }

    /// Merge another ring onto the end of this one even though the
    /// endpoints do not share a node.
    pub fn join_over_gap(&mut self, other: CoastlineRing) {
        self.nodes.extend(other.nodes);
        self.update_ring_id(other.ring_id);
        self.nways += other.nways;
        self.fixed = true;
    }

    /// Close the ring onto its own first node.
    pub fn close_ring(&mut self) {
        let first = self.nodes[0];
        self.nodes.push(first);
        self.fixed = true;
    }

    /// Mark a ring closed whose endpoints are distinct nodes at the exact
    /// same position.
    pub fn fake_close(&mut self) {
        self.fake_closed = true;
    }

    pub fn setup_positions(&mut self, posmap: &FnvHashMap<u64, Position>) {
        for node in &mut self.nodes {
            node.position = *posmap
                .get(&node.id)
                .unwrap_or_else(|| panic!("No position for node {}", node.id));
        }
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(self.to_linestring(), vec![])
    }

    pub fn to_linestring(&self) -> LineString<f64> {
        debug_assert!(self.nodes.iter().all(|n| n.position.is_defined()));
        LineString::from(
            self.nodes
                .iter()
                .map(|n| (n.position.lon(), n.position.lat()))
                .collect::<Vec<_>>(),
        )
    }

    pub fn first_point(&self) -> Point<f64> {
        self.first_position().to_point()
    }

    pub fn last_point(&self) -> Point<f64> {
        self.last_position().to_point()
    }

    /// One undirected segment per consecutive node pair.
    pub fn add_segments_to(&self, segments: &mut Vec<UndirectedSegment>) {
        for pair in self.nodes.windows(2) {
            segments.push(
                Segment::new(pair[0].position, pair[1].position, pair[0].id, pair[1].id).into(),
            );
        }
    }
}
