//! The live set of coastline rings and everything that operates on it:
//! incremental stitching of arriving ways, the segment sweep that finds
//! intersections and overlaps, the gap closer, and the passes that emit
//! the finished rings.

use crate::coastline_ring::CoastlineRing;
use crate::geometry::{
    intersection, outside_x_range, y_range_overlap, Position, Segment, UndirectedSegment,
};
use crate::osm_parser::CoastlineWay;
use crate::output::OutputDatabase;
use crate::validity;
use fnv::FnvHashMap;
use geo::Polygon;

/// Inner rings bigger than this are presumably lakes and not worth a
/// warning.
const MAX_NODES_TO_BE_CONSIDERED_QUESTIONABLE: usize = 1000;

/// Opaque handle of a ring slot. Handles stay stable while rings merge;
/// a slot is emptied when its ring is absorbed into another one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct RingHandle(usize);

/// A candidate merge of two open ring endpoints, found by the gap closer.
#[derive(Debug)]
struct Connection {
    distance: f64,
    end_node: u64,
    start_node: u64,
}

#[derive(Default)]
pub struct RingCollection {
    rings: Vec<Option<CoastlineRing>>,

    /// First node id of every open ring -> the ring.
    start_nodes: FnvHashMap<u64, RingHandle>,

    /// Last node id of every open ring -> the ring.
    end_nodes: FnvHashMap<u64, RingHandle>,

    ways: u64,
    rings_from_single_way: u64,
    fixed_rings: u64,
}

impl RingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_ways(&self) -> u64 {
        self.ways
    }

    pub fn num_rings(&self) -> usize {
        self.rings.iter().flatten().count()
    }

    pub fn num_rings_from_single_way(&self) -> u64 {
        self.rings_from_single_way
    }

    pub fn num_fixed_rings(&self) -> u64 {
        self.fixed_rings
    }

    pub fn num_unconnected_nodes(&self) -> usize {
        self.end_nodes.len()
    }

    fn ring(&self, handle: RingHandle) -> &CoastlineRing {
        self.rings[handle.0].as_ref().expect("stale ring handle")
    }

    fn ring_mut(&mut self, handle: RingHandle) -> &mut CoastlineRing {
        self.rings[handle.0].as_mut().expect("stale ring handle")
    }

    fn insert(&mut self, ring: CoastlineRing) -> RingHandle {
        self.rings.push(Some(ring));
        RingHandle(self.rings.len() - 1)
    }

    /// Takes one way from the input stream. Self-closed ways become a
    /// complete ring on their own, everything else is stitched onto the
    /// open rings.
    pub fn add_way(&mut self, way: &CoastlineWay) {
        self.ways += 1;
        if way.is_closed() {
            self.rings_from_single_way += 1;
            self.insert(CoastlineRing::from_way(way));
        } else {
            self.add_partial_ring(way);
        }
    }

    /// Stitching: look the way's endpoints up in the two endpoint
    /// indexes and attach it to whatever ring it continues. When it
    /// bridges two rings those are merged into one.
    fn add_partial_ring(&mut self, way: &CoastlineWay) {
        let first = way.first_node_id();
        let last = way.last_node_id();
        let prev = self.end_nodes.get(&first).copied();
        let next = self.start_nodes.get(&last).copied();

        match (prev, next) {
            // No ring to attach to: open a new one.
            (None, None) => {
                let handle = self.insert(CoastlineRing::from_way(way));
                self.start_nodes.insert(first, handle);
                self.end_nodes.insert(last, handle);
            }

            // A ring ends where the way starts: append, and if the way
            // also runs into the start of a second ring, merge the two.
            (Some(prev), next) => {
                self.end_nodes.remove(&first);
                let ring = self.rings[prev.0].as_mut().expect("stale ring handle");
                ring.add_at_end(way);
                if ring.is_closed() {
                    let ring_first = ring.first_node_id();
                    self.start_nodes.remove(&ring_first);
                    return;
                }
                match next {
                    Some(next) if next != prev => {
                        self.start_nodes.remove(&last);
                        let absorbed = self.rings[next.0].take().expect("stale ring handle");
                        let ring = self.rings[prev.0].as_mut().expect("stale ring handle");
                        ring.join(absorbed);
                        if ring.is_closed() {
                            let ring_first = ring.first_node_id();
                            let ring_last = ring.last_node_id();
                            self.start_nodes.remove(&ring_first);
                            self.end_nodes.remove(&ring_last);
                        } else {
                            let ring_last = ring.last_node_id();
                            self.end_nodes.insert(ring_last, prev);
                        }
                    }
                    _ => {
                        self.end_nodes.insert(last, prev);
                    }
                }
            }

            // A ring starts where the way ends: prepend.
            (None, Some(next)) => {
                self.start_nodes.remove(&last);
                let ring = self.rings[next.0].as_mut().expect("stale ring handle");
                ring.add_at_front(way);
                if ring.is_closed() {
                    let ring_last = ring.last_node_id();
                    self.end_nodes.remove(&ring_last);
                } else {
                    self.start_nodes.insert(first, next);
                }
            }
        }
    }

    /// Resolves the position of every ring node from the node map.
    pub fn setup_positions(&mut self, posmap: &FnvHashMap<u64, Position>) {
        for ring in self.rings.iter_mut().flatten() {
            ring.setup_positions(posmap);
        }
    }

    /// Sweeps over all segments of all rings looking for overlapping
    /// segments and proper crossings. Returns the number of defects
    /// found; each one is also written to the error layers.
    pub fn check_for_intersections(&self, output: &mut OutputDatabase, debug: bool) -> u32 {
        let mut overlaps: u32 = 0;

        if debug {
            eprintln!("Setting up segments...");
        }
        let mut segments: Vec<UndirectedSegment> = Vec::new();
        for ring in self.rings.iter().flatten() {
            ring.add_segments_to(&mut segments);
        }

        if debug {
            eprintln!("Sorting...");
        }
        segments.sort_unstable();

        if debug {
            eprintln!("Finding intersections...");
        }
        let mut intersections: Vec<Position> = Vec::new();
        for (i, s1) in segments.iter().enumerate() {
            for s2 in &segments[i + 1..] {
                if s1 == s2 {
                    let osm_id = s1.first_id().min(s1.second_id());
                    output.add_error_line(s1.to_linestring(), "overlap", osm_id);
                    overlaps += 1;
                } else {
                    if outside_x_range(s2, s1) {
                        // sorted order: nothing further right can reach s1
                        break;
                    }
                    if y_range_overlap(s1, s2) {
                        if let Some(point) = intersection(s1, s2) {
                            intersections.push(point);
                        }
                    }
                }
            }
        }

        for point in &intersections {
            output.add_error_point(point.to_point(), "intersection", 0);
        }

        intersections.len() as u32 + overlaps
    }

    /// Merges open rings whose endpoints are less than `max_distance`
    /// apart, shortest gaps first. Every successful merge invalidates
    /// all other candidates touching either of its endpoints.
    pub fn close_rings(&mut self, output: &mut OutputDatabase, debug: bool, max_distance: f64) {
        let mut connections: Vec<Connection> = Vec::new();
        for (&end_node, &end_handle) in &self.end_nodes {
            for (&start_node, &start_handle) in &self.start_nodes {
                let distance = self
                    .ring(end_handle)
                    .last_position()
                    .distance(self.ring(start_handle).first_position());
                if distance < max_distance {
                    connections.push(Connection {
                        distance,
                        end_node,
                        start_node,
                    });
                }
            }
        }

        // shortest connection at the end, so popping yields shortest first
        connections.sort_by(|a, b| b.distance.total_cmp(&a.distance));

        while let Some(conn) = connections.pop() {
            connections
                .retain(|c| c.end_node != conn.end_node && c.start_node != conn.start_node);

            let end_handle = self.end_nodes.get(&conn.end_node).copied();
            let start_handle = self.start_nodes.get(&conn.start_node).copied();
            let (Some(end_handle), Some(start_handle)) = (end_handle, start_handle) else {
                // one of the endpoints was consumed by an earlier merge
                continue;
            };

            if debug {
                eprintln!(
                    "Closing ring between node {} and node {}",
                    conn.start_node, conn.end_node
                );
            }

            self.fixed_rings += 1;

            output.add_error_point(
                self.ring(end_handle).last_point(),
                "fixed_end_point",
                self.ring(end_handle).last_node_id(),
            );
            output.add_error_point(
                self.ring(start_handle).first_point(),
                "fixed_end_point",
                self.ring(start_handle).first_node_id(),
            );

            let end_position = self.ring(end_handle).last_position();
            let start_position = self.ring(start_handle).first_position();
            if end_position != start_position {
                let added = Segment::new(
                    end_position,
                    start_position,
                    self.ring(end_handle).last_node_id(),
                    self.ring(start_handle).first_node_id(),
                );
                output.add_error_line(added.to_linestring(), "added_line", 0);
            }

            if end_handle == start_handle {
                // connect the ring to itself
                self.ring_mut(end_handle).close_ring();
                self.end_nodes.remove(&conn.end_node);
                self.start_nodes.remove(&conn.start_node);
            } else {
                let absorbed = self.rings[start_handle.0]
                    .take()
                    .expect("stale ring handle");
                let ring = self.rings[end_handle.0]
                    .as_mut()
                    .expect("stale ring handle");
                ring.join_over_gap(absorbed);

                if ring.first_position() == ring.last_position() {
                    // the far endpoints already coincide: the merge
                    // closed the ring on a duplicate node pair
                    let point = ring.first_point();
                    let first_id = ring.first_node_id();
                    let last_id = ring.last_node_id();
                    ring.fake_close();
                    output.add_error_point(point, "double_node", first_id);
                    self.start_nodes.remove(&first_id);
                    self.end_nodes.remove(&conn.end_node);
                    self.start_nodes.remove(&conn.start_node);
                    self.end_nodes.remove(&last_id);
                } else {
                    let last_id = ring.last_node_id();
                    self.end_nodes.insert(last_id, end_handle);
                    self.end_nodes.remove(&conn.end_node);
                    self.start_nodes.remove(&conn.start_node);
                }
            }
        }
    }

    /// Writes every ring to the output: complete rings as polygons,
    /// everything else to the error layers. Returns the number of
    /// defective rings.
    pub fn output_rings(&self, output: &mut OutputDatabase) -> u32 {
        let mut warnings: u32 = 0;

        for ring in self.rings.iter().flatten() {
            if ring.is_closed() {
                if ring.npoints() > 3 {
                    output.add_ring(
                        ring.to_polygon(),
                        ring.ring_id(),
                        ring.nways(),
                        ring.npoints(),
                        ring.is_fixed(),
                    );
                } else if ring.npoints() == 1 {
                    output.add_error_point(
                        ring.first_point(),
                        "single_point_in_ring",
                        ring.first_node_id(),
                    );
                    warnings += 1;
                } else {
                    output.add_error_line(ring.to_linestring(), "not_a_ring", ring.ring_id());
                    output.add_error_point(ring.first_point(), "not_a_ring", ring.first_node_id());
                    output.add_error_point(ring.last_point(), "not_a_ring", ring.last_node_id());
                    warnings += 1;
                }
            } else {
                output.add_error_line(ring.to_linestring(), "not_closed", ring.ring_id());
                output.add_error_point(ring.first_point(), "end_point", ring.first_node_id());
                output.add_error_point(ring.last_point(), "end_point", ring.last_node_id());
                warnings += 1;
            }
        }

        warnings
    }

    /// Builds the candidate polygons handed to the land/water
    /// classifier. Rings that cannot make a polygon at all are reported
    /// elsewhere; invalid rings get one repair attempt and are dropped
    /// when that fails.
    pub fn polygons(&self) -> Vec<Polygon<f64>> {
        let mut polygons: Vec<Polygon<f64>> = Vec::new();

        for ring in self.rings.iter().flatten() {
            if !ring.is_closed() || ring.npoints() <= 3 {
                continue;
            }
            let polygon = ring.to_polygon();
            if validity::polygon_is_valid(&polygon) {
                polygons.push(polygon);
            } else if let Some(repaired) = validity::repair(&polygon) {
                polygons.push(repaired);
            } else {
                eprintln!(
                    "Ignoring invalid polygon geometry (ring_id={})",
                    ring.ring_id()
                );
            }
        }

        polygons
    }

    /// Marks the rings that start one of the given polygons as outer
    /// rings, then reports every small inner ring as questionable: holes
    /// in land should be tagged as water, not as coastline. Returns the
    /// number of warnings.
    pub fn output_questionable(
        &mut self,
        polygons: &[Polygon<f64>],
        output: &mut OutputDatabase,
    ) -> u32 {
        let mut warnings: u32 = 0;

        let mut rings_by_position: Vec<(Position, RingHandle)> = self
            .rings
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref()
                    .map(|ring| (ring.first_position(), RingHandle(i)))
            })
            .collect();
        rings_by_position.sort_by_key(|(position, _)| *position);

        for polygon in polygons {
            let first = polygon.exterior().0[0];
            let position = Position::new(first.x, first.y);
            let index = rings_by_position.partition_point(|(p, _)| *p < position);
            if index < rings_by_position.len() {
                let handle = rings_by_position[index].1;
                self.ring_mut(handle).set_outer();
            }
        }

        for ring in self.rings.iter().flatten() {
            if ring.is_outer() {
                continue;
            }
            if ring.is_closed()
                && ring.npoints() > 3
                && ring.npoints() < MAX_NODES_TO_BE_CONSIDERED_QUESTIONABLE
            {
                output.add_error_line(ring.to_linestring(), "questionable", ring.ring_id());
                warnings += 1;
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::OutputSrs;

    fn way(node_ids: &[u64]) -> CoastlineWay {
        CoastlineWay {
            id: 1000,
            node_ids: node_ids.to_vec(),
        }
    }

    fn posmap(entries: &[(u64, f64, f64)]) -> FnvHashMap<u64, Position> {
        entries
            .iter()
            .map(|&(id, lon, lat)| (id, Position::new(lon, lat)))
            .collect()
    }

    fn first_ring(collection: &RingCollection) -> &CoastlineRing {
        collection.rings.iter().flatten().next().unwrap()
    }

    fn test_output() -> OutputDatabase {
        OutputDatabase::create(
            &std::env::temp_dir().join("shoreline-ring-collection-tests"),
            OutputSrs::Wgs84,
        )
    }

    /// Every open ring indexed exactly under its endpoints, closed rings
    /// in neither index.
    fn check_indexes(collection: &RingCollection) {
        let mut open = 0;
        for (i, slot) in collection.rings.iter().enumerate() {
            let Some(ring) = slot else { continue };
            if ring.is_closed() {
                assert!(!collection.start_nodes.values().any(|h| h.0 == i));
                assert!(!collection.end_nodes.values().any(|h| h.0 == i));
            } else {
                open += 1;
                assert_eq!(
                    collection.start_nodes.get(&ring.first_node_id()),
                    Some(&RingHandle(i))
                );
                assert_eq!(
                    collection.end_nodes.get(&ring.last_node_id()),
                    Some(&RingHandle(i))
                );
            }
        }
        assert_eq!(collection.start_nodes.len(), open);
        assert_eq!(collection.end_nodes.len(), open);
    }

    #[test]
    fn single_closed_way_makes_one_ring() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3, 4, 1]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 1.0, 0.0),
            (3, 1.0, 1.0),
            (4, 0.0, 1.0),
        ]));

        assert_eq!(collection.num_rings(), 1);
        assert_eq!(collection.num_ways(), 1);
        assert_eq!(collection.num_rings_from_single_way(), 1);
        check_indexes(&collection);

        let ring = first_ring(&collection);
        assert!(ring.is_closed());
        assert_eq!(ring.ring_id(), 1);

        let mut output = test_output();
        assert_eq!(collection.output_rings(&mut output), 0);
        assert_eq!(output.features("rings").len(), 1);
        assert_eq!(collection.polygons().len(), 1);
    }

    #[test]
    fn two_ways_stitch_into_one_closed_ring() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3]));
        check_indexes(&collection);
        collection.add_way(&way(&[3, 4, 1]));
        check_indexes(&collection);

        assert_eq!(collection.num_rings(), 1);
        let ring = first_ring(&collection);
        assert!(ring.is_closed());
        assert_eq!(ring.npoints(), 5);
        assert_eq!(ring.first_node_id(), 1);
        assert!(collection.start_nodes.is_empty());
        assert!(collection.end_nodes.is_empty());
    }

    #[test]
    fn three_way_sandwich_closes_via_double_hit() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3]));
        collection.add_way(&way(&[7, 8, 1]));
        check_indexes(&collection);

        // one open ring spanning 7..3 now
        assert_eq!(collection.num_rings(), 1);
        let ring = first_ring(&collection);
        assert_eq!(ring.first_node_id(), 7);
        assert_eq!(ring.last_node_id(), 3);

        // both endpoint lookups hit the same ring: append and close
        collection.add_way(&way(&[3, 4, 7]));
        check_indexes(&collection);
        assert_eq!(collection.num_rings(), 1);
        let ring = first_ring(&collection);
        assert!(ring.is_closed());
        assert_eq!(ring.npoints(), 7);
        assert_eq!(ring.nways(), 3);
        assert_eq!(ring.ring_id(), 1);
    }

    #[test]
    fn bridging_way_joins_two_open_rings() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2]));
        collection.add_way(&way(&[3, 4]));
        assert_eq!(collection.num_rings(), 2);

        collection.add_way(&way(&[2, 3]));
        check_indexes(&collection);
        assert_eq!(collection.num_rings(), 1);
        let ring = first_ring(&collection);
        assert!(!ring.is_closed());
        assert_eq!(ring.first_node_id(), 1);
        assert_eq!(ring.last_node_id(), 4);
        assert_eq!(ring.nways(), 3);
    }

    #[test]
    fn bridging_way_can_close_the_merged_ring() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2]));
        collection.add_way(&way(&[3, 1]));
        collection.add_way(&way(&[2, 3]));
        check_indexes(&collection);

        assert_eq!(collection.num_rings(), 1);
        let ring = first_ring(&collection);
        assert!(ring.is_closed());
        assert_eq!(ring.npoints(), 4);
    }

    #[test]
    fn prepend_can_close_a_ring() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3]));
        collection.add_way(&way(&[3, 1]));
        check_indexes(&collection);
        assert_eq!(collection.num_rings(), 1);
        assert!(first_ring(&collection).is_closed());
    }

    #[test]
    fn overlap_is_reported_once_per_duplicate_segment() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3]));
        collection.add_way(&way(&[4, 5, 6]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 1.0, 0.0),
            (3, 2.0, 0.5),
            (4, 0.0, 1.0),
            (5, 1.0, 0.0),
            (6, 2.0, 0.5),
        ]));

        // nodes 5-6 sit exactly on nodes 2-3: one overlapping segment
        let mut output = test_output();
        let defects = collection.check_for_intersections(&mut output, false);
        assert_eq!(defects, 1);
        assert_eq!(output.features("error_lines").len(), 1);
        assert_eq!(
            output.features("error_lines")[0]["properties"]["error"],
            "overlap"
        );
    }

    #[test]
    fn crossing_segments_are_reported_at_the_crossing_point() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2]));
        collection.add_way(&way(&[3, 4]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 1.0, 1.0),
            (3, 0.0, 1.0),
            (4, 1.0, 0.0),
        ]));

        let mut output = test_output();
        let defects = collection.check_for_intersections(&mut output, false);
        assert_eq!(defects, 1);

        let points = output.features("error_points");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0]["properties"]["error"], "intersection");
        let coordinates = points[0]["geometry"]["coordinates"].as_array().unwrap();
        assert!((coordinates[0].as_f64().unwrap() - 0.5).abs() < 1e-6);
        assert!((coordinates[1].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn clean_rings_have_no_intersections() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3, 4, 1]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 1.0, 0.0),
            (3, 1.0, 1.0),
            (4, 0.0, 1.0),
        ]));

        let mut output = test_output();
        assert_eq!(collection.check_for_intersections(&mut output, false), 0);
    }

    #[test]
    fn close_rings_joins_two_rings_over_a_gap() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3]));
        collection.add_way(&way(&[4, 5, 6]));
        collection.setup_positions(&posmap(&[
            (1, 1.0, 1.0),
            (2, 0.5, 0.5),
            (3, 0.0, 0.0),
            (4, 0.0, 0.0001),
            (5, 0.5, -0.5),
            (6, 1.0, -1.0),
        ]));

        let mut output = test_output();
        collection.close_rings(&mut output, false, 0.001);
        check_indexes(&collection);

        assert_eq!(collection.num_fixed_rings(), 1);
        assert_eq!(collection.num_rings(), 1);
        let ring = first_ring(&collection);
        assert!(ring.is_fixed());
        assert!(!ring.is_closed());
        assert_eq!(ring.first_node_id(), 1);
        assert_eq!(ring.last_node_id(), 6);
        assert_eq!(ring.npoints(), 6);

        let lines = output.features("error_lines");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["properties"]["error"], "added_line");
        let reasons: Vec<_> = output
            .features("error_points")
            .iter()
            .map(|f| f["properties"]["error"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(reasons, vec!["fixed_end_point", "fixed_end_point"]);
    }

    #[test]
    fn close_rings_can_close_a_ring_onto_itself() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 1.0, 1.0),
            (3, 0.0, 0.0001),
        ]));

        let mut output = test_output();
        collection.close_rings(&mut output, false, 0.001);
        check_indexes(&collection);

        assert_eq!(collection.num_fixed_rings(), 1);
        let ring = first_ring(&collection);
        assert!(ring.is_closed());
        assert!(ring.is_fixed());
        assert_eq!(ring.npoints(), 4);
        assert!(collection.start_nodes.is_empty());
        assert!(collection.end_nodes.is_empty());
    }

    #[test]
    fn close_rings_detects_coinciding_far_endpoints() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2]));
        collection.add_way(&way(&[3, 4]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 1.0, 0.00001),
            (3, 1.0, 0.00001),
            (4, 0.0, 0.0),
        ]));

        let mut output = test_output();
        collection.close_rings(&mut output, false, 0.001);
        check_indexes(&collection);

        // one merge suffices; its far endpoints already coincide
        assert_eq!(collection.num_fixed_rings(), 1);
        assert_eq!(collection.num_rings(), 1);
        let ring = first_ring(&collection);
        assert!(ring.is_closed());
        assert!(ring.is_fixed());
        assert!(collection.start_nodes.is_empty());
        assert!(collection.end_nodes.is_empty());

        let reasons: Vec<_> = output
            .features("error_points")
            .iter()
            .map(|f| f["properties"]["error"].as_str().unwrap().to_string())
            .collect();
        assert!(reasons.contains(&"double_node".to_string()));
    }

    #[test]
    fn close_rings_ignores_gaps_beyond_the_limit() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2]));
        collection.add_way(&way(&[3, 4]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 1.0, 0.0),
            (3, 5.0, 5.0),
            (4, 6.0, 5.0),
        ]));

        let mut output = test_output();
        collection.close_rings(&mut output, false, 0.001);

        assert_eq!(collection.num_fixed_rings(), 0);
        assert_eq!(collection.num_rings(), 2);
        check_indexes(&collection);
    }

    #[test]
    fn output_rings_reports_defective_rings() {
        let mut collection = RingCollection::new();
        // unclosed chain
        collection.add_way(&way(&[1, 2, 3]));
        // degenerate closed ring
        collection.add_way(&way(&[7, 8, 7]));
        // single point ring
        collection.add_way(&way(&[9]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 1.0, 0.0),
            (3, 1.0, 1.0),
            (7, 3.0, 3.0),
            (8, 4.0, 3.0),
            (9, 5.0, 5.0),
        ]));

        let mut output = test_output();
        let warnings = collection.output_rings(&mut output);
        assert_eq!(warnings, 3);
        assert!(output.features("rings").is_empty());

        let line_reasons: Vec<_> = output
            .features("error_lines")
            .iter()
            .map(|f| f["properties"]["error"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(line_reasons, vec!["not_closed", "not_a_ring"]);

        let point_reasons: Vec<_> = output
            .features("error_points")
            .iter()
            .map(|f| f["properties"]["error"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            point_reasons,
            vec![
                "end_point",
                "end_point",
                "not_a_ring",
                "not_a_ring",
                "single_point_in_ring"
            ]
        );

        // every ring went to exactly one of the two outputs
        assert_eq!(collection.num_rings(), 3);
        assert_eq!(output.features("rings").len() + warnings as usize, 3);
    }

    #[test]
    fn questionable_inner_rings_are_reported() {
        let mut collection = RingCollection::new();
        collection.add_way(&way(&[1, 2, 3, 4, 1]));
        collection.add_way(&way(&[5, 6, 7, 8, 5]));
        collection.setup_positions(&posmap(&[
            (1, 0.0, 0.0),
            (2, 10.0, 0.0),
            (3, 10.0, 10.0),
            (4, 0.0, 10.0),
            (5, 2.0, 2.0),
            (6, 2.0, 3.0),
            (7, 3.0, 3.0),
            (8, 3.0, 2.0),
        ]));

        // only the outer square becomes a polygon here
        let polygons = vec![first_ring(&collection).to_polygon()];

        let mut output = test_output();
        let warnings = collection.output_questionable(&polygons, &mut output);
        assert_eq!(warnings, 1);
        let lines = output.features("error_lines");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["properties"]["error"], "questionable");
        assert_eq!(lines[0]["properties"]["osm_id"], 5);
    }
}
