use crate::geometry::Position;
use fnv::FnvHashMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct OsmElement {
    pub r#type: String,
    pub id: u64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub nodes: Option<Vec<u64>>,
    pub tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct OsmData {
    pub elements: Vec<OsmElement>,
}

/// One coastline way as delivered by the input file: an ordered chain of
/// node ids. Positions are resolved later from the node map.
#[derive(Debug, Clone)]
pub struct CoastlineWay {
    pub id: u64,
    pub node_ids: Vec<u64>,
}

impl CoastlineWay {
    pub fn first_node_id(&self) -> u64 {
        self.node_ids[0]
    }

    pub fn last_node_id(&self) -> u64 {
        *self.node_ids.last().unwrap()
    }

    pub fn is_closed(&self) -> bool {
        self.first_node_id() == self.last_node_id()
    }
}

/// Result of reading an input file: coastline ways in input order and the
/// position of every node they reference.
pub struct ParsedCoastline {
    pub ways: Vec<CoastlineWay>,
    pub positions: FnvHashMap<u64, Position>,
    pub ways_dropped: u32,
}

/// Parses an Overpass API JSON export. The first pass stores all node
/// positions, the second collects the ways tagged as coastline. Ways
/// referencing a node that is missing from the file cannot be placed and
/// are dropped.
pub fn parse_coastline_data(json_data: &Value) -> Result<ParsedCoastline, String> {
    let data: OsmData = serde_json::from_value(json_data.clone())
        .map_err(|e| format!("Failed to parse OSM data: {e}"))?;

    let mut positions: FnvHashMap<u64, Position> = FnvHashMap::default();
    for element in &data.elements {
        if element.r#type == "node" {
            if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
                positions.insert(element.id, Position::new(lon, lat));
            }
        }
    }

    let mut ways: Vec<CoastlineWay> = Vec::new();
    let mut ways_dropped: u32 = 0;
    for element in &data.elements {
        if element.r#type != "way" {
            continue;
        }
        if !is_coastline(&element.tags) {
            continue;
        }
        let Some(node_ids) = &element.nodes else {
            continue;
        };
        if node_ids.is_empty() {
            continue;
        }
        if node_ids.iter().any(|id| !positions.contains_key(id)) {
            eprintln!(
                "Dropping way {} referencing a node without a position",
                element.id
            );
            ways_dropped += 1;
            continue;
        }
        ways.push(CoastlineWay {
            id: element.id,
            node_ids: node_ids.clone(),
        });
    }

    Ok(ParsedCoastline {
        ways,
        positions,
        ways_dropped,
    })
}

fn is_coastline(tags: &Option<HashMap<String, String>>) -> bool {
    tags.as_ref()
        .and_then(|tags| tags.get("natural"))
        .is_some_and(|value| value == "coastline")
}
