//! The feature sink. Three layers are kept in memory, one per feature
//! kind, and written out as GeoJSON files when the run commits. Failing
//! to store a feature is not recoverable.

use crate::projection::OutputSrs;
use crate::validity;
use colored::Colorize;
use geo::{LineString, Point, Polygon, Winding};
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::exit;

fn fatal(message: &str) -> ! {
    eprintln!("{}", message.red().bold());
    exit(crate::RETURN_CODE_FATAL);
}

struct Layer {
    name: &'static str,
    features: Vec<Value>,
}

impl Layer {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            features: Vec::new(),
        }
    }

    fn add(&mut self, geometry: Value, properties: Value) {
        self.features.push(json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": properties,
        }));
    }

    /// Writes the layer's open transaction as one FeatureCollection.
    fn commit(&mut self, dir: &Path) {
        let path = dir.join(format!("{}.geojson", self.name));
        let features = std::mem::take(&mut self.features);
        let collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });

        let file = File::create(&path).unwrap_or_else(|e| {
            fatal(&format!("Failed to create '{}': {e}", path.display()));
        });
        serde_json::to_writer(BufWriter::new(file), &collection).unwrap_or_else(|e| {
            fatal(&format!("Failed to write layer '{}': {e}", self.name));
        });
    }
}

pub struct OutputDatabase {
    dir: PathBuf,
    srs: OutputSrs,
    rings: Layer,
    error_points: Layer,
    error_lines: Layer,
}

impl OutputDatabase {
    pub fn create(dir: &Path, srs: OutputSrs) -> Self {
        if let Err(e) = std::fs::create_dir_all(dir) {
            fatal(&format!(
                "Creating output directory '{}' failed: {e}",
                dir.display()
            ));
        }
        Self {
            dir: dir.to_path_buf(),
            srs,
            rings: Layer::new("rings"),
            error_points: Layer::new("error_points"),
            error_lines: Layer::new("error_lines"),
        }
    }

    pub fn add_error_point(&mut self, point: Point<f64>, error: &str, osm_id: u64) {
        let mut point = point;
        self.srs.transform(&mut point);
        self.error_points.add(
            point_geometry(&point),
            json!({"osm_id": osm_id, "error": error}),
        );
    }

    pub fn add_error_line(&mut self, line: LineString<f64>, error: &str, osm_id: u64) {
        let mut line = line;
        self.srs.transform(&mut line);
        self.error_lines.add(
            linestring_geometry(&line),
            json!({"osm_id": osm_id, "error": error}),
        );
    }

    /// Stores one finished ring polygon. Invalid polygons are kept but
    /// flagged, and the flaw itself goes to the error points layer.
    pub fn add_ring(
        &mut self,
        polygon: Polygon<f64>,
        ring_id: u64,
        nways: u32,
        npoints: usize,
        fixed: bool,
    ) {
        let land = polygon.exterior().is_cw();

        let valid = match validity::invalidity_reason(&polygon) {
            None => true,
            Some(reason) => {
                let (error, flaw) = split_reason(&reason);
                if let Some(flaw) = flaw {
                    self.add_error_point(flaw, &error, ring_id);
                }
                false
            }
        };

        let mut polygon = polygon;
        self.srs.transform(&mut polygon);
        self.rings.add(
            polygon_geometry(&polygon),
            json!({
                "osm_id": ring_id,
                "nways": nways,
                "npoints": npoints,
                "fixed": fixed,
                "land": land,
                "valid": valid,
            }),
        );
    }

    /// Commits all three layer transactions.
    pub fn commit(&mut self) {
        self.rings.commit(&self.dir);
        self.error_points.commit(&self.dir);
        self.error_lines.commit(&self.dir);
    }

    #[cfg(test)]
    pub fn features(&self, layer: &str) -> &[Value] {
        match layer {
            "rings" => &self.rings.features,
            "error_points" => &self.error_points.features,
            "error_lines" => &self.error_lines.features,
            _ => panic!("unknown layer '{layer}'"),
        }
    }
}

/// Splits an invalidity reason of the form `"<reason> [<x> <y>]"` into
/// the canonical error string and the location of the flaw.
fn split_reason(reason: &str) -> (String, Option<Point<f64>>) {
    let Some((text, rest)) = reason.split_once('[') else {
        return (reason.to_string(), None);
    };
    let text = text.trim_end();
    let text = if text == "Self-intersection" {
        "self_intersection"
    } else {
        text
    };

    let coordinates = rest.trim_end_matches(']');
    let mut parts = coordinates.split_whitespace();
    let point = match (parts.next(), parts.next()) {
        (Some(x), Some(y)) => match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(x), Ok(y)) => Some(Point::new(x, y)),
            _ => None,
        },
        _ => None,
    };

    (text.to_string(), point)
}

fn point_geometry(point: &Point<f64>) -> Value {
    json!({"type": "Point", "coordinates": [point.x(), point.y()]})
}

fn linestring_geometry(line: &LineString<f64>) -> Value {
    let coordinates: Vec<Value> = line.0.iter().map(|c| json!([c.x, c.y])).collect();
    json!({"type": "LineString", "coordinates": coordinates})
}

fn polygon_geometry(polygon: &Polygon<f64>) -> Value {
    let mut rings: Vec<Value> = Vec::with_capacity(1 + polygon.interiors().len());
    let ring_coordinates = |ring: &LineString<f64>| -> Value {
        Value::Array(ring.0.iter().map(|c| json!([c.x, c.y])).collect())
    };
    rings.push(ring_coordinates(polygon.exterior()));
    for interior in polygon.interiors() {
        rings.push(ring_coordinates(interior));
    }
    json!({"type": "Polygon", "coordinates": rings})
}
