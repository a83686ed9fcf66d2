use std::{fs::File, io::BufReader, path::Path};

use log::info;

use super::{VenueGraphBuilder, raw_types::RawVenue};
use crate::{Error, model::WalkGraph};

/// Loads a walking graph from a venue JSON export
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid venue document
pub fn load_walk_graph(path: impl AsRef<Path>) -> Result<WalkGraph, Error> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::InvalidData(format!(
            "Venue graph file not found: {}",
            path.display()
        )));
    }

    info!("Loading venue graph: {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    let venue: RawVenue = serde_json::from_reader(reader)?;
    build_from_raw(venue)
}

/// Parses a walking graph from a venue JSON document held in memory
///
/// # Errors
///
/// Returns an error if the document is not a valid venue document
pub fn walk_graph_from_json(json: &str) -> Result<WalkGraph, Error> {
    let venue: RawVenue = serde_json::from_str(json)?;
    build_from_raw(venue)
}

fn build_from_raw(venue: RawVenue) -> Result<WalkGraph, Error> {
    if venue.nodes.is_empty() {
        return Err(Error::InvalidData(
            "Venue graph contains no nodes".to_string(),
        ));
    }
    Ok(VenueGraphBuilder::from_raw(venue).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SurfaceType;

    const VENUE: &str = r#"{
        "nodes": [
            { "id": "gate", "lat": 52.0700, "lon": -1.0150 },
            { "id": "stand", "lat": 52.0710, "lon": -1.0150 }
        ],
        "edges": [
            { "id": "p1", "from": "gate", "to": "stand", "distance_m": 115.0,
              "surface": "gravel", "shade": 0.25, "bidirectional": true },
            { "id": "p2", "from": "stand", "to": "paddock", "distance_m": 40.0 }
        ]
    }"#;

    #[test]
    fn parses_venue_document() {
        let graph = walk_graph_from_json(VENUE).expect("valid venue");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        let edge = graph.outgoing("gate").next().expect("forward edge");
        assert_eq!(edge.surface, SurfaceType::Gravel);
        assert_eq!(edge.shade_factor, 0.25);
    }

    #[test]
    fn empty_venue_is_rejected() {
        let err = walk_graph_from_json(r#"{ "nodes": [] }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = walk_graph_from_json("{ nodes: ").unwrap_err();
        assert!(matches!(err, Error::JsonError(_)));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_walk_graph("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
