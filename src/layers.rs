use crate::geometry::NetworkGeometry;
use crate::objects::{RouteRecord, Row};
use crate::parsing::{color_to_hex, parse_color};
use crate::{Diagnostics, Error, RawTables, Warning};
use geojson::{FeatureCollection, JsonObject, JsonValue};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The stops and routes of one agency, ready to be displayed on a map
///
/// Each collection is labeled (as GeoJSON foreign members) with the agency name and the kind of layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitLayers {
    pub agency: String,
    /// One `Point` per stop, with `stop_id` and `stop_name` properties
    pub stops: FeatureCollection,
    /// For each `route_id` of routes.txt, in the order of the file, one `LineString` per shape,
    /// with `shape_id` and `route_id` properties
    pub routes: IndexMap<String, FeatureCollection>,
    /// What was skipped while reading the archive
    pub diagnostics: Diagnostics,
    /// sha256 sum of the archive, None when read from a directory
    pub sha256: Option<String>,
    /// Time needed to read and parse the archive in milliseconds
    pub read_duration: i64,
}

fn collection(features: Vec<geojson::Feature>, foreign_members: JsonObject) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

fn labels(agency: &str, layer: &str) -> JsonObject {
    let mut members = JsonObject::new();
    members.insert("agency".to_owned(), agency.into());
    members.insert("layer".to_owned(), layer.into());
    members
}

fn route_labels(agency: &str, route: &RouteRecord, diagnostics: &mut Diagnostics) -> JsonObject {
    let mut members = labels(agency, "route");
    members.insert("route_id".to_owned(), route.id.clone().into());
    members.insert("name".to_owned(), route.to_string().into());
    if let Some(short_name) = &route.short_name {
        members.insert("route_short_name".to_owned(), short_name.clone().into());
    }
    if let Some(long_name) = &route.long_name {
        members.insert("route_long_name".to_owned(), long_name.clone().into());
    }
    match route.color.as_deref().map(parse_color) {
        Some(Ok(Some(color))) => {
            members.insert("route_color".to_owned(), color_to_hex(&color).into());
        }
        Some(Err(value)) => diagnostics.push(Warning::InvalidColor {
            route_id: route.id.clone(),
            value,
        }),
        Some(Ok(None)) | None => {}
    }
    members
}

/// Keeps `[A-Za-z0-9_-]`, anything else becomes `_`
fn file_stem(route_id: &str) -> String {
    route_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// One file stem per route id, suffixed with `_2`, `_3`... when ids clean up to the same stem
fn file_stems<'a>(route_ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut used = HashSet::new();
    route_ids
        .map(|route_id| {
            let base = file_stem(route_id);
            let mut stem = base.clone();
            let mut n = 1;
            while !used.insert(stem.clone()) {
                n += 1;
                stem = format!("{}_{}", base, n);
            }
            if n > 1 {
                log::warn!("route {} is written as {}.geojson", route_id, stem);
            }
            stem
        })
        .collect()
}

fn write_collection(path: &Path, fc: &FeatureCollection) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, fc).map_err(|e| Error::NamedFileIO {
        file_name: format!("{}", path.display()),
        source: Box::new(e),
    })?;
    writer.flush()?;
    Ok(())
}

impl TransitLayers {
    /// Builds the layers of an agency from its raw tables
    pub fn assemble(
        raw: RawTables,
        agency: &str,
        stop_icon: Option<&str>,
        drop_degenerate_shapes: bool,
    ) -> Self {
        let mut diagnostics = raw.diagnostics;
        let geometry = NetworkGeometry::build(
            &raw.stops,
            &raw.routes,
            &raw.trips,
            &raw.shapes,
            drop_degenerate_shapes,
            &mut diagnostics,
        );

        let mut stop_labels = labels(agency, "stops");
        if let Some(icon) = stop_icon {
            stop_labels.insert("icon".to_owned(), icon.into());
        }

        let routes = label_routes(agency, &raw.routes, geometry.routes, &mut diagnostics);

        let layers = Self {
            agency: agency.to_owned(),
            stops: collection(geometry.stops, stop_labels),
            routes,
            diagnostics,
            sha256: raw.sha256,
            read_duration: raw.read_duration,
        };
        log::info!(
            "{}: {} stops, {} routes, {} warnings",
            layers.agency,
            layers.stops.features.len(),
            layers.routes.len(),
            layers.diagnostics.len()
        );
        layers
    }

    /// Layers without any stop or route, to show for an agency that could not be loaded
    pub fn empty(agency: &str) -> Self {
        Self {
            agency: agency.to_owned(),
            stops: collection(vec![], labels(agency, "stops")),
            routes: IndexMap::new(),
            diagnostics: Diagnostics::default(),
            sha256: None,
            read_duration: 0,
        }
    }

    /// Prints on stdout some basic statistics about the layers
    pub fn print_stats(&self) {
        println!("{}:", self.agency);
        println!("  Read in {} ms", self.read_duration);
        println!("  Stops: {}", self.stops.features.len());
        println!("  Routes: {}", self.routes.len());
        println!(
            "  Route lines: {}",
            self.routes
                .values()
                .map(|r| r.features.len())
                .sum::<usize>()
        );
        println!("  Warnings: {}", self.diagnostics.len());
    }

    /// All the route lines in a single collection
    pub fn routes_collection(&self) -> FeatureCollection {
        let features = self
            .routes
            .values()
            .flat_map(|r| r.features.iter().cloned())
            .collect();
        collection(features, labels(&self.agency, "routes"))
    }

    /// Writes `stops.geojson` and one `routes/<route_id>.geojson` per route in `dir`
    pub fn write_geojson<P: AsRef<Path>>(&self, dir: P) -> Result<(), Error> {
        let dir = dir.as_ref();
        let routes_dir = dir.join("routes");
        std::fs::create_dir_all(&routes_dir)?;
        write_collection(&dir.join("stops.geojson"), &self.stops)?;
        for (stem, fc) in file_stems(self.routes.keys()).iter().zip(self.routes.values()) {
            write_collection(&routes_dir.join(format!("{}.geojson", stem)), fc)?;
        }
        Ok(())
    }
}

/// Wraps the lines of each route in a labeled collection
///
/// When a `route_id` appears on several rows, the route keeps the position of its first row
/// and the labels of its last row.
fn label_routes(
    agency: &str,
    routes: &[Row<RouteRecord>],
    mut lines: IndexMap<String, Vec<geojson::Feature>>,
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, FeatureCollection> {
    let mut res: IndexMap<String, FeatureCollection> = IndexMap::new();
    for route in routes {
        let members = route_labels(agency, route, diagnostics);
        match res.get_mut(route.id.as_str()) {
            Some(fc) => fc.foreign_members = Some(members),
            None => {
                let features = lines.swap_remove(route.id.as_str()).unwrap_or_default();
                res.insert(route.id.clone(), collection(features, members));
            }
        }
    }
    res
}

/// Reads a string foreign member of a collection
pub fn label<'a>(fc: &'a FeatureCollection, name: &str) -> Option<&'a str> {
    fc.foreign_members
        .as_ref()
        .and_then(|m| m.get(name))
        .and_then(JsonValue::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: &str, short_name: Option<&str>, color: Option<&str>) -> Row<RouteRecord> {
        Row {
            line: 2,
            record: RouteRecord {
                id: id.to_owned(),
                short_name: short_name.map(String::from),
                long_name: None,
                color: color.map(String::from),
            },
        }
    }

    #[test]
    fn routes_are_labeled() {
        let mut d = Diagnostics::default();
        let routes = label_routes(
            "Yolobus",
            &[
                route("37", Some("37"), Some("ff8800")),
                route("40", None, Some("orange")),
            ],
            IndexMap::new(),
            &mut d,
        );
        assert_eq!(Some("Yolobus"), label(&routes["37"], "agency"));
        assert_eq!(Some("route"), label(&routes["37"], "layer"));
        assert_eq!(Some("37"), label(&routes["37"], "route_short_name"));
        assert_eq!(Some("FF8800"), label(&routes["37"], "route_color"));
        assert_eq!(None, label(&routes["40"], "route_color"));
        assert_eq!(Some("40"), label(&routes["40"], "name"));
        assert!(routes["40"].features.is_empty());
        assert_eq!(
            vec![Warning::InvalidColor {
                route_id: "40".to_owned(),
                value: "orange".to_owned()
            }],
            d.warnings
        );
    }

    #[test]
    fn empty_layers() {
        let layers = TransitLayers::empty("Unitrans");
        assert!(layers.stops.features.is_empty());
        assert!(layers.routes.is_empty());
        assert_eq!(Some("stops"), label(&layers.stops, "layer"));
    }

    #[test]
    fn route_file_names() {
        assert_eq!("42A", file_stem("42A"));
        assert_eq!("138_EB", file_stem("138/EB"));
        assert_eq!("a_b", file_stem("a b"));
    }

    #[test]
    fn colliding_route_file_names() {
        let ids: Vec<String> = ["138/EB", "138_EB", "138 EB", "42A"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            vec!["138_EB", "138_EB_2", "138_EB_3", "42A"],
            file_stems(ids.iter())
        );
    }

    #[test]
    fn last_row_of_a_route_gives_its_labels() {
        let mut lines = IndexMap::new();
        lines.insert("37".to_owned(), vec![]);
        let routes = label_routes(
            "Yolobus",
            &[
                route("37", Some("37"), None),
                route("40", Some("40"), None),
                route("37", Some("37X"), Some("0066CC")),
            ],
            lines,
            &mut Diagnostics::default(),
        );
        assert_eq!(
            vec!["37", "40"],
            routes.keys().map(String::as_str).collect::<Vec<_>>()
        );
        assert_eq!(Some("37X"), label(&routes["37"], "route_short_name"));
        assert_eq!(Some("0066CC"), label(&routes["37"], "route_color"));
    }
}
