use crate::objects::*;
use crate::parsing::{parse_float, parse_position};
use crate::raw_tables::{SHAPES, STOPS};
use crate::{Diagnostics, Warning};
use geojson::{Feature, Geometry, JsonObject, Position, Value};
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Stops and route lines built from the raw tables, not yet labeled with their agency
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NetworkGeometry {
    /// One point per usable stop, in the order of stops.txt
    pub stops: Vec<Feature>,
    /// One entry per route of routes.txt, in the order of the file, with one line per distinct shape of its trips
    pub routes: IndexMap<String, Vec<Feature>>,
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Builds the point features of the stops
///
/// Stops without valid coordinates are skipped. Stops sharing an id are all kept.
pub fn stop_features(stops: &[Row<StopRecord>], diagnostics: &mut Diagnostics) -> Vec<Feature> {
    stops
        .iter()
        .filter_map(|stop| {
            match parse_position(
                ("stop_lon", stop.longitude.as_str()),
                ("stop_lat", stop.latitude.as_str()),
            ) {
                Ok((lon, lat)) => {
                    let mut properties = JsonObject::new();
                    properties.insert("stop_id".to_owned(), stop.id.clone().into());
                    properties.insert("stop_name".to_owned(), stop.name.clone().into());
                    Some(feature(Value::Point(vec![lon, lat]), properties))
                }
                Err((field, value)) => {
                    diagnostics.push(Warning::FieldParse {
                        file_name: STOPS.to_owned(),
                        line: stop.line,
                        field: field.to_owned(),
                        value: value.to_owned(),
                    });
                    None
                }
            }
        })
        .collect()
}

/// Groups the shape points by shape id, each group sorted by `shape_pt_sequence`
///
/// The sort is stable, so points sharing a sequence number keep their file order.
pub fn shape_lines(
    shapes: &[Row<ShapePoint>],
    diagnostics: &mut Diagnostics,
) -> HashMap<String, Vec<Position>> {
    let mut points_by_shape: HashMap<&str, Vec<(f64, Position)>> = HashMap::new();
    for point in shapes {
        let sequence = match parse_float(&point.sequence) {
            Some(s) => s,
            None => {
                diagnostics.push(Warning::FieldParse {
                    file_name: SHAPES.to_owned(),
                    line: point.line,
                    field: "shape_pt_sequence".to_owned(),
                    value: point.sequence.clone(),
                });
                continue;
            }
        };
        match parse_position(
            ("shape_pt_lon", point.longitude.as_str()),
            ("shape_pt_lat", point.latitude.as_str()),
        ) {
            Ok((lon, lat)) => points_by_shape
                .entry(point.id.as_str())
                .or_default()
                .push((sequence, vec![lon, lat])),
            Err((field, value)) => diagnostics.push(Warning::FieldParse {
                file_name: SHAPES.to_owned(),
                line: point.line,
                field: field.to_owned(),
                value: value.to_owned(),
            }),
        }
    }

    points_by_shape
        .into_iter()
        .map(|(shape_id, mut points)| {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            (
                shape_id.to_owned(),
                points.into_iter().map(|(_, p)| p).collect(),
            )
        })
        .collect()
}

/// Distinct shape ids used by the trips of each known route, in order of first use
///
/// Trips of routes absent from routes.txt are reported and ignored.
fn shapes_by_route<'a>(
    routes: &'a [Row<RouteRecord>],
    trips: &'a [Row<TripRecord>],
    diagnostics: &mut Diagnostics,
) -> HashMap<&'a str, Vec<&'a str>> {
    let known_routes: HashSet<&str> = routes.iter().map(|r| r.id.as_str()).collect();
    let mut orphans: BTreeMap<&str, usize> = BTreeMap::new();
    let mut res: HashMap<&str, Vec<&str>> = HashMap::new();
    for trip in trips {
        if !known_routes.contains(trip.route_id.as_str()) {
            log::debug!("trip {} ignored ({})", trip.id, trip.record);
            *orphans.entry(trip.route_id.as_str()).or_default() += 1;
            continue;
        }
        if let Some(shape_id) = trip.shape_id.as_deref().filter(|s| !s.is_empty()) {
            res.entry(trip.route_id.as_str()).or_default().push(shape_id);
        }
    }
    for (route_id, trips) in orphans {
        diagnostics.push(Warning::OrphanTrips {
            route_id: route_id.to_owned(),
            trips,
        });
    }

    res.into_iter()
        .map(|(route_id, shape_ids)| (route_id, shape_ids.into_iter().unique().collect()))
        .collect()
}

/// Builds the line features of each route
///
/// Every route of routes.txt gets an entry, even without any shape, in the order of routes.txt.
/// A shape with fewer than two points gives a degenerate line that is kept,
/// unless `drop_degenerate_shapes` is set.
pub fn route_features(
    routes: &[Row<RouteRecord>],
    trips: &[Row<TripRecord>],
    shapes: &[Row<ShapePoint>],
    drop_degenerate_shapes: bool,
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, Vec<Feature>> {
    let lines = shape_lines(shapes, diagnostics);
    let shapes_by_route = shapes_by_route(routes, trips, diagnostics);

    let mut res = IndexMap::new();
    for route in routes {
        if res.contains_key(route.id.as_str()) {
            continue;
        }
        let shape_ids = shapes_by_route
            .get(route.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let features = shape_ids
            .iter()
            .filter_map(|shape_id| {
                let coordinates = lines.get(*shape_id).cloned().unwrap_or_default();
                if coordinates.len() < 2 {
                    diagnostics.push(Warning::DegenerateShape {
                        route_id: route.id.clone(),
                        shape_id: shape_id.to_string(),
                        points: coordinates.len(),
                        dropped: drop_degenerate_shapes,
                    });
                    if drop_degenerate_shapes {
                        return None;
                    }
                }
                let mut properties = JsonObject::new();
                properties.insert("shape_id".to_owned(), shape_id.to_string().into());
                properties.insert("route_id".to_owned(), route.id.clone().into());
                Some(feature(Value::LineString(coordinates), properties))
            })
            .collect();
        res.insert(route.id.clone(), features);
    }
    res
}

impl NetworkGeometry {
    pub fn build(
        stops: &[Row<StopRecord>],
        routes: &[Row<RouteRecord>],
        trips: &[Row<TripRecord>],
        shapes: &[Row<ShapePoint>],
        drop_degenerate_shapes: bool,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        Self {
            stops: stop_features(stops, diagnostics),
            routes: route_features(routes, trips, shapes, drop_degenerate_shapes, diagnostics),
        }
    }
}
