use crate::*;
use geojson::{Feature, FeatureCollection, Value};
use std::io::Write;
use std::path::PathBuf;

const STOPS: &str = "stop_id,stop_name,stop_lat,stop_lon
1001,\"Davis Transit Center, Bay 2\",38.5449,-121.7405
1002,Memorial Union,38.5422,-121.7497
1003,Broken,north,-121.7
";

const ROUTES: &str = "route_id,agency_id,route_short_name,route_long_name,route_type,route_color
37,YB,37,West Sacramento Local,3,0066CC
40,YB,40,West Sacramento Local,3,
";

const TRIPS: &str = "route_id,service_id,trip_id,shape_id
37,wk,t1,s1
37,wk,t2,s2
37,we,t3,s1
40,wk,t4,s3
";

const SHAPES: &str = "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence
s1,38.3,-121.3,3
s1,38.1,-121.1,1
s1,38.2,-121.2,2
s2,38.4,-121.4,1
s2,38.5,-121.5,2
";

fn archive(files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in files {
        zip.start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn basic_archive() -> Vec<u8> {
    archive(&[
        ("agency.txt", "agency_id,agency_name\nYB,Yolobus\n"),
        ("stops.txt", STOPS),
        ("routes.txt", ROUTES),
        ("trips.txt", TRIPS),
        ("shapes.txt", SHAPES),
    ])
}

fn read(bytes: &[u8]) -> TransitLayers {
    TransitReader::default()
        .agency("Yolobus")
        .from_bytes(bytes)
        .expect("impossible to read gtfs")
}

fn line(f: &Feature) -> Vec<Vec<f64>> {
    match f.geometry.as_ref().map(|g| &g.value) {
        Some(Value::LineString(c)) => c.clone(),
        other => panic!("not a line: {:?}", other),
    }
}

fn string_property<'a>(f: &'a Feature, name: &str) -> Option<&'a str> {
    f.property(name).and_then(|v| v.as_str())
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gtfs-geojson-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn read_stops() {
    let layers = read(&basic_archive());
    assert_eq!(2, layers.stops.features.len());
    assert_eq!(
        Some("Davis Transit Center, Bay 2"),
        string_property(&layers.stops.features[0], "stop_name")
    );
    assert_eq!(
        Some(&Value::Point(vec![-121.7405, 38.5449])),
        layers.stops.features[0].geometry.as_ref().map(|g| &g.value)
    );
    assert_eq!(1, layers.diagnostics.field_parse_count("stops.txt"));
}

#[test]
fn shape_points_follow_sequence_not_file_order() {
    let layers = read(&basic_archive());
    let s1 = &layers.routes["37"].features[0];
    assert_eq!(Some("s1"), string_property(s1, "shape_id"));
    assert_eq!(
        vec![vec![-121.1, 38.1], vec![-121.2, 38.2], vec![-121.3, 38.3]],
        line(s1)
    );
}

#[test]
fn one_collection_per_route() {
    let layers = read(&basic_archive());
    assert_eq!(vec!["37", "40"], layers.routes.keys().collect::<Vec<_>>());

    let shape_ids: Vec<_> = layers.routes["37"]
        .features
        .iter()
        .filter_map(|f| string_property(f, "shape_id"))
        .collect();
    assert_eq!(vec!["s1", "s2"], shape_ids);

    // s3 has no point in shapes.txt
    let rt40 = &layers.routes["40"];
    assert_eq!(1, rt40.features.len());
    assert!(line(&rt40.features[0]).is_empty());
    assert_eq!(Some("40"), string_property(&rt40.features[0], "route_id"));
    assert!(layers.diagnostics.warnings.contains(&Warning::DegenerateShape {
        route_id: "40".to_owned(),
        shape_id: "s3".to_owned(),
        points: 0,
        dropped: false,
    }));
}

#[test]
fn layers_are_labeled() {
    let layers = TransitReader::default()
        .agency("Yolobus")
        .stop_icon("yolobus-bus-stop.png")
        .from_bytes(&basic_archive())
        .unwrap();
    assert_eq!(Some("Yolobus"), label(&layers.stops, "agency"));
    assert_eq!(Some("stops"), label(&layers.stops, "layer"));
    assert_eq!(Some("yolobus-bus-stop.png"), label(&layers.stops, "icon"));
    assert_eq!(Some("route"), label(&layers.routes["37"], "layer"));
    assert_eq!(Some("0066CC"), label(&layers.routes["37"], "route_color"));
    assert_eq!(
        Some("West Sacramento Local"),
        label(&layers.routes["40"], "route_long_name")
    );
    assert_eq!(None, label(&layers.routes["40"], "route_color"));

    let all = layers.routes_collection();
    assert_eq!(3, all.features.len());
    assert_eq!(Some("routes"), label(&all, "layer"));
}

#[test]
fn missing_shapes_table() {
    let layers = read(&archive(&[
        ("stops.txt", STOPS),
        ("routes.txt", ROUTES),
        ("trips.txt", TRIPS),
    ]));
    assert_eq!(2, layers.stops.features.len());
    assert_eq!(2, layers.routes.len());
    // the lines exist but have no point
    assert!(layers
        .routes
        .values()
        .flat_map(|r| r.features.iter())
        .all(|f| line(f).is_empty()));
    assert_eq!(
        vec!["shapes.txt"],
        layers.diagnostics.missing_tables().collect::<Vec<_>>()
    );
}

#[test]
fn missing_trips_table() {
    let layers = read(&archive(&[
        ("stops.txt", STOPS),
        ("routes.txt", ROUTES),
        ("shapes.txt", SHAPES),
    ]));
    assert_eq!(2, layers.routes.len());
    assert!(layers.routes.values().all(|r| r.features.is_empty()));
}

#[test]
fn empty_archive() {
    let layers = read(&archive(&[]));
    assert!(layers.stops.features.is_empty());
    assert!(layers.routes.is_empty());
    assert_eq!(4, layers.diagnostics.missing_tables().count());
}

#[test]
fn idempotent() {
    let bytes = basic_archive();
    let first = read(&bytes);
    let second = read(&bytes);
    assert_eq!(first.stops, second.stops);
    assert_eq!(first.routes, second.routes);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert!(first.sha256.is_some());
    assert_eq!(first.sha256, second.sha256);
}

#[test]
fn archive_with_a_parent_directory() {
    let layers = read(&archive(&[
        ("yolobus/stops.txt", STOPS),
        ("yolobus/routes.txt", ROUTES),
        ("yolobus/trips.txt", TRIPS),
        ("yolobus/shapes.txt", SHAPES),
    ]));
    assert_eq!(2, layers.stops.features.len());
    assert_eq!(2, layers.routes["37"].features.len());
}

#[test]
fn table_names_are_case_sensitive() {
    let raw = RawTables::from_bytes(&archive(&[("Stops.txt", STOPS)])).unwrap();
    assert!(raw.stops.is_empty());
    assert_eq!(vec!["Stops.txt"], raw.files);
}

#[test]
fn not_a_zip() {
    let err = TransitReader::default()
        .from_bytes(b"route_id\n37\n")
        .unwrap_err();
    assert_eq!(ErrorKind::Archive, err.kind());
}

#[test]
fn read_from_directory() {
    let dir = temp_dir("directory");
    std::fs::write(dir.join("stops.txt"), STOPS).unwrap();
    std::fs::write(dir.join("routes.txt"), ROUTES).unwrap();
    std::fs::write(dir.join("trips.txt"), TRIPS).unwrap();

    let layers = TransitReader::default().from_path(&dir).unwrap();
    assert_eq!(2, layers.stops.features.len());
    assert_eq!(2, layers.routes["37"].features.len());
    assert_eq!(None, layers.sha256);
    assert_eq!(
        vec!["shapes.txt"],
        layers.diagnostics.missing_tables().collect::<Vec<_>>()
    );
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn read_from_zip_file() {
    let dir = temp_dir("zip-file");
    let path = dir.join("yolobus_gtfs.zip");
    std::fs::write(&path, basic_archive()).unwrap();
    let layers = TransitReader::default()
        .agency("Yolobus")
        .read(path.to_str().unwrap())
        .unwrap();
    assert_eq!(read(&basic_archive()).routes, layers.routes);
    assert_eq!(Some("Yolobus"), label(&layers.routes["37"], "agency"));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn write_geojson_files() {
    let dir = temp_dir("write");
    let layers = read(&basic_archive());
    layers.write_geojson(&dir).unwrap();

    let stops: FeatureCollection = std::fs::read_to_string(dir.join("stops.geojson"))
        .unwrap()
        .parse::<geojson::GeoJson>()
        .unwrap()
        .try_into()
        .unwrap();
    assert_eq!(2, stops.features.len());
    assert!(dir.join("routes").join("37.geojson").is_file());
    assert!(dir.join("routes").join("40.geojson").is_file());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn read_async_from_bytes() {
    let config = AgencyConfig::new("Yolobus", ArchiveSource::from(basic_archive()));
    let layers = futures::executor::block_on(config.read_async()).unwrap();
    assert_eq!("Yolobus", layers.agency);
    assert_eq!(2, layers.routes.len());
}

#[cfg(feature = "read-url")]
#[test]
fn agencies_are_loaded_independently() {
    let configs = vec![
        AgencyConfig::new("Yolobus", ArchiveSource::from(basic_archive())),
        AgencyConfig::new("Broken", ArchiveSource::from(b"not a zip".to_vec())),
        AgencyConfig::new(
            "Unitrans",
            ArchiveSource::from(archive(&[("stops.txt", STOPS)])),
        ),
    ];
    let results = futures::executor::block_on(load_agencies(&configs));
    assert_eq!(
        vec!["Yolobus", "Broken", "Unitrans"],
        results.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>()
    );
    assert_eq!(2, results[0].1.as_ref().unwrap().routes.len());
    assert!(results[1].1.is_err());
    let unitrans = results[2].1.as_ref().unwrap();
    assert_eq!(2, unitrans.stops.features.len());
    assert!(unitrans.routes.is_empty());
    assert_eq!(Some("Unitrans"), label(&unitrans.stops, "agency"));
}

#[test]
fn routes_in_file_order() {
    let layers = read(&archive(&[
        ("stops.txt", STOPS),
        (
            "routes.txt",
            "route_id,route_short_name\n9,9\n10,10\n2,2\n",
        ),
        ("trips.txt", "route_id,trip_id,shape_id\n2,t1,s1\n"),
        ("shapes.txt", SHAPES),
    ]));
    assert_eq!(
        vec!["9", "10", "2"],
        layers.routes.keys().map(String::as_str).collect::<Vec<_>>()
    );
    assert_eq!(
        vec![Some("2")],
        layers
            .routes_collection()
            .features
            .iter()
            .map(|f| string_property(f, "route_id"))
            .collect::<Vec<_>>()
    );
}
