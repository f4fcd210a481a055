use gtfs_geojson::{TransitLayers, TransitReader};

fn main() {
    env_logger::init();

    /* Usage: gtfs_to_geojson <url or path of the gtfs> [agency name] [output directory]
       The source can be a remote zip, a local zip or an unzipped directory.
    */
    let mut args = std::env::args().skip(1);
    let source = args.next().expect("missing the gtfs url or path");
    let agency = args.next().unwrap_or_else(|| "GTFS".to_owned());
    let output = args.next().unwrap_or_else(|| "output".to_owned());

    let layers = match TransitReader::default().agency(&agency).read(&source) {
        Ok(layers) => layers,
        Err(e) => {
            eprintln!("impossible to read {}: {}", source, e);
            TransitLayers::empty(&agency)
        }
    };
    layers.print_stats();

    for warning in &layers.diagnostics.warnings {
        println!("  - {}", warning);
    }

    layers
        .write_geojson(&output)
        .expect("impossible to write the geojson files");
    println!("layers written in {}", output);
}
