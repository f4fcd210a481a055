/*! The [General Transit Feed Specification](https://gtfs.org/) (GTFS) is a commonly used model to represent public transit data.

This crates turns a GTFS archive into layers that a web map can display directly:
a [GeoJSON](https://geojson.org/) `FeatureCollection` of stops, and for each route a `FeatureCollection` of lines,
one per shape used by the trips of the route.

Only `stops.txt`, `routes.txt`, `trips.txt` and `shapes.txt` are read. A missing table, an unreadable
coordinate or a trip of an unknown route never stop the conversion: they are skipped and reported in the [Diagnostics].
Only a source that cannot be fetched or an archive that cannot be opened are errors.

There are two levels:

* [RawTables] are the rows of the four tables, almost as they are in the csv files
* [TransitLayers] are the GeoJSON layers built from them, labeled with the agency name

```no_run
let layers = gtfs_geojson::TransitReader::default()
    .agency("Yolobus")
    .read("https://example.com/yolobus_gtfs.zip")?;
layers.print_stats();
for (route_id, lines) in &layers.routes {
    println!("route {}: {} lines", route_id, lines.features.len());
}
# Ok::<(), gtfs_geojson::Error>(())
```

The archive can be fetched with [reqwest](https://docs.rs/reqwest) (feature `read-url`, enabled by default),
read from a local file or directory, or given as bytes.
*/

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

mod diagnostics;
pub mod error;
mod geometry;
mod layers;
pub(crate) mod objects;
mod parsing;
mod raw_tables;
mod reader;
mod source;

#[cfg(test)]
mod tests;

pub use diagnostics::{Diagnostics, Warning};
pub use error::{Error, ErrorKind};
pub use geometry::NetworkGeometry;
pub use layers::{label, TransitLayers};
pub use objects::*;
pub use raw_tables::RawTables;
#[cfg(feature = "read-url")]
pub use reader::load_agencies;
pub use reader::{AgencyConfig, TransitReader};
pub use source::ArchiveSource;
