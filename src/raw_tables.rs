use crate::objects::*;
use crate::{Diagnostics, Error, Warning};
use chrono::Utc;
use serde::Deserialize;
use sha2::digest::Digest;
use sha2::Sha256;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

pub const STOPS: &str = "stops.txt";
pub const ROUTES: &str = "routes.txt";
pub const TRIPS: &str = "trips.txt";
pub const SHAPES: &str = "shapes.txt";

const TABLES: [&str; 4] = [STOPS, ROUTES, TRIPS, SHAPES];

/// The four tables needed to draw a network, mapped from the csv with little intelligence
///
/// An absent table is read as an empty one and reported in the [Diagnostics].
/// To get the stops and routes as GeoJSON, see [crate::TransitLayers].
#[derive(Debug, Default)]
pub struct RawTables {
    /// Time needed to read and parse the archive in milliseconds
    pub read_duration: i64,
    pub stops: Vec<Row<StopRecord>>,
    pub routes: Vec<Row<RouteRecord>>,
    pub trips: Vec<Row<TripRecord>>,
    pub shapes: Vec<Row<ShapePoint>>,
    /// All files that are present in the feed
    pub files: Vec<String>,
    /// sha256 sum of the feed, None when read from a directory
    pub sha256: Option<String>,
    pub diagnostics: Diagnostics,
}

fn read_objs<T, O>(
    mut reader: T,
    file_name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Row<O>>, Error>
where
    for<'de> O: Deserialize<'de>,
    T: std::io::Read,
{
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(|e| Error::NamedFileIO {
            file_name: file_name.to_owned(),
            source: Box::new(e),
        })?;
    let content = content
        .strip_prefix(&[0xefu8, 0xbbu8, 0xbfu8])
        .unwrap_or(content.as_slice());

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            diagnostics.push(Warning::MalformedRow {
                file_name: file_name.to_owned(),
                line: Some(1),
                message: e.to_string(),
            });
            return Ok(Vec::new());
        }
    };

    let mut res = Vec::new();
    for rec in reader.records() {
        let r = match rec {
            Ok(r) => r,
            Err(e) => {
                diagnostics.push(Warning::MalformedRow {
                    file_name: file_name.to_owned(),
                    line: e.position().map(|p| p.line()),
                    message: e.to_string(),
                });
                continue;
            }
        };
        if r.iter().all(str::is_empty) {
            continue;
        }
        let line = r.position().map(|p| p.line()).unwrap_or_default();
        match r.deserialize(Some(&headers)) {
            Ok(record) => res.push(Row { line, record }),
            Err(e) => diagnostics.push(Warning::MalformedRow {
                file_name: file_name.to_owned(),
                line: Some(line),
                message: e.to_string(),
            }),
        }
    }

    Ok(res)
}

fn read_file<O, T>(
    file_mapping: &HashMap<&str, usize>,
    archive: &mut zip::ZipArchive<T>,
    file_name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Row<O>>, Error>
where
    for<'de> O: Deserialize<'de>,
    T: std::io::Read + std::io::Seek,
{
    match file_mapping.get(file_name) {
        Some(i) => {
            let file = archive.by_index(*i).map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })?;
            let objs = read_objs(file, file_name, diagnostics)?;
            log::debug!("{}: {} rows", file_name, objs.len());
            Ok(objs)
        }
        None => {
            diagnostics.push(Warning::MissingTable {
                file_name: file_name.to_owned(),
            });
            Ok(Vec::new())
        }
    }
}

fn read_file_from_directory<O>(
    dir_path: &Path,
    file_name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Row<O>>, Error>
where
    for<'de> O: Deserialize<'de>,
{
    let path = dir_path.join(file_name);
    if path.is_file() {
        File::open(path)
            .map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })
            .and_then(|r| read_objs(r, file_name, diagnostics))
    } else {
        diagnostics.push(Warning::MissingTable {
            file_name: file_name.to_owned(),
        });
        Ok(Vec::new())
    }
}

/// Finds the archive member of each table.
///
/// Names must match exactly. When the root has no member of that name, a member nested in a
/// single directory is accepted as well (feeds zipped with their parent folder).
fn locate_tables(files: &[String]) -> HashMap<&'static str, usize> {
    let mut file_mapping = HashMap::new();
    for table in TABLES {
        let at_root = files.iter().position(|f| f == table);
        let nested = || {
            files.iter().position(|f| {
                let mut parts = f.split('/');
                matches!(
                    (parts.next(), parts.next(), parts.next()),
                    (Some(dir), Some(name), None) if !dir.is_empty() && name == table
                )
            })
        };
        if let Some(i) = at_root.or_else(nested) {
            file_mapping.insert(table, i);
        }
    }
    file_mapping
}

fn table_summary<T>(objs: &[T]) -> String {
    format!("{} rows", objs.len())
}

impl RawTables {
    /// Prints on stdout some basic statistics about the tables. Mostly to be sure that everything was read
    pub fn print_stats(&self) {
        println!("GTFS tables:");
        println!("  Read in {} ms", self.read_duration);
        println!("  Stops: {}", table_summary(&self.stops));
        println!("  Routes: {}", table_summary(&self.routes));
        println!("  Trips: {}", table_summary(&self.trips));
        println!("  Shapes: {}", table_summary(&self.shapes));
        println!("  Warnings: {}", self.diagnostics.len());
    }

    /// Reads the tables of an archive held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_reader(std::io::Cursor::new(bytes))
    }

    /// Reads for any object implementing [std::io::Read] and [std::io::Seek]
    ///
    /// Fails only if the archive itself cannot be opened or a member cannot be decompressed
    pub fn from_reader<T: std::io::Read + std::io::Seek>(reader: T) -> Result<Self, Error> {
        let now = Utc::now();
        let mut hasher = Sha256::new();
        let mut buf_reader = std::io::BufReader::new(reader);
        let _n = std::io::copy(&mut buf_reader, &mut hasher)?;
        let hash = hasher.finalize();
        let mut archive = zip::ZipArchive::new(buf_reader)?;
        let mut files = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            files.push(archive.by_index_raw(i)?.name().to_owned());
        }
        let file_mapping = locate_tables(&files);

        let mut diagnostics = Diagnostics::default();
        let stops = read_file(&file_mapping, &mut archive, STOPS, &mut diagnostics)?;
        let routes = read_file(&file_mapping, &mut archive, ROUTES, &mut diagnostics)?;
        let trips = read_file(&file_mapping, &mut archive, TRIPS, &mut diagnostics)?;
        let shapes = read_file(&file_mapping, &mut archive, SHAPES, &mut diagnostics)?;

        Ok(Self {
            stops,
            routes,
            trips,
            shapes,
            read_duration: Utc::now().signed_duration_since(now).num_milliseconds(),
            files,
            sha256: Some(format!("{:x}", hash)),
            diagnostics,
        })
    }

    /// Reads the tables from an unzipped feed
    pub fn from_directory(p: &Path) -> Result<Self, Error> {
        let now = Utc::now();
        let files = std::fs::read_dir(p)?
            .filter_map(|d| d.ok().and_then(|p| p.path().to_str().map(|s| s.to_owned())))
            .collect();

        let mut diagnostics = Diagnostics::default();
        let stops = read_file_from_directory(p, STOPS, &mut diagnostics)?;
        let routes = read_file_from_directory(p, ROUTES, &mut diagnostics)?;
        let trips = read_file_from_directory(p, TRIPS, &mut diagnostics)?;
        let shapes = read_file_from_directory(p, SHAPES, &mut diagnostics)?;

        Ok(Self {
            stops,
            routes,
            trips,
            shapes,
            read_duration: Utc::now().signed_duration_since(now).num_milliseconds(),
            files,
            sha256: None,
            diagnostics,
        })
    }
}
