use crate::{ArchiveSource, Error, RawTables, TransitLayers};
use std::path::Path;

/// Allows to parameterize how the archive is turned into layers
///
/// ```no_run
/// let layers = gtfs_geojson::TransitReader::default()
///     .agency("Yolobus")
///     .stop_icon("yolobus-bus-stop.png")
///     .read("https://example.com/yolobus_gtfs.zip")?;
/// println!("{} routes", layers.routes.len());
/// # Ok::<(), gtfs_geojson::Error>(())
/// ```
#[derive(Derivative, Debug, Clone)]
#[derivative(Default)]
pub struct TransitReader {
    /// Name used to label the layers
    #[derivative(Default(value = "\"GTFS\".to_owned()"))]
    pub agency: String,
    /// Reference to the marker image of the stops, carried along for the map
    pub stop_icon: Option<String>,
    /// Removes the route lines having fewer than two points instead of keeping them
    pub drop_degenerate_shapes: bool,
}

impl TransitReader {
    /// Sets the agency name. Returns Self and can be chained
    pub fn agency(&mut self, name: &str) -> &mut Self {
        self.agency = name.to_owned();
        self
    }

    pub fn stop_icon(&mut self, icon: &str) -> &mut Self {
        self.stop_icon = Some(icon.to_owned());
        self
    }

    /// Configures the reader to remove the shapes with fewer than two points
    ///
    /// They are still reported in the diagnostics
    pub fn drop_degenerate_shapes(&mut self) -> &mut Self {
        self.drop_degenerate_shapes = true;
        self
    }

    fn assemble(&self, raw: RawTables) -> TransitLayers {
        TransitLayers::assemble(
            raw,
            &self.agency,
            self.stop_icon.as_deref(),
            self.drop_degenerate_shapes,
        )
    }

    /// Reads from an url (if starts with `"http"`), or a local path (either a directory or zipped file)
    ///
    /// See also [TransitReader::read_source] if you don’t want the library to guess
    pub fn read(&self, source: &str) -> Result<TransitLayers, Error> {
        self.read_source(&ArchiveSource::guess(source))
    }

    pub fn read_source(&self, source: &ArchiveSource) -> Result<TransitLayers, Error> {
        log::debug!("{}: reading {}", self.agency, source.describe());
        source.load().map(|raw| self.assemble(raw))
    }

    /// Same as [TransitReader::read_source], without blocking while downloading
    pub async fn read_source_async(&self, source: &ArchiveSource) -> Result<TransitLayers, Error> {
        log::debug!("{}: reading {}", self.agency, source.describe());
        source.load_async().await.map(|raw| self.assemble(raw))
    }

    /// Reads an archive held in memory
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<TransitLayers, Error> {
        RawTables::from_bytes(bytes).map(|raw| self.assemble(raw))
    }

    pub fn from_reader<T: std::io::Read + std::io::Seek>(
        &self,
        reader: T,
    ) -> Result<TransitLayers, Error> {
        RawTables::from_reader(reader).map(|raw| self.assemble(raw))
    }

    /// Reads a local zip archive or unzipped directory
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<TransitLayers, Error> {
        self.read_source(&ArchiveSource::Path(path.as_ref().to_path_buf()))
    }

    /// Reads a remote zip archive
    ///
    /// The library must be built with the read-url feature
    #[cfg(feature = "read-url")]
    pub fn from_url(&self, url: &str) -> Result<TransitLayers, Error> {
        self.read_source(&ArchiveSource::Url(url.to_owned()))
    }

    /// Asynchronously reads a remote zip archive
    ///
    /// The library must be built with the read-url feature
    #[cfg(feature = "read-url")]
    pub async fn from_url_async(&self, url: &str) -> Result<TransitLayers, Error> {
        self.read_source_async(&ArchiveSource::Url(url.to_owned()))
            .await
    }
}

/// What is needed to display one transit agency
///
/// Can be read from a configuration file:
/// ```
/// let agencies = gtfs_geojson::AgencyConfig::list_from_json(r#"[
///     {"name": "Yolobus", "stop_icon": "yolobus-bus-stop.png", "source": {"url": "https://example.com/yolobus_gtfs.zip"}},
///     {"name": "Unitrans", "source": {"path": "unitrans_gtfs.zip"}, "drop_degenerate_shapes": true}
/// ]"#)?;
/// assert_eq!(2, agencies.len());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgencyConfig {
    pub name: String,
    #[serde(default)]
    pub stop_icon: Option<String>,
    pub source: ArchiveSource,
    #[serde(default)]
    pub drop_degenerate_shapes: bool,
}

impl AgencyConfig {
    pub fn new(name: &str, source: ArchiveSource) -> Self {
        Self {
            name: name.to_owned(),
            stop_icon: None,
            source,
            drop_degenerate_shapes: false,
        }
    }

    pub fn list_from_json(json: &str) -> serde_json::Result<Vec<AgencyConfig>> {
        serde_json::from_str(json)
    }

    pub fn reader(&self) -> TransitReader {
        TransitReader {
            agency: self.name.clone(),
            stop_icon: self.stop_icon.clone(),
            drop_degenerate_shapes: self.drop_degenerate_shapes,
        }
    }

    pub fn read(&self) -> Result<TransitLayers, Error> {
        self.reader().read_source(&self.source)
    }

    pub async fn read_async(&self) -> Result<TransitLayers, Error> {
        self.reader().read_source_async(&self.source).await
    }
}

/// Loads several agencies concurrently
///
/// The results are in the same order as the configurations. A failed agency does not prevent
/// the others from loading, the caller can display [TransitLayers::empty] in its place.
#[cfg(feature = "read-url")]
pub async fn load_agencies(
    configs: &[AgencyConfig],
) -> Vec<(String, Result<TransitLayers, Error>)> {
    futures::future::join_all(
        configs
            .iter()
            .map(|config| async move { (config.name.clone(), config.read_async().await) }),
    )
    .await
}
