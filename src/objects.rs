use std::fmt;

/// A row of stops.txt
///
/// Coordinates are kept as read, they are only parsed when building the features
/// so a bad value only removes its own stop.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StopRecord {
    #[serde(rename = "stop_id")]
    pub id: String,
    #[serde(rename = "stop_name")]
    pub name: String,
    #[serde(rename = "stop_lon")]
    pub longitude: String,
    #[serde(rename = "stop_lat")]
    pub latitude: String,
}

/// A row of routes.txt
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RouteRecord {
    #[serde(rename = "route_id")]
    pub id: String,
    #[serde(rename = "route_short_name")]
    pub short_name: Option<String>,
    #[serde(rename = "route_long_name")]
    pub long_name: Option<String>,
    #[serde(rename = "route_color")]
    pub color: Option<String>,
}

impl fmt::Display for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.short_name, &self.long_name) {
            (Some(short), _) => write!(f, "{}", short),
            (None, Some(long)) => write!(f, "{}", long),
            (None, None) => write!(f, "{}", self.id),
        }
    }
}

/// A row of trips.txt
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TripRecord {
    #[serde(rename = "trip_id")]
    pub id: String,
    pub route_id: String,
    /// Empty values are read as `None`
    pub shape_id: Option<String>,
}

impl fmt::Display for TripRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "route id: {}, shape id: {}",
            self.route_id,
            self.shape_id.as_deref().unwrap_or("none")
        )
    }
}

/// A row of shapes.txt: one point of the path of a vehicle
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ShapePoint {
    #[serde(rename = "shape_id")]
    pub id: String,
    #[serde(rename = "shape_pt_sequence")]
    pub sequence: String,
    #[serde(rename = "shape_pt_lon")]
    pub longitude: String,
    #[serde(rename = "shape_pt_lat")]
    pub latitude: String,
}

/// A row read from a table, with its line number in the file
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    pub line: u64,
    pub record: T,
}

impl<T> std::ops::Deref for Row<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.record
    }
}
