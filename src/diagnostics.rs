use std::fmt;

/// A problem found in the feed that was recovered by skipping something
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A table is absent from the archive, it is read as an empty table
    MissingTable {
        /// File name of the table, e.g. `shapes.txt`
        file_name: String,
    },
    /// A numeric field could not be read, the stop or shape point is dropped
    FieldParse {
        /// File name of the table
        file_name: String,
        /// Line of the row in the file (the header being line 1)
        line: u64,
        /// Name of the column
        field: String,
        /// The raw value found in the file
        value: String,
    },
    /// A row could not be read at all by the csv reader
    MalformedRow {
        /// File name of the table
        file_name: String,
        /// Line of the row in the file, if known
        line: Option<u64>,
        /// Message of the csv reader
        message: String,
    },
    /// Trips referencing a route that routes.txt does not define
    OrphanTrips {
        /// The unknown route id
        route_id: String,
        /// Number of trips referencing it
        trips: usize,
    },
    /// A shape with fewer than two usable points
    DegenerateShape {
        /// The route using the shape
        route_id: String,
        /// The shape id
        shape_id: String,
        /// Number of usable points of the shape
        points: usize,
        /// True if the feature was removed from the output
        dropped: bool,
    },
    /// A route color that is not a `RRGGBB` hexadecimal value
    InvalidColor {
        /// The route id
        route_id: String,
        /// The raw value found in routes.txt
        value: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::MissingTable { file_name } => {
                write!(f, "{} is absent, read as an empty table", file_name)
            }
            Warning::FieldParse {
                file_name,
                line,
                field,
                value,
            } => write!(
                f,
                "{}:{}: '{}' is not a valid value for {}",
                file_name, line, value, field
            ),
            Warning::MalformedRow {
                file_name,
                line: Some(line),
                message,
            } => write!(f, "{}:{}: row skipped: {}", file_name, line, message),
            Warning::MalformedRow {
                file_name,
                line: None,
                message,
            } => write!(f, "{}: row skipped: {}", file_name, message),
            Warning::OrphanTrips { route_id, trips } => {
                write!(f, "{} trip(s) reference the unknown route {}", trips, route_id)
            }
            Warning::DegenerateShape {
                route_id,
                shape_id,
                points,
                dropped,
            } => write!(
                f,
                "shape {} of route {} has {} point(s){}",
                shape_id,
                route_id,
                points,
                if *dropped { ", dropped" } else { "" }
            ),
            Warning::InvalidColor { route_id, value } => {
                write!(f, "route {} has an invalid color '{}'", route_id, value)
            }
        }
    }
}

/// All the warnings raised while converting one archive
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Records a warning and logs it
    pub fn push(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn missing_tables(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().filter_map(|w| match w {
            Warning::MissingTable { file_name } => Some(file_name.as_str()),
            _ => None,
        })
    }

    /// Number of values that could not be parsed in the given table
    pub fn field_parse_count(&self, table: &str) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::FieldParse { file_name, .. } if file_name == table))
            .count()
    }
}
