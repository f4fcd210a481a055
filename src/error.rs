use thiserror::Error;

/// The two families of failure that abort a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive could not be obtained
    Fetch,
    /// The archive was obtained but could not be opened or read
    Archive,
}

/// An error that stops the conversion of a GTFS archive.
///
/// Problems inside the tables (a missing file, an unreadable coordinate…) are not errors,
/// they are reported as [crate::Warning] in the [crate::Diagnostics].
#[derive(Error, Debug)]
pub enum Error {
    /// The source is neither an http(s) url nor something we know how to read
    #[error("unsupported GTFS source '{0}'")]
    UnsupportedSource(String),
    /// The given path to the GTFS is neither a file nor a directory
    #[error("Could not read GTFS: {0} is neither a file nor a directory")]
    NotFileNorDirectory(String),
    /// The server answered, but not with a success status
    #[error("impossible to fetch '{url}': http status {status}")]
    HttpStatus {
        /// The requested url
        url: String,
        /// The http status code returned by the server
        status: u16,
    },
    /// The request itself failed
    #[cfg(feature = "read-url")]
    #[error("impossible to remotely access file")]
    Fetch(#[from] reqwest::Error),
    /// Generic Input/Output error while reading a file
    #[error("impossible to read file")]
    IO(#[from] std::io::Error),
    /// Impossible to read a table of the archive
    #[error("impossible to read '{file_name}'")]
    NamedFileIO {
        /// The file name that could not be read
        file_name: String,
        /// The inital error that caused the unability to read the file
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Error when trying to unzip the GTFS archive
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Tells if the archive could not be retrieved or could not be read
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedSource(_) | Error::NotFileNorDirectory(_) | Error::HttpStatus { .. } => {
                ErrorKind::Fetch
            }
            #[cfg(feature = "read-url")]
            Error::Fetch(_) => ErrorKind::Fetch,
            Error::IO(_) | Error::NamedFileIO { .. } | Error::Zip(_) => ErrorKind::Archive,
        }
    }
}
