use crate::{Error, RawTables};
use bytes::Bytes;
use std::fs::File;
use std::path::PathBuf;

/// Where to get a GTFS archive from
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveSource {
    /// A remote zip archive, fetched with a GET request
    Url(String),
    /// A local zip archive or unzipped directory
    Path(PathBuf),
    /// A zip archive already in memory
    #[serde(skip)]
    Bytes(Bytes),
}

impl ArchiveSource {
    /// Url if it starts with `http://` or `https://`, a local path otherwise
    pub fn guess(source: &str) -> Self {
        if is_http(source) {
            ArchiveSource::Url(source.to_owned())
        } else {
            ArchiveSource::Path(PathBuf::from(source))
        }
    }

    /// Reads the tables, blocking on the network if needed
    ///
    /// Must not be called from within an async runtime when the source is an url,
    /// use [ArchiveSource::load_async] instead
    pub fn load(&self) -> Result<RawTables, Error> {
        match self {
            ArchiveSource::Url(url) => fetch(url).and_then(|b| RawTables::from_bytes(&b)),
            ArchiveSource::Bytes(bytes) => RawTables::from_bytes(bytes),
            ArchiveSource::Path(p) => {
                if p.is_file() {
                    let reader = File::open(p)?;
                    RawTables::from_reader(reader)
                } else if p.is_dir() {
                    RawTables::from_directory(p)
                } else {
                    Err(Error::NotFileNorDirectory(format!("{}", p.display())))
                }
            }
        }
    }

    /// Reads the tables, without blocking while downloading
    ///
    /// Decompression and parsing still happen on the calling task
    pub async fn load_async(&self) -> Result<RawTables, Error> {
        match self {
            ArchiveSource::Url(url) => {
                let body = fetch_async(url).await?;
                RawTables::from_bytes(&body)
            }
            _ => self.load(),
        }
    }

    /// A short description for logs
    pub fn describe(&self) -> String {
        match self {
            ArchiveSource::Url(url) => url.clone(),
            ArchiveSource::Path(p) => format!("{}", p.display()),
            ArchiveSource::Bytes(b) => format!("{} bytes in memory", b.len()),
        }
    }
}

impl From<Vec<u8>> for ArchiveSource {
    fn from(bytes: Vec<u8>) -> Self {
        ArchiveSource::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for ArchiveSource {
    fn from(bytes: Bytes) -> Self {
        ArchiveSource::Bytes(bytes)
    }
}

fn is_http(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(feature = "read-url")]
fn check_url(url: &str) -> Result<(), Error> {
    if is_http(url) {
        Ok(())
    } else {
        Err(Error::UnsupportedSource(url.to_owned()))
    }
}

#[cfg(feature = "read-url")]
fn check_status(url: &str, status: reqwest::StatusCode) -> Result<(), Error> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::HttpStatus {
            url: url.to_owned(),
            status: status.as_u16(),
        })
    }
}

#[cfg(feature = "read-url")]
fn fetch(url: &str) -> Result<Bytes, Error> {
    check_url(url)?;
    log::info!("downloading {}", url);
    let res = reqwest::blocking::get(url)?;
    check_status(url, res.status())?;
    Ok(res.bytes()?)
}

#[cfg(feature = "read-url")]
async fn fetch_async(url: &str) -> Result<Bytes, Error> {
    check_url(url)?;
    log::info!("downloading {}", url);
    let res = reqwest::get(url).await?;
    check_status(url, res.status())?;
    Ok(res.bytes().await?)
}

#[cfg(not(feature = "read-url"))]
fn fetch(url: &str) -> Result<Bytes, Error> {
    Err(Error::UnsupportedSource(format!(
        "{} (built without the read-url feature)",
        url
    )))
}

#[cfg(not(feature = "read-url"))]
async fn fetch_async(url: &str) -> Result<Bytes, Error> {
    fetch(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    #[cfg(feature = "read-url")]
    fn http_status() {
        assert!(check_status("http://x/gtfs.zip", reqwest::StatusCode::OK).is_ok());
        let err = check_status("http://x/gtfs.zip", reqwest::StatusCode::NOT_FOUND).unwrap_err();
        assert_eq!(ErrorKind::Fetch, err.kind());
        assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn guess_source() {
        assert_eq!(
            ArchiveSource::Url("https://example.com/gtfs.zip".to_owned()),
            ArchiveSource::guess("https://example.com/gtfs.zip")
        );
        assert_eq!(
            ArchiveSource::Path(PathBuf::from("yolobus_gtfs.zip")),
            ArchiveSource::guess("yolobus_gtfs.zip")
        );
    }

    #[test]
    fn not_an_url() {
        let err = ArchiveSource::Url("ftp://example.com/gtfs.zip".to_owned())
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedSource(_)));
        assert_eq!(ErrorKind::Fetch, err.kind());
    }

    #[test]
    fn missing_path() {
        let err = ArchiveSource::guess("/does/not/exist/gtfs.zip")
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::NotFileNorDirectory(_)));
        assert_eq!(ErrorKind::Fetch, err.kind());
    }

    #[test]
    fn not_an_archive() {
        let err = ArchiveSource::from(b"stop_id,stop_name\n".to_vec())
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::Zip(_)));
        assert_eq!(ErrorKind::Archive, err.kind());
    }

    #[test]
    fn deserialize_source() {
        let source: ArchiveSource =
            serde_json::from_str(r#"{"url": "https://example.com/gtfs.zip"}"#).unwrap();
        assert_eq!(
            ArchiveSource::Url("https://example.com/gtfs.zip".to_owned()),
            source
        );
    }
}
