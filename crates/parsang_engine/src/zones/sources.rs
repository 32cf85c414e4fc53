use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

pub const DEFAULT_CACHE_FILE_SUFFIX: &str = ".zone.gz";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Size and modification time, used to skip rescans of an unchanged log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// Reads a whole text file, replacing invalid UTF-8. `Ok(None)` when the file does not exist.
pub fn read_optional_text(path: &Path) -> Result<Option<String>, SourceError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SourceError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn file_stamp(path: &Path) -> Result<Option<FileStamp>, SourceError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(FileStamp {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SourceError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Reads everything from `offset` to the end of the file.
pub fn read_from_offset(path: &Path, offset: u64) -> Result<Option<Vec<u8>>, SourceError> {
    let read_error = |source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(read_error(source)),
    };
    file.seek(SeekFrom::Start(offset)).map_err(read_error)?;
    let mut appended = Vec::new();
    file.read_to_end(&mut appended).map_err(read_error)?;
    Ok(Some(appended))
}

/// Where previously visited zone identifiers come from.
pub trait VisitedZoneSource {
    fn describe(&self) -> String;

    /// `Ok(None)` when the backing store does not exist.
    fn visited_identifiers(&self) -> Result<Option<Vec<String>>, SourceError>;
}

/// The save's zone cache directory: one `<world>.<coord>.zone.gz` file per thawed zone.
#[derive(Debug, Clone)]
pub struct ZoneCacheDir {
    dir: PathBuf,
    file_suffix: String,
}

impl ZoneCacheDir {
    pub fn new(dir: PathBuf, file_suffix: impl Into<String>) -> Self {
        Self {
            dir,
            file_suffix: file_suffix.into(),
        }
    }
}

impl VisitedZoneSource for ZoneCacheDir {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn visited_identifiers(&self) -> Result<Option<Vec<String>>, SourceError> {
        let read_dir_error = |source| SourceError::ReadDir {
            path: self.dir.clone(),
            source,
        };
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(read_dir_error(source)),
        };

        let mut identifiers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(read_dir_error)?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(identifier) = file_name.strip_suffix(self.file_suffix.as_str()) {
                identifiers.push(identifier.to_string());
            }
        }
        identifiers.sort();
        Ok(Some(identifiers))
    }
}

/// In-memory identifiers, for callers that pull them from another store.
impl VisitedZoneSource for Vec<String> {
    fn describe(&self) -> String {
        format!("{} in-memory identifiers", self.len())
    }

    fn visited_identifiers(&self) -> Result<Option<Vec<String>>, SourceError> {
        Ok(Some(self.clone()))
    }
}
