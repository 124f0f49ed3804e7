use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::RepositoryError;
use crate::models::{Course, Settings};

pub const COURSES_FILE: &str = "courses.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// Where the two JSON documents live.
#[derive(Debug, Clone)]
pub struct DataFiles {
    pub dir: PathBuf,
    pub courses_file: String,
    pub settings_file: String,
}

impl DataFiles {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            courses_file: COURSES_FILE.to_string(),
            settings_file: SETTINGS_FILE.to_string(),
        }
    }

    pub fn courses_path(&self) -> PathBuf {
        self.dir.join(&self.courses_file)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(&self.settings_file)
    }
}

/// Flat-file storage for courses and settings.
///
/// Every call goes to disk; nothing is cached. Writes replace the whole
/// document through a temp file and a rename. There is no locking, so two
/// overlapping load-modify-save sequences race and the last save wins.
#[derive(Debug, Clone)]
pub struct Repository {
    files: DataFiles,
}

impl Repository {
    pub fn new(files: DataFiles) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &DataFiles {
        &self.files
    }

    /// Creates the data directory and any missing document with default
    /// content. Existing files are left alone.
    pub async fn ensure_initialized(&self) -> Result<(), RepositoryError> {
        fs::create_dir_all(&self.files.dir).await?;

        let settings_path = self.files.settings_path();
        if !fs::try_exists(&settings_path).await? {
            debug!("creating {}", settings_path.display());
            write_json_atomic(&settings_path, &Settings::default()).await?;
        }

        let courses_path = self.files.courses_path();
        if !fs::try_exists(&courses_path).await? {
            debug!("creating {}", courses_path.display());
            write_json_atomic(&courses_path, &Vec::<Course>::new()).await?;
        }

        Ok(())
    }

    /// Reads the course list. A record that does not fit [`Course`] is
    /// skipped; the rest of the document is kept.
    pub async fn load_courses(&self) -> Vec<Course> {
        let path = self.files.courses_path();
        let items = match read_json::<Value>(&path).await {
            Some(Value::Array(items)) => items,
            Some(_) => {
                warn!("{} is not a JSON array, using defaults", path.display());
                return Vec::new();
            }
            None => return Vec::new(),
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Course>(item) {
                Ok(course) => Some(course),
                Err(e) => {
                    warn!("skipping malformed course in {}: {}", path.display(), e);
                    None
                }
            })
            .collect()
    }

    pub async fn save_courses(&self, courses: &[Course]) -> Result<(), RepositoryError> {
        write_json_atomic(&self.files.courses_path(), &courses).await
    }

    pub async fn load_settings(&self) -> Settings {
        read_json(&self.files.settings_path())
            .await
            .unwrap_or_default()
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<(), RepositoryError> {
        write_json_atomic(&self.files.settings_path(), settings).await
    }
}

/// Next id for a new course: one past the current maximum.
pub fn next_id(courses: &[Course]) -> u64 {
    courses.iter().map(|c| c.id).max().map_or(1, |max| max + 1)
}

// A missing or malformed file reads as `None`; the caller substitutes defaults.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} not found, using defaults", path.display());
            return None;
        }
        Err(e) => {
            warn!("failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("malformed JSON in {}, using defaults: {}", path.display(), e);
            None
        }
    }
}

async fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), RepositoryError> {
    let body = serde_json::to_vec_pretty(value)?;
    let tmp = temp_path(path);

    if let Err(e) = replace_with(&tmp, path, &body).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

async fn replace_with(tmp: &Path, path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(body).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(tmp, path).await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
