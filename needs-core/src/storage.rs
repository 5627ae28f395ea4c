use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{NeedsConfig, DEFAULT_NEEDS_FILE};
use crate::models::{timestamp, Need, NeedsRegistry, VersionBucket};

/// Build cache removed after every write so the next build starts clean
pub const DOCTREES_DIR: &str = ".doctrees";

/// Outcome of [`NeedsList::load_json`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The registry was replaced by the file's content
    Loaded,
    /// No file at the path
    Missing,
    /// The file exists but could not be read
    Unreadable,
    /// The file is not a valid needs registry
    Invalid,
}

/// Registry of needs for one documentation build, persisted as needs.json
pub struct NeedsList {
    config: NeedsConfig,
    outdir: PathBuf,
    current_version: String,
    project: String,
    needs_list: NeedsRegistry,
}

impl NeedsList {
    /// Creates an empty registry for the configured project
    pub fn new<P: AsRef<Path>>(config: NeedsConfig, outdir: P) -> Self {
        let current_version = config.version.clone();
        let project = config.project.clone();
        Self {
            needs_list: NeedsRegistry::new(project.clone(), current_version.clone()),
            config,
            outdir: outdir.as_ref().to_path_buf(),
            current_version,
            project,
        }
    }

    pub fn config(&self) -> &NeedsConfig {
        &self.config
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Path written by `write_json` when no file is given
    pub fn default_output_path(&self) -> PathBuf {
        self.outdir.join(DEFAULT_NEEDS_FILE)
    }

    pub fn registry(&self) -> &NeedsRegistry {
        &self.needs_list
    }

    pub fn version(&self, version: &str) -> Option<&VersionBucket> {
        self.needs_list.versions.get(version)
    }

    pub fn needs(&self, version: &str) -> Option<&BTreeMap<String, Need>> {
        self.version(version).map(|bucket| &bucket.needs)
    }

    /// Adds a need to `version`, replacing any need with the same id
    #[allow(clippy::too_many_arguments)]
    pub fn add_need(
        &mut self,
        version: &str,
        title: &str,
        need_id: &str,
        need_type: &str,
        need_type_name: Option<&str>,
        description: Option<&str>,
        status: Option<&str>,
        tags: Option<Vec<String>>,
        links: Option<Vec<String>>,
    ) {
        let need = Need {
            id: need_id.to_string(),
            title: title.to_string(),
            need_type: need_type.to_string(),
            type_name: need_type_name.map(str::to_string),
            description: description.map(str::to_string),
            status: status.map(str::to_string),
            tags,
            links,
            ..Default::default()
        };
        self.needs_list.insert_need(version, need);
    }

    /// Takes project and current version from the loaded registry where the
    /// configuration leaves them empty
    pub fn inherit_unset_identity(&mut self) {
        if self.project.is_empty() {
            self.project = self.needs_list.project.clone();
        }
        if self.current_version.is_empty() {
            self.current_version = self.needs_list.current_version.clone();
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Removes all needs of `version`. Unknown versions are ignored.
    pub fn wipe_version(&mut self, version: &str) {
        if self.needs_list.remove_version(version) {
            tracing::debug!(version, "wiped needs version");
        }
    }

    /// Writes the registry as sorted, 4-space indented JSON.
    ///
    /// Writes to `file` when given, otherwise to `<outdir>/needs.json`, and
    /// removes `<outdir>/.doctrees` afterwards. Returns the written path.
    pub fn write_json(&mut self, file: Option<&Path>) -> Result<PathBuf> {
        // Loading a foreign needs.json overwrites these, restore them from config
        self.needs_list.created = timestamp();
        self.needs_list.current_version = self.current_version.clone();
        self.needs_list.project = self.project.clone();

        let json = to_sorted_json(&self.needs_list)?;
        let path = file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output_path());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let lock = WriteLock::acquire(&path)?;
        fs::write(&path, json).with_context(|| format!("Failed to write needs file: {:?}", path))?;
        drop(lock);

        tracing::debug!(
            path = %path.display(),
            versions = self.needs_list.versions.len(),
            "wrote needs file"
        );

        let doctrees = self.outdir.join(DOCTREES_DIR);
        if doctrees.exists() {
            fs::remove_dir_all(&doctrees)
                .with_context(|| format!("Failed to remove build cache: {:?}", doctrees))?;
        }

        Ok(path)
    }

    /// Replaces the registry with the content of a needs.json file.
    ///
    /// Uses `file`, else the configured `needs_file`, else `needs.json`.
    /// A missing, unreadable or invalid file logs a warning and leaves the
    /// registry untouched.
    pub fn load_json(&mut self, file: Option<&Path>) -> LoadStatus {
        let path = self.load_path(file);

        if !path.exists() {
            tracing::warn!(path = %path.display(), "could not load needs json file");
            return LoadStatus::Missing;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "could not read needs json file");
                return LoadStatus::Unreadable;
            }
        };

        match serde_json::from_str::<NeedsRegistry>(&content) {
            Ok(needs_list) => {
                self.needs_list = needs_list;
                LoadStatus::Loaded
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "could not decode needs json file");
                LoadStatus::Invalid
            }
        }
    }

    fn load_path(&self, file: Option<&Path>) -> PathBuf {
        file.map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.needs_file())
    }
}

/// Serializes with keys in sorted order and 4-space indentation
fn to_sorted_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    // serde_json maps are ordered by key, so going through a Value sorts flattened keys too
    let value = serde_json::to_value(value).context("Failed to serialize needs registry")?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize needs registry")?;
    Ok(buf)
}

/// Exclusive lock on `<file>.lock` for the duration of a write.
/// The lock file is removed again when the guard is dropped.
struct WriteLock {
    file: Option<File>,
    path: PathBuf,
}

impl WriteLock {
    fn acquire(target: &Path) -> Result<Self> {
        let mut name = target.as_os_str().to_owned();
        name.push(".lock");
        let path = PathBuf::from(name);

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to create lock file: {:?}", path))?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire lock on {:?}", path))?;
        let _ = writeln!(file, "Locked by PID {}", std::process::id());

        Ok(Self {
            file: Some(file),
            path,
        })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        // Close (and unlock) before removing, Windows refuses to delete open files
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
        let _ = fs::remove_file(&self.path);
    }
}
