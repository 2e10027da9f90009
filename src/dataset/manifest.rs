// Dataset manifest - which audio files belong to which class
//
// The JSON manifest is the primary source of labels:
//
//   { "entries": [ { "path": "clips/a01.wav", "class": "apple" }, ... ] }
//
// Relative paths are resolved against the manifest's directory.
// `discover_by_filename` builds a manifest by scanning a directory and
// matching class names inside file names.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ClassLabelMap;
use crate::audio::is_audio_file;
use crate::error::DatasetError;

/// One labeled audio file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub class: String,
}

/// Ordered list of labeled audio files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub entries: Vec<ManifestEntry>,
}

impl DatasetManifest {
    /// Load a manifest from JSON
    ///
    /// # Errors
    /// `DatasetError::ManifestInvalid` when the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| DatasetError::ManifestInvalid {
            reason: format!("reading {}: {}", path.display(), err),
        })?;
        let mut manifest: Self =
            serde_json::from_str(&json).map_err(|err| DatasetError::ManifestInvalid {
                reason: format!("parsing {}: {}", path.display(), err),
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for entry in &mut manifest.entries {
            if entry.path.is_relative() {
                entry.path = base.join(&entry.path);
            }
        }

        log::info!(
            "[Manifest] Loaded {} entries from {}",
            manifest.entries.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Write the manifest as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        let path = path.as_ref();
        let json =
            serde_json::to_string_pretty(self).map_err(|err| DatasetError::ManifestInvalid {
                reason: err.to_string(),
            })?;
        fs::write(path, json).map_err(|err| DatasetError::ManifestInvalid {
            reason: format!("writing {}: {}", path.display(), err),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entry's class name to its code
    ///
    /// # Errors
    /// `DatasetError::UnknownClass` for the first class name not in `labels`
    pub fn resolve(&self, labels: &ClassLabelMap) -> Result<Vec<(PathBuf, usize)>, DatasetError> {
        self.entries
            .iter()
            .map(|entry| Ok((entry.path.clone(), labels.code(&entry.class)?)))
            .collect()
    }
}

/// Build a manifest from the audio files (`.wav`, `.mp3`, `.m4a`) directly
/// inside `dir`
///
/// Compressed clips are listed like WAV files; the loader then reports them
/// as per-file `UnsupportedFormat` failures.
///
/// Each file is assigned the first class (in code order) whose name appears
/// in its file name; files matching no class are skipped. Entries are sorted
/// by path so the result does not depend on directory iteration order.
pub fn discover_by_filename<P: AsRef<Path>>(
    dir: P,
    labels: &ClassLabelMap,
) -> Result<DatasetManifest, DatasetError> {
    let dir = dir.as_ref();
    let read_error = |err: std::io::Error| DatasetError::ManifestInvalid {
        reason: format!("scanning {}: {}", dir.display(), err),
    };

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if !entry.file_type().map_err(read_error)?.is_file() {
            continue;
        }
        let path = entry.path();
        if !is_audio_file(&path) {
            continue;
        }

        match labels
            .guess_from_filename(&path)
            .and_then(|code| labels.name(code))
        {
            Some(class) => entries.push(ManifestEntry {
                path,
                class: class.to_string(),
            }),
            None => {
                log::debug!("[Manifest] No class name in {}, skipping", path.display());
                skipped += 1;
            }
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    log::info!(
        "[Manifest] Discovered {} labeled files in {} ({} unlabeled skipped)",
        entries.len(),
        dir.display(),
        skipped
    );
    Ok(DatasetManifest { entries })
}
