use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Best-ever results, cumulative across all runs.
/// Serialized field names match the original `mathStats` record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeStats {
    pub high_score: u64,
    pub total_solved: u64,
}

impl LifetimeStats {
    /// Apply one correct answer: both fields move in a single transition so
    /// no caller can observe a half-updated record
    pub fn record_correct(&mut self, combo: usize) {
        self.high_score = self.high_score.max(combo as u64);
        self.total_solved += 1;
    }
}

/// Display preferences, persisted independently of the stats record
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub dark_mode: bool,
}

pub trait StatsStore {
    fn load(&self) -> LifetimeStats;
    fn save(&self, stats: &LifetimeStats) -> io::Result<()>;
    /// Erase the persisted record; a following `load` yields the default
    fn clear(&self) -> io::Result<()>;
}

pub trait PrefsStore {
    fn load(&self) -> Preferences;
    fn save(&self, prefs: &Preferences) -> io::Result<()>;
}

const STATS_FILE: &str = "stats.json";
const SETTINGS_FILE: &str = "settings.json";

fn default_path(file: &str) -> PathBuf {
    if let Some(pd) = ProjectDirs::from("", "", "mathflow") {
        pd.config_dir().join(file)
    } else {
        PathBuf::from(format!("mathflow_{}", file))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(value).unwrap_or_default();
    fs::write(path, data)
}

fn read_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> T {
    if let Ok(bytes) = fs::read(path) {
        if let Ok(value) = serde_json::from_slice::<T>(&bytes) {
            return value;
        }
    }
    // Missing or unparseable records fall back to the documented default
    T::default()
}

#[derive(Debug, Clone)]
pub struct FileStatsStore {
    path: PathBuf,
}

impl FileStatsStore {
    pub fn new() -> Self {
        Self {
            path: default_path(STATS_FILE),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsStore for FileStatsStore {
    fn load(&self) -> LifetimeStats {
        read_json(&self.path)
    }

    fn save(&self, stats: &LifetimeStats) -> io::Result<()> {
        write_json(&self.path, stats)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilePrefsStore {
    path: PathBuf,
}

impl FilePrefsStore {
    pub fn new() -> Self {
        Self {
            path: default_path(SETTINGS_FILE),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FilePrefsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefsStore for FilePrefsStore {
    fn load(&self) -> Preferences {
        read_json(&self.path)
    }

    fn save(&self, prefs: &Preferences) -> io::Result<()> {
        write_json(&self.path, prefs)
    }
}
