use common::errors::AppError;
use common::models::TemperatureUnit;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

pub const FAVORITES_KEY: &str = "favorites";
pub const UNIT_KEY: &str = "unit";

/// Key-value storage for user preferences.
pub trait PreferencesStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, AppError>;
    fn save(&self, key: &str, value: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferencesStore for MemoryPreferences {
    fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as a flat JSON object of strings in a single file.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, AppError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            AppError::storage(format!(
                "preferences file {} is not valid: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl PreferencesStore for FilePreferences {
    fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock();

        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&values)
            .map_err(|e| AppError::storage(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Typed view over the two stored preferences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub favorites: Vec<String>,
    pub unit: TemperatureUnit,
}

impl Preferences {
    /// Read preferences, falling back to defaults for values that don't parse.
    pub fn load(store: &dyn PreferencesStore) -> Result<Self, AppError> {
        let favorites: Vec<String> = match store.load(FAVORITES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored favorites are malformed, starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let unit = match store.load(UNIT_KEY)? {
            Some(raw) => raw.parse::<TemperatureUnit>().unwrap_or_else(|e: String| {
                warn!(error = %e, "Stored unit is malformed, using Celsius");
                TemperatureUnit::default()
            }),
            None => TemperatureUnit::default(),
        };

        Ok(Self { favorites, unit })
    }

    pub fn save_favorites(store: &dyn PreferencesStore, favorites: &[String]) -> Result<(), AppError> {
        let json = serde_json::to_string(favorites).map_err(|e| AppError::storage(e.to_string()))?;
        store.save(FAVORITES_KEY, &json)
    }

    pub fn save_unit(store: &dyn PreferencesStore, unit: TemperatureUnit) -> Result<(), AppError> {
        store.save(UNIT_KEY, unit.as_str())
    }
}
