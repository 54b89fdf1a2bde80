//! User settings for fieldlog
//!
//! Selects the persistence backend, holds the Supabase connection details,
//! and carries the inspector identity used by the local backend.

use serde::{Deserialize, Serialize};

use super::paths::FieldLogPaths;
use crate::error::FieldLogError;

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const ACCESS_TOKEN_ENV: &str = "FIELDLOG_ACCESS_TOKEN";

/// Where drafts are submitted and audit entries are appended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSONL audit log and JSON drafts on disk
    #[default]
    Local,
    /// Hosted Supabase project
    Supabase,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Supabase => write!(f, "supabase"),
        }
    }
}

/// Connection settings for a Supabase project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub anon_key: Option<String>,

    /// Session access token of the signed-in inspector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default = "default_audit_table")]
    pub audit_table: String,

    #[serde(default = "default_profiles_table")]
    pub profiles_table: String,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            access_token: None,
            audit_table: default_audit_table(),
            profiles_table: default_profiles_table(),
        }
    }
}

fn default_audit_table() -> String {
    "audit_log".to_string()
}

fn default_profiles_table() -> String {
    "user_profiles".to_string()
}

/// Inspector identity recorded on local audit entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectorSettings {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// User settings for fieldlog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub supabase: SupabaseSettings,

    #[serde(default)]
    pub inspector: InspectorSettings,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backend: BackendKind::default(),
            supabase: SupabaseSettings::default(),
            inspector: InspectorSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    ///
    /// Environment overrides are applied on top of whatever was loaded.
    pub fn load_or_create(paths: &FieldLogPaths) -> Result<Self, FieldLogError> {
        let settings_path = paths.settings_file();

        let mut settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                FieldLogError::Io(format!("Failed to read settings file: {}", e))
            })?;

            serde_json::from_str(&contents).map_err(|e| {
                FieldLogError::Config(format!("Failed to parse settings file: {}", e))
            })?
        } else {
            // Don't save yet - let caller decide when to persist
            Settings::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Apply `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `FIELDLOG_ACCESS_TOKEN`
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = non_empty_env(SUPABASE_URL_ENV) {
            self.supabase.url = Some(url);
        }
        if let Some(key) = non_empty_env(SUPABASE_ANON_KEY_ENV) {
            self.supabase.anon_key = Some(key);
        }
        if let Some(token) = non_empty_env(ACCESS_TOKEN_ENV) {
            self.supabase.access_token = Some(token);
        }
    }

    /// Check that the selected backend has everything it needs
    pub fn validate(&self) -> Result<(), FieldLogError> {
        if self.backend == BackendKind::Supabase {
            if self.supabase.url.as_deref().map_or(true, str::is_empty) {
                return Err(FieldLogError::Config(format!(
                    "Supabase backend selected but no URL configured (set {})",
                    SUPABASE_URL_ENV
                )));
            }
            if self.supabase.anon_key.as_deref().map_or(true, str::is_empty) {
                return Err(FieldLogError::Config(format!(
                    "Supabase backend selected but no anon key configured (set {})",
                    SUPABASE_ANON_KEY_ENV
                )));
            }
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FieldLogPaths) -> Result<(), FieldLogError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            FieldLogError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            FieldLogError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Mask a secret for display, keeping only the last four characters
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.backend, BackendKind::Local);
        assert_eq!(settings.supabase.audit_table, "audit_log");
        assert_eq!(settings.supabase.profiles_table, "user_profiles");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FieldLogPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.inspector.name = Some("Dana Reyes".into());
        settings.inspector.role = Some("Chief Inspector".into());
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.inspector.name.as_deref(), Some("Dana Reyes"));
        assert_eq!(loaded.inspector.role.as_deref(), Some("Chief Inspector"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FieldLogPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"backend": "supabase"}"#).unwrap();

        let settings: Settings =
            serde_json::from_str(&std::fs::read_to_string(paths.settings_file()).unwrap())
                .unwrap();
        assert_eq!(settings.backend, BackendKind::Supabase);
        assert_eq!(settings.supabase.audit_table, "audit_log");
    }

    #[test]
    fn test_supabase_requires_url_and_key() {
        let mut settings = Settings::default();
        settings.backend = BackendKind::Supabase;
        assert!(matches!(settings.validate(), Err(FieldLogError::Config(_))));

        settings.supabase.url = Some("https://example.supabase.co".into());
        assert!(settings.validate().is_err());

        settings.supabase.anon_key = Some("anon".into());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("eyJhbGciOiJIUzI1"), "****UzI1");
    }
}
