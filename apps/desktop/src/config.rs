use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use illustration::{ImagenConfig, DEFAULT_IMAGEN_BASE_URL, DEFAULT_IMAGEN_MODEL};
use serde::Deserialize;
use shared::{domain::Vocabulary, vocabulary_file::VocabularyFile};

pub const DEFAULT_CONFIG_FILE: &str = "spelling-zoo.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub imagen_model: String,
    pub imagen_base_url: String,
    pub illustration_timeout_secs: u64,
    pub vocabulary_path: Option<PathBuf>,
    pub speech_command: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            imagen_model: DEFAULT_IMAGEN_MODEL.into(),
            imagen_base_url: DEFAULT_IMAGEN_BASE_URL.into(),
            illustration_timeout_secs: 30,
            vocabulary_path: None,
            speech_command: None,
        }
    }
}

impl Settings {
    pub fn illustration_timeout(&self) -> Option<Duration> {
        (self.illustration_timeout_secs > 0)
            .then(|| Duration::from_secs(self.illustration_timeout_secs))
    }

    pub fn imagen_config(&self) -> ImagenConfig {
        ImagenConfig {
            api_key: self.api_key.clone(),
            model: self.imagen_model.clone(),
            base_url: self.imagen_base_url.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_key: Option<String>,
    imagen_model: Option<String>,
    imagen_base_url: Option<String>,
    illustration_timeout_secs: Option<u64>,
    vocabulary_path: Option<PathBuf>,
    speech_command: Option<String>,
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicitly requested config file must exist; the default
/// `spelling-zoo.toml` in the working directory is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if required || path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file_settings(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.api_key {
        settings.api_key = Some(v);
    }
    if let Some(v) = file_cfg.imagen_model {
        settings.imagen_model = v;
    }
    if let Some(v) = file_cfg.imagen_base_url {
        settings.imagen_base_url = v;
    }
    if let Some(v) = file_cfg.illustration_timeout_secs {
        settings.illustration_timeout_secs = v;
    }
    if let Some(v) = file_cfg.vocabulary_path {
        settings.vocabulary_path = Some(v);
    }
    if let Some(v) = file_cfg.speech_command {
        settings.speech_command = Some(v);
    }

    Ok(())
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = non_empty("GEMINI_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = non_empty("APP__API_KEY") {
        settings.api_key = Some(v);
    }

    if let Some(v) = non_empty("APP__IMAGEN_MODEL") {
        settings.imagen_model = v;
    }
    if let Some(v) = non_empty("APP__IMAGEN_BASE_URL") {
        settings.imagen_base_url = v;
    }

    if let Some(v) = non_empty("APP__ILLUSTRATION_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.illustration_timeout_secs = parsed;
        }
    }

    if let Some(v) = non_empty("APP__VOCABULARY_PATH") {
        settings.vocabulary_path = Some(PathBuf::from(v));
    }
    if let Some(v) = non_empty("APP__SPEECH_COMMAND") {
        settings.speech_command = Some(v);
    }
}

/// Reads a TOML or JSON vocabulary file, or falls back to the built-in list.
pub fn load_vocabulary(path: Option<&Path>) -> anyhow::Result<Vocabulary> {
    let Some(path) = path else {
        return Ok(Vocabulary::builtin_animals());
    };

    VocabularyFile::read(path)
        .and_then(VocabularyFile::into_vocabulary)
        .with_context(|| format!("failed to load vocabulary from '{}'", path.display()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
