//! On-disk vocabulary format.
//!
//! ```toml
//! [[items]]
//! id = 1
//! prompt = "มด"
//! answer = "ant"
//! glyph = "🐜"
//! ```
//!
//! The same shape is accepted as JSON (`{"items": [...]}`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Vocabulary, VocabularyItem},
    error::VocabularyError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyFile {
    pub items: Vec<VocabularyEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: i64,
    pub prompt: String,
    pub answer: String,
    #[serde(default = "default_glyph")]
    pub glyph: String,
}

fn default_glyph() -> String {
    "❓".to_string()
}

impl VocabularyFile {
    pub fn from_toml_str(raw: &str) -> Result<Self, VocabularyError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, VocabularyError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads a vocabulary file, choosing JSON or TOML by extension.
    pub fn read(path: &Path) -> Result<Self, VocabularyError> {
        let raw = std::fs::read_to_string(path)?;
        if is_json_path(path) {
            Self::from_json_str(&raw)
        } else {
            Self::from_toml_str(&raw)
        }
    }

    pub fn from_vocabulary(vocabulary: &Vocabulary) -> Self {
        Self {
            items: vocabulary
                .items()
                .iter()
                .map(|item| VocabularyEntry {
                    id: item.id.0,
                    prompt: item.prompt_text.clone(),
                    answer: item.answer_text.clone(),
                    glyph: item.accent_glyph.clone(),
                })
                .collect(),
        }
    }

    pub fn into_vocabulary(self) -> Result<Vocabulary, VocabularyError> {
        Vocabulary::new(
            self.items
                .into_iter()
                .map(|entry| VocabularyItem::new(entry.id, entry.prompt, entry.answer, entry.glyph))
                .collect(),
        )
    }
}

pub fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml_items_in_order() {
        let raw = r#"
            [[items]]
            id = 10
            prompt = "แมว"
            answer = "cat"
            glyph = "🐱"

            [[items]]
            id = 3
            prompt = "สุนัข"
            answer = "dog"
        "#;

        let vocabulary = VocabularyFile::from_toml_str(raw)
            .expect("parse")
            .into_vocabulary()
            .expect("valid");

        assert_eq!(vocabulary.len(), 2);
        assert_eq!(vocabulary.get(0).map(|i| i.id.0), Some(10));
        assert_eq!(vocabulary.get(1).map(|i| i.accent_glyph.as_str()), Some("❓"));
    }

    #[test]
    fn reports_toml_syntax_errors() {
        let err = VocabularyFile::from_toml_str("[[items]]\nid = ").expect_err("bad toml");
        assert!(matches!(err, VocabularyError::Parse(_)));
    }

    #[test]
    fn empty_item_list_fails_validation() {
        let err = VocabularyFile::from_json_str(r#"{"items": []}"#)
            .expect("parse")
            .into_vocabulary()
            .expect_err("empty");
        assert!(matches!(err, VocabularyError::Empty));
    }

    #[test]
    fn builtin_list_survives_file_conversion() {
        let builtin = Vocabulary::builtin_animals();
        let converted = VocabularyFile::from_vocabulary(&builtin)
            .into_vocabulary()
            .expect("valid");
        assert_eq!(converted, builtin);
    }

    #[test]
    fn reports_json_syntax_errors() {
        let err = VocabularyFile::from_json_str("{\"items\": [").expect_err("bad json");
        assert!(matches!(err, VocabularyError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = VocabularyFile::read(Path::new("/nonexistent/spelling-zoo/words.toml"))
            .expect_err("missing");
        assert!(matches!(err, VocabularyError::Io(_)));
    }

    #[test]
    fn detects_json_extension() {
        assert!(is_json_path(Path::new("words.JSON")));
        assert!(!is_json_path(Path::new("words.toml")));
        assert!(!is_json_path(Path::new("words")));
    }
}
