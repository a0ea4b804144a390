use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::VocabularyError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ItemId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: ItemId,
    /// Word shown to the learner, in their native language.
    pub prompt_text: String,
    /// Expected typed response in the target language.
    pub answer_text: String,
    /// Symbol displayed in place of an illustration that could not be fetched.
    pub accent_glyph: String,
}

impl VocabularyItem {
    pub fn new(
        id: i64,
        prompt_text: impl Into<String>,
        answer_text: impl Into<String>,
        accent_glyph: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId(id),
            prompt_text: prompt_text.into(),
            answer_text: answer_text.into(),
            accent_glyph: accent_glyph.into(),
        }
    }
}

/// Ordered, non-empty list of vocabulary items with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    items: Vec<VocabularyItem>,
}

impl Vocabulary {
    pub fn new(items: Vec<VocabularyItem>) -> Result<Self, VocabularyError> {
        if items.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(VocabularyError::DuplicateId(item.id.0));
            }
            if item.answer_text.trim().is_empty() {
                return Err(VocabularyError::BlankAnswer(item.id.0));
            }
        }

        Ok(Self { items })
    }

    /// Thai to English animal names.
    pub fn builtin_animals() -> Self {
        Self {
            items: vec![
                VocabularyItem::new(1, "มด", "ant", "🐜"),
                VocabularyItem::new(2, "นก", "bird", "🐦"),
                VocabularyItem::new(3, "แมว", "cat", "🐱"),
                VocabularyItem::new(4, "สุนัข", "dog", "🐶"),
                VocabularyItem::new(5, "เสือ", "tiger", "🐯"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    // Always false for a validated vocabulary.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VocabularyItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    AwaitingIllustration,
    Active,
    Answered,
    Finished,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingIllustration => "awaiting_illustration",
            Self::Active => "active",
            Self::Answered => "answered",
            Self::Finished => "finished",
        }
    }
}

/// Opaque reference to a displayable image, either a remote URL or an inline
/// `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn from_base64(mime_type: &str, bytes_b64: &str) -> Self {
        Self(format!("data:{mime_type};base64,{bytes_b64}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a `data:<mime>;base64,<payload>` reference into its mime type and
    /// base64 payload. Returns `None` for any other kind of reference.
    pub fn inline_parts(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        Some((mime_type, payload))
    }
}
