//! Character voice guidance produced by the Character Agent
//!
//! Guidance is never persisted. It lives for a single generation run:
//! the Character Agent decodes it from TOON and the Scene Writer renders it
//! into the prose prompt.

use serde::{Deserialize, Serialize};

use crate::domain::services::toon::{self, ToonMap};

/// The fields the Character Agent is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuidanceField {
    Emotional,
    Pov,
    Voice,
    Physical,
}

impl GuidanceField {
    pub const ALL: [GuidanceField; 4] = [
        GuidanceField::Emotional,
        GuidanceField::Pov,
        GuidanceField::Voice,
        GuidanceField::Physical,
    ];

    /// The TOON key for this field
    pub fn key(&self) -> &'static str {
        match self {
            Self::Emotional => "emotional",
            Self::Pov => "pov",
            Self::Voice => "voice",
            Self::Physical => "physical",
        }
    }
}

/// Decoded guidance mapping, in the order the model emitted it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guidance(ToonMap);

impl Guidance {
    /// Decode guidance from raw TOON text
    pub fn from_toon(text: &str) -> Self {
        Self(toon::decode(text))
    }

    /// Re-encode as TOON, in the original key order
    pub fn to_toon(&self) -> String {
        toon::encode(&self.0)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn field(&self, field: GuidanceField) -> Option<&str> {
        self.get(field.key())
    }

    /// Required fields the model left out
    pub fn missing_fields(&self) -> Vec<GuidanceField> {
        GuidanceField::ALL
            .into_iter()
            .filter(|f| self.field(*f).is_none())
            .collect()
    }

    /// Keys outside the required field set
    pub fn extra_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(k, _)| !GuidanceField::ALL.iter().any(|f| f.key() == k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
