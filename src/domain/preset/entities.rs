use super::PresetError;
use crate::domain::shared::{Entity, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(i64);

impl PresetId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// マッピング表の名前付きスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Preset {
    pub fn new(id: PresetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn description_or_placeholder(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description")
    }
}

impl Entity for Preset {
    type Id = PresetId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// 保存リクエスト `{name, description}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetDraft {
    pub name: String,
    pub description: String,
}

impl PresetDraft {
    pub fn new(name: &str, description: Option<&str>) -> Result<Self, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            description: description.map(str::trim).unwrap_or_default().to_string(),
        })
    }
}
