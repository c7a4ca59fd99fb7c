//! # Amenity
//!
//! A named feature (wifi, pool, ...) that any number of places can offer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::base::{require_text, Record};
use super::errors::ModelResult;
use super::Entity;

/// Maximum length of an amenity name
pub const AMENITY_NAME_MAX_CHARS: usize = 50;

/// Amenity model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amenity {
    #[serde(flatten)]
    pub record: Record,

    pub name: String,

    /// Places offering this amenity
    #[serde(default)]
    pub place_ids: Vec<Uuid>,
}

/// Partial amenity update
#[derive(Debug, Clone, Default)]
pub struct AmenityPatch {
    pub name: Option<String>,
}

impl Amenity {
    pub fn new(name: String) -> ModelResult<Self> {
        validate_name(&name)?;
        Ok(Self {
            record: Record::new(),
            name,
            place_ids: Vec::new(),
        })
    }

    pub fn view(&self) -> AmenityView {
        AmenityView {
            id: self.record.id,
            name: self.name.clone(),
            created_at: self.record.created_at,
            updated_at: self.record.updated_at,
        }
    }
}

fn validate_name(name: &str) -> ModelResult<()> {
    require_text("Amenity name", name, Some(AMENITY_NAME_MAX_CHARS))
}

impl Entity for Amenity {
    type Patch = AmenityPatch;

    const KIND: &'static str = "amenities";

    fn record(&self) -> &Record {
        &self.record
    }

    fn apply_patch(&mut self, patch: &AmenityPatch) -> ModelResult<()> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
            self.name = name.clone();
        }
        self.record.touch();
        Ok(())
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}

/// Amenity as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityView {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
