//! Request payloads accepted by the facade.
//!
//! Fields a route must never change are still deserialized so the facade
//! can reject them explicitly instead of silently ignoring them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AmenityPatch, PlacePatch, ReviewPatch, UserPatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: Option<bool>,
    /// Rejected when present
    pub email: Option<String>,
    /// Rejected when present
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn touches_credentials(&self) -> bool {
        self.email.is_some() || self.password.is_some()
    }

    pub fn patch(&self) -> UserPatch {
        UserPatch {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_admin: self.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAmenity {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAmenity {
    pub name: Option<String>,
}

impl UpdateAmenity {
    pub fn patch(&self) -> AmenityPatch {
        AmenityPatch {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlace {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Ignored when the caller's identity is known
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    /// Amenity ids
    #[serde(default)]
    pub amenities: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlace {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    /// Replaces the whole amenity set when present
    pub amenities: Option<Vec<Uuid>>,
    /// Accepted only if unchanged
    pub latitude: Option<f64>,
    /// Accepted only if unchanged
    pub longitude: Option<f64>,
    /// Accepted only if unchanged
    pub owner_id: Option<Uuid>,
}

impl UpdatePlace {
    pub fn patch(&self) -> PlacePatch {
        PlacePatch {
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub text: String,
    pub rating: i64,
    pub place_id: Uuid,
    /// Ignored when the caller's identity is known
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub rating: Option<i64>,
}

impl UpdateReview {
    pub fn patch(&self) -> ReviewPatch {
        ReviewPatch {
            text: self.text.clone(),
            rating: self.rating,
        }
    }
}
