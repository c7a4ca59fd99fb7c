//! # HBnB Domain Model
//!
//! Validated entities (users, places, amenities, reviews) and the traits the
//! repository and facade layers rely on.
//!
//! Entities never hold each other by reference. Relationships are kept as
//! id sets on both sides and resolved through the repositories.

pub mod errors;
pub mod base;
pub mod user;
pub mod amenity;
pub mod place;
pub mod review;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub use amenity::{Amenity, AmenityPatch, AmenityView};
pub use base::Record;
pub use errors::{ModelError, ModelResult};
pub use place::{Place, PlaceDetail, PlacePatch, PlaceSummary, PlaceView};
pub use review::{Review, ReviewPatch, ReviewView};
pub use user::{User, UserPatch, UserSummary, UserView};

/// A storable domain entity
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Partial update accepted by [`Entity::apply_patch`]
    type Patch: Send + Sync;

    /// Collection name (used for table files and error messages)
    const KIND: &'static str;

    /// Common metadata
    fn record(&self) -> &Record;

    /// Entity identifier
    fn id(&self) -> Uuid {
        self.record().id
    }

    /// Apply a partial update, re-validating the touched fields.
    ///
    /// Must leave `self` untouched on error.
    fn apply_patch(&mut self, patch: &Self::Patch) -> ModelResult<()>;

    /// Keys that must be unique across the collection, as `(name, value)`
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Entities that belong to exactly one user
pub trait OwnedByUser {
    /// The owning user's id
    fn owner_id(&self) -> Uuid;

    /// Whether `user_id` owns this entity
    fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id() == user_id
    }
}
