//! # Review
//!
//! A guest's rating and comment on a place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::base::{require_text, Record};
use super::errors::{ModelError, ModelResult};
use super::place::Place;
use super::user::User;
use super::{Entity, OwnedByUser};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Review model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    pub record: Record,

    pub text: String,

    /// 1..=5
    pub rating: u8,

    pub place_id: Uuid,

    /// Author
    pub user_id: Uuid,
}

/// Partial review update
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub text: Option<String>,
    pub rating: Option<i64>,
}

/// Check a rating against the 1..=5 bound
pub fn validate_rating(rating: i64) -> ModelResult<u8> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ModelError::validation("Rating must be between 1 and 5"));
    }
    u8::try_from(rating).map_err(|_| ModelError::validation("Rating must be between 1 and 5"))
}

impl Review {
    /// Validate and register the review with both the place and its author.
    pub fn new(text: String, rating: i64, place: &mut Place, author: &mut User) -> ModelResult<Self> {
        require_text("Review text", &text, None)?;
        let rating = validate_rating(rating)?;

        let review = Self {
            record: Record::new(),
            text,
            rating,
            place_id: place.record.id,
            user_id: author.record.id,
        };
        place.add_review(review.record.id);
        author.add_review(review.record.id);
        Ok(review)
    }

    /// Change the rating, keeping the 1..=5 bound
    pub fn update_rating(&mut self, rating: i64) -> ModelResult<()> {
        self.rating = validate_rating(rating)?;
        self.record.touch();
        Ok(())
    }

    pub fn view(&self) -> ReviewView {
        ReviewView {
            id: self.record.id,
            text: self.text.clone(),
            rating: self.rating,
            user_id: self.user_id,
            place_id: self.place_id,
            created_at: self.record.created_at,
            updated_at: self.record.updated_at,
        }
    }

    /// Key identifying the (author, place) pair
    pub fn author_place_key(user_id: Uuid, place_id: Uuid) -> String {
        format!("{}:{}", user_id, place_id)
    }
}

impl Entity for Review {
    type Patch = ReviewPatch;

    const KIND: &'static str = "reviews";

    fn record(&self) -> &Record {
        &self.record
    }

    fn apply_patch(&mut self, patch: &ReviewPatch) -> ModelResult<()> {
        if let Some(text) = &patch.text {
            require_text("Review text", text, None)?;
        }
        if let Some(rating) = patch.rating {
            self.update_rating(rating)?;
        }
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        self.record.touch();
        Ok(())
    }

    /// At most one review per (author, place)
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("author_place", Self::author_place_key(self.user_id, self.place_id))]
    }
}

impl OwnedByUser for Review {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Review as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    pub id: Uuid,
    pub text: String,
    pub rating: u8,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
