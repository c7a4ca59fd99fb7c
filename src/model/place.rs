//! # Place
//!
//! A rental listing. The owner and coordinates are fixed at creation; title,
//! description, price and the amenity set may change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amenity::Amenity;
use super::base::{insert_unique, remove_id, require_text, Record};
use super::errors::{ModelError, ModelResult};
use super::review::Review;
use super::user::{User, UserSummary};
use super::{Entity, OwnedByUser};

/// Maximum length of a place title
pub const TITLE_MAX_CHARS: usize = 100;

/// Place model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    #[serde(flatten)]
    pub record: Record,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Price per night, strictly positive
    pub price: f64,

    pub latitude: f64,

    pub longitude: f64,

    pub owner_id: Uuid,

    /// Amenities offered, in insertion order, without duplicates
    #[serde(default)]
    pub amenity_ids: Vec<Uuid>,

    /// Reviews of this place, in insertion order
    #[serde(default)]
    pub review_ids: Vec<Uuid>,
}

/// Partial place update. Owner and coordinates are not patchable.
#[derive(Debug, Clone, Default)]
pub struct PlacePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

impl Place {
    /// Validate the listing and register it with its owner.
    pub fn new(
        title: String,
        description: Option<String>,
        price: f64,
        latitude: f64,
        longitude: f64,
        owner: &mut User,
    ) -> ModelResult<Self> {
        validate_title(&title)?;
        validate_price(price)?;
        validate_latitude(latitude)?;
        validate_longitude(longitude)?;

        let place = Self {
            record: Record::new(),
            title,
            description,
            price,
            latitude,
            longitude,
            owner_id: owner.record.id,
            amenity_ids: Vec::new(),
            review_ids: Vec::new(),
        };
        owner.add_place(place.record.id);
        Ok(place)
    }

    /// Offer `amenity` here. Idempotent on both sides.
    pub fn add_amenity(&mut self, amenity: &mut Amenity) {
        insert_unique(&mut self.amenity_ids, amenity.record.id);
        insert_unique(&mut amenity.place_ids, self.record.id);
    }

    /// Stop offering `amenity`. No-op for non-members.
    pub fn remove_amenity(&mut self, amenity: &mut Amenity) {
        remove_id(&mut self.amenity_ids, amenity.record.id);
        remove_id(&mut amenity.place_ids, self.record.id);
    }

    pub fn has_amenity(&self, amenity_id: Uuid) -> bool {
        self.amenity_ids.contains(&amenity_id)
    }

    pub fn add_review(&mut self, review_id: Uuid) {
        insert_unique(&mut self.review_ids, review_id);
    }

    pub fn remove_review(&mut self, review_id: Uuid) {
        remove_id(&mut self.review_ids, review_id);
    }

    /// Mean rating of the reviews of this place among `reviews`, 0 if none.
    pub fn average_rating<'a>(&self, reviews: impl IntoIterator<Item = &'a Review>) -> f64 {
        let (total, count) = reviews
            .into_iter()
            .filter(|review| review.place_id == self.record.id)
            .fold((0u64, 0u64), |(total, count), review| {
                (total + u64::from(review.rating), count + 1)
            });

        if count == 0 {
            return 0.0;
        }
        total as f64 / count as f64
    }

    pub fn view(&self) -> PlaceView {
        PlaceView {
            id: self.record.id,
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            latitude: self.latitude,
            longitude: self.longitude,
            owner_id: self.owner_id,
            amenities: self.amenity_ids.clone(),
            created_at: self.record.created_at,
            updated_at: self.record.updated_at,
        }
    }

    /// Cheap view for list endpoints
    pub fn summary(&self) -> PlaceSummary {
        PlaceSummary {
            id: self.record.id,
            title: self.title.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Full view with the owner, amenities and reviews resolved one hop deep.
    ///
    /// `amenities` and `reviews` may contain unrelated entries; only members
    /// of this place are included, in this place's order.
    pub fn detail(&self, owner: Option<&User>, amenities: &[Amenity], reviews: &[Review]) -> PlaceDetail {
        let amenity_refs = self
            .amenity_ids
            .iter()
            .filter_map(|id| amenities.iter().find(|a| a.record.id == *id))
            .map(|a| AmenityRef {
                id: a.record.id,
                name: a.name.clone(),
            })
            .collect();

        let own_reviews: Vec<&Review> = self
            .review_ids
            .iter()
            .filter_map(|id| reviews.iter().find(|r| r.record.id == *id))
            .collect();

        let review_refs = own_reviews
            .iter()
            .map(|r| ReviewRef {
                id: r.record.id,
                text: r.text.clone(),
                rating: r.rating,
                user_id: r.user_id,
            })
            .collect();

        PlaceDetail {
            id: self.record.id,
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            latitude: self.latitude,
            longitude: self.longitude,
            owner_id: self.owner_id,
            owner: owner.map(User::summary),
            amenities: amenity_refs,
            reviews: review_refs,
            average_rating: self.average_rating(own_reviews.iter().copied()),
            created_at: self.record.created_at,
            updated_at: self.record.updated_at,
        }
    }
}

fn validate_title(title: &str) -> ModelResult<()> {
    require_text("Title", title, Some(TITLE_MAX_CHARS))
}

fn validate_price(price: f64) -> ModelResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ModelError::validation("Price must be a positive value"));
    }
    Ok(())
}

fn validate_latitude(latitude: f64) -> ModelResult<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ModelError::validation(
            "Latitude must be between -90.0 and 90.0",
        ));
    }
    Ok(())
}

fn validate_longitude(longitude: f64) -> ModelResult<()> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ModelError::validation(
            "Longitude must be between -180.0 and 180.0",
        ));
    }
    Ok(())
}

impl Entity for Place {
    type Patch = PlacePatch;

    const KIND: &'static str = "places";

    fn record(&self) -> &Record {
        &self.record
    }

    fn apply_patch(&mut self, patch: &PlacePatch) -> ModelResult<()> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }

        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        self.record.touch();
        Ok(())
    }
}

impl OwnedByUser for Place {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Place as returned after create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: Uuid,
    pub amenities: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List entry for `GET /places/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub id: Uuid,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRef {
    pub id: Uuid,
    pub text: String,
    pub rating: u8,
    pub user_id: Uuid,
}

/// Full view for `GET /places/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetail {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: Uuid,
    pub owner: Option<UserSummary>,
    pub amenities: Vec<AmenityRef>,
    pub reviews: Vec<ReviewRef>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
