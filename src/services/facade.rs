//! # HBnB Facade
//!
//! Single entry point over the four repositories. Enforces the rules that
//! span entities: unique emails, ownership, no self-review, one review per
//! (author, place), and two-sided relationship maintenance.
//!
//! Mutations are serialized by one writer lock; reads go straight to the
//! repositories. Writes that touch several collections record an undo log
//! and roll back if a later step fails.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{FacadeError, FacadeResult};
use super::requests::{
    CreateAmenity, CreatePlace, CreateReview, CreateUser, UpdateAmenity, UpdatePlace, UpdateReview,
    UpdateUser,
};
use crate::auth::Caller;
use crate::model::{Amenity, Entity, OwnedByUser, Place, PlaceDetail, PlaceSummary, Review, User};
use crate::repository::{Repository, StorageConfig};

/// One compensating action
enum UndoStep {
    RemovePlace(Uuid),
    RemoveReview(Uuid),
    RestoreUser(User),
    RestorePlace(Place),
    RestoreAmenity(Amenity),
}

/// Undo log for a write spanning several collections
#[derive(Default)]
struct UndoLog {
    steps: Vec<UndoStep>,
}

impl UndoLog {
    fn push(&mut self, step: UndoStep) {
        self.steps.push(step);
    }

    /// Apply the recorded steps in reverse order. Failures are logged only.
    fn rollback(self, facade: &HbnbFacade) {
        for step in self.steps.into_iter().rev() {
            let result = match step {
                UndoStep::RemovePlace(id) => facade.places.delete(id).map(|_| ()),
                UndoStep::RemoveReview(id) => facade.reviews.delete(id).map(|_| ()),
                UndoStep::RestoreUser(user) => facade.users.replace(user).map(|_| ()),
                UndoStep::RestorePlace(place) => facade.places.replace(place).map(|_| ()),
                UndoStep::RestoreAmenity(amenity) => facade.amenities.replace(amenity).map(|_| ()),
            };
            if let Err(e) = result {
                warn!(error = %e, code = e.code(), "rollback step failed");
            }
        }
    }
}

/// `current` reordered to hold exactly the ids in `expected`, or `None`
/// when it already does. Surviving ids keep their order; missing ones are
/// appended in `expected` order.
fn realign(current: &[Uuid], expected: &[Uuid]) -> Option<Vec<Uuid>> {
    let same = current.len() == expected.len()
        && current.iter().all(|id| expected.contains(id))
        && expected.iter().all(|id| current.contains(id));
    if same {
        return None;
    }
    let mut ids: Vec<Uuid> = current
        .iter()
        .filter(|id| expected.contains(*id))
        .copied()
        .collect();
    ids.dedup();
    for id in expected {
        if !ids.contains(id) {
            ids.push(*id);
        }
    }
    Some(ids)
}

/// Service layer shared by every request handler
pub struct HbnbFacade {
    users: Arc<dyn Repository<User>>,
    places: Arc<dyn Repository<Place>>,
    amenities: Arc<dyn Repository<Amenity>>,
    reviews: Arc<dyn Repository<Review>>,
    writer: Mutex<()>,
}

impl HbnbFacade {
    /// Open all four collections on the configured backend and repair
    /// back-references left behind by an interrupted write.
    pub fn new(storage: &StorageConfig) -> FacadeResult<Self> {
        let facade = Self::with_repositories(
            storage.open::<User>()?,
            storage.open::<Place>()?,
            storage.open::<Amenity>()?,
            storage.open::<Review>()?,
        );
        facade.reconcile()?;
        Ok(facade)
    }

    pub fn with_repositories(
        users: Arc<dyn Repository<User>>,
        places: Arc<dyn Repository<Place>>,
        amenities: Arc<dyn Repository<Amenity>>,
        reviews: Arc<dyn Repository<Review>>,
    ) -> Self {
        Self {
            users,
            places,
            amenities,
            reviews,
            writer: Mutex::new(()),
        }
    }

    fn lock_writer(&self) -> FacadeResult<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| FacadeError::internal("facade writer lock poisoned"))
    }

    /// Run `op`; on error, roll back whatever it recorded.
    fn with_undo<T>(&self, op: impl FnOnce(&mut UndoLog) -> FacadeResult<T>) -> FacadeResult<T> {
        let mut undo = UndoLog::default();
        match op(&mut undo) {
            Ok(value) => Ok(value),
            Err(e) => {
                undo.rollback(self);
                Err(e)
            }
        }
    }

    /// Rebuild every back-reference id set from the authoritative side:
    /// `place.owner_id`, `review.place_id`, `review.user_id` and
    /// `place.amenity_ids`. Returns the number of rows rewritten.
    pub fn reconcile(&self) -> FacadeResult<usize> {
        let _guard = self.lock_writer()?;

        let places = self.places.get_all()?;
        let reviews = self.reviews.get_all()?;
        let mut repaired = 0;

        for user in self.users.get_all()? {
            let owned: Vec<Uuid> = places
                .iter()
                .filter(|p| p.owner_id == user.id())
                .map(|p| p.id())
                .collect();
            let written: Vec<Uuid> = reviews
                .iter()
                .filter(|r| r.user_id == user.id())
                .map(|r| r.id())
                .collect();
            let place_ids = realign(&user.place_ids, &owned);
            let review_ids = realign(&user.review_ids, &written);
            if place_ids.is_some() || review_ids.is_some() {
                let mut fixed = user;
                fixed.place_ids = place_ids.unwrap_or(fixed.place_ids);
                fixed.review_ids = review_ids.unwrap_or(fixed.review_ids);
                self.users.replace(fixed)?;
                repaired += 1;
            }
        }

        for place in &places {
            let received: Vec<Uuid> = reviews
                .iter()
                .filter(|r| r.place_id == place.id())
                .map(|r| r.id())
                .collect();
            if let Some(review_ids) = realign(&place.review_ids, &received) {
                let mut fixed = place.clone();
                fixed.review_ids = review_ids;
                self.places.replace(fixed)?;
                repaired += 1;
            }
        }

        for amenity in self.amenities.get_all()? {
            let offered_at: Vec<Uuid> = places
                .iter()
                .filter(|p| p.has_amenity(amenity.id()))
                .map(|p| p.id())
                .collect();
            if let Some(place_ids) = realign(&amenity.place_ids, &offered_at) {
                let mut fixed = amenity;
                fixed.place_ids = place_ids;
                self.amenities.replace(fixed)?;
                repaired += 1;
            }
        }

        if repaired > 0 {
            warn!(rows = repaired, "repaired dangling relationship ids");
        }
        Ok(repaired)
    }

    /// Owner or stored admin. `None` is the trusted admin path and skips the check.
    fn ensure_can_modify(
        &self,
        caller: Option<&Caller>,
        entity: &impl OwnedByUser,
        kind: &str,
        id: Uuid,
    ) -> FacadeResult<()> {
        let Some(caller) = caller else {
            return Ok(());
        };
        if caller.can_modify(entity, |user_id| self.is_admin(user_id)) {
            return Ok(());
        }
        warn!(caller = %caller.subject_id, kind, %id, "modification denied");
        Err(FacadeError::unauthorized_action())
    }

    // ==================
    // Users
    // ==================

    /// Validation and password hashing run before the writer lock is taken;
    /// the email check is repeated under it.
    pub fn create_user(&self, data: CreateUser) -> FacadeResult<User> {
        if self.get_user_by_email(&data.email)?.is_some() {
            return Err(FacadeError::validation("Email already registered"));
        }
        let user = User::new(
            data.first_name,
            data.last_name,
            data.email,
            &data.password,
            data.is_admin,
        )?;

        let _guard = self.lock_writer()?;
        if self.get_user_by_email(&user.email)?.is_some() {
            return Err(FacadeError::validation("Email already registered"));
        }
        let user = self.users.add(user)?;
        info!(user_id = %user.record.id, is_admin = user.is_admin, "user created");
        Ok(user)
    }

    pub fn get_user(&self, user_id: Uuid) -> FacadeResult<User> {
        self.users
            .get(user_id)?
            .ok_or_else(|| FacadeError::not_found("User not found"))
    }

    pub fn get_all_users(&self) -> FacadeResult<Vec<User>> {
        Ok(self.users.get_all()?)
    }

    /// Exact-match lookup
    pub fn get_user_by_email(&self, email: &str) -> FacadeResult<Option<User>> {
        Ok(self.users.get_by_attribute("email", &json!(email))?)
    }

    /// Update names or the admin flag. Email and password are immutable here.
    pub fn update_user(&self, user_id: Uuid, data: UpdateUser) -> FacadeResult<User> {
        let _guard = self.lock_writer()?;

        self.get_user(user_id)?;
        if data.touches_credentials() {
            return Err(FacadeError::validation("You cannot modify email or password."));
        }

        let user = self.users.update(user_id, &data.patch())?;
        info!(user_id = %user_id, "user updated");
        Ok(user)
    }

    /// Unknown users are not admins
    pub fn is_admin(&self, user_id: Uuid) -> bool {
        matches!(self.users.get(user_id), Ok(Some(user)) if user.is_admin)
    }

    // ==================
    // Amenities
    // ==================

    fn ensure_amenity_name_free(&self, name: &str, except: Option<Uuid>) -> FacadeResult<()> {
        match self.amenities.get_by_attribute("name", &json!(name))? {
            Some(existing) if Some(existing.id()) != except => {
                Err(FacadeError::validation("Amenity already exists"))
            }
            _ => Ok(()),
        }
    }

    pub fn create_amenity(&self, data: CreateAmenity) -> FacadeResult<Amenity> {
        let _guard = self.lock_writer()?;

        self.ensure_amenity_name_free(&data.name, None)?;
        let amenity = self.amenities.add(Amenity::new(data.name)?)?;
        info!(amenity_id = %amenity.record.id, name = %amenity.name, "amenity created");
        Ok(amenity)
    }

    pub fn get_amenity(&self, amenity_id: Uuid) -> FacadeResult<Amenity> {
        self.amenities
            .get(amenity_id)?
            .ok_or_else(|| FacadeError::not_found("Amenity not found"))
    }

    pub fn get_all_amenities(&self) -> FacadeResult<Vec<Amenity>> {
        Ok(self.amenities.get_all()?)
    }

    pub fn update_amenity(&self, amenity_id: Uuid, data: UpdateAmenity) -> FacadeResult<Amenity> {
        let _guard = self.lock_writer()?;

        if let Some(name) = &data.name {
            self.ensure_amenity_name_free(name, Some(amenity_id))?;
        }
        let amenity = self.amenities.update(amenity_id, &data.patch())?;
        info!(amenity_id = %amenity_id, "amenity updated");
        Ok(amenity)
    }

    // ==================
    // Places
    // ==================

    /// Fetch amenities by id, dropping duplicates. Unknown ids are a
    /// validation error.
    fn load_amenities(&self, ids: &[Uuid]) -> FacadeResult<Vec<Amenity>> {
        let mut amenities: Vec<Amenity> = Vec::with_capacity(ids.len());
        for id in ids {
            if amenities.iter().any(|a| a.id() == *id) {
                continue;
            }
            let amenity = self
                .amenities
                .get(*id)?
                .ok_or_else(|| FacadeError::validation(format!("Amenity {} not found", id)))?;
            amenities.push(amenity);
        }
        Ok(amenities)
    }

    /// Create a place. An explicit `owner_id` (the caller) wins over the
    /// payload's.
    pub fn create_place(&self, data: CreatePlace, owner_id: Option<Uuid>) -> FacadeResult<Place> {
        let _guard = self.lock_writer()?;

        let owner_id = owner_id
            .or(data.owner_id)
            .ok_or_else(|| FacadeError::validation("Owner is required"))?;
        let mut owner = self
            .users
            .get(owner_id)?
            .ok_or_else(|| FacadeError::validation("Owner not found"))?;
        let mut amenities = self.load_amenities(&data.amenities)?;

        let original_owner = owner.clone();
        let original_amenities = amenities.clone();

        let mut place = Place::new(
            data.title,
            data.description,
            data.price,
            data.latitude,
            data.longitude,
            &mut owner,
        )?;
        for amenity in &mut amenities {
            place.add_amenity(amenity);
        }

        let place = self.with_undo(|undo| {
            let place = self.places.add(place)?;
            undo.push(UndoStep::RemovePlace(place.id()));

            self.users.replace(owner)?;
            undo.push(UndoStep::RestoreUser(original_owner));

            for (amenity, original) in amenities.into_iter().zip(original_amenities) {
                self.amenities.replace(amenity)?;
                undo.push(UndoStep::RestoreAmenity(original));
            }
            Ok(place)
        })?;

        info!(
            place_id = %place.record.id,
            owner_id = %place.owner_id,
            amenities = place.amenity_ids.len(),
            "place created"
        );
        Ok(place)
    }

    pub fn get_place(&self, place_id: Uuid) -> FacadeResult<Place> {
        self.places
            .get(place_id)?
            .ok_or_else(|| FacadeError::not_found("Place not found"))
    }

    pub fn get_all_places(&self) -> FacadeResult<Vec<Place>> {
        Ok(self.places.get_all()?)
    }

    pub fn get_place_summaries(&self) -> FacadeResult<Vec<PlaceSummary>> {
        Ok(self.places.get_all()?.iter().map(Place::summary).collect())
    }

    /// Place with owner, amenities and reviews resolved
    pub fn get_place_detail(&self, place_id: Uuid) -> FacadeResult<PlaceDetail> {
        let place = self.get_place(place_id)?;
        let owner = self.users.get(place.owner_id)?;

        let mut amenities = Vec::with_capacity(place.amenity_ids.len());
        for id in &place.amenity_ids {
            if let Some(amenity) = self.amenities.get(*id)? {
                amenities.push(amenity);
            }
        }
        let mut reviews = Vec::with_capacity(place.review_ids.len());
        for id in &place.review_ids {
            if let Some(review) = self.reviews.get(*id)? {
                reviews.push(review);
            }
        }

        Ok(place.detail(owner.as_ref(), &amenities, &reviews))
    }

    /// Update a place. `caller` of `None` skips the ownership check.
    pub fn update_place(
        &self,
        place_id: Uuid,
        data: UpdatePlace,
        caller: Option<&Caller>,
    ) -> FacadeResult<Place> {
        let _guard = self.lock_writer()?;

        let place = self.get_place(place_id)?;
        self.ensure_can_modify(caller, &place, Place::KIND, place_id)?;

        let moves_owner = data.owner_id.is_some_and(|id| id != place.owner_id);
        let moves_latitude = data.latitude.is_some_and(|lat| lat != place.latitude);
        let moves_longitude = data.longitude.is_some_and(|lon| lon != place.longitude);
        if moves_owner || moves_latitude || moves_longitude {
            return Err(FacadeError::validation(
                "Place owner and coordinates cannot be changed",
            ));
        }

        let mut updated = place.clone();
        updated.apply_patch(&data.patch())?;

        let mut touched: Vec<(Amenity, Amenity)> = Vec::new();
        if let Some(requested) = &data.amenities {
            let wanted = self.load_amenities(requested)?;

            for id in place.amenity_ids.iter().filter(|id| !requested.contains(*id)) {
                if let Some(mut amenity) = self.amenities.get(*id)? {
                    let original = amenity.clone();
                    updated.remove_amenity(&mut amenity);
                    touched.push((amenity, original));
                }
            }
            for mut amenity in wanted {
                if updated.has_amenity(amenity.id()) {
                    continue;
                }
                let original = amenity.clone();
                updated.add_amenity(&mut amenity);
                touched.push((amenity, original));
            }
        }

        let updated = self.with_undo(|undo| {
            let updated = self.places.replace(updated)?;
            undo.push(UndoStep::RestorePlace(place));

            for (amenity, original) in touched {
                self.amenities.replace(amenity)?;
                undo.push(UndoStep::RestoreAmenity(original));
            }
            Ok(updated)
        })?;

        info!(place_id = %place_id, "place updated");
        Ok(updated)
    }

    // ==================
    // Reviews
    // ==================

    fn has_reviewed(&self, user_id: Uuid, place_id: Uuid) -> FacadeResult<bool> {
        Ok(self
            .reviews
            .get_all()?
            .iter()
            .any(|review| review.user_id == user_id && review.place_id == place_id))
    }

    /// Create a review. An explicit `author_id` (the caller) wins over the
    /// payload's `user_id`.
    pub fn create_review(&self, data: CreateReview, author_id: Option<Uuid>) -> FacadeResult<Review> {
        let _guard = self.lock_writer()?;

        let mut place = self
            .places
            .get(data.place_id)?
            .ok_or_else(|| FacadeError::not_found("Place not found"))?;
        let author_id = author_id
            .or(data.user_id)
            .ok_or_else(|| FacadeError::validation("User is required"))?;
        let mut author = self
            .users
            .get(author_id)?
            .ok_or_else(|| FacadeError::validation("User not found"))?;

        if place.is_owner(author_id) {
            return Err(FacadeError::validation("You cannot review your own place."));
        }
        if self.has_reviewed(author_id, place.id())? {
            return Err(FacadeError::validation("You have already reviewed this place."));
        }

        let original_place = place.clone();
        let original_author = author.clone();
        let review = Review::new(data.text, data.rating, &mut place, &mut author)?;

        let review = self.with_undo(|undo| {
            let review = self.reviews.add(review)?;
            undo.push(UndoStep::RemoveReview(review.id()));

            self.places.replace(place)?;
            undo.push(UndoStep::RestorePlace(original_place));

            self.users.replace(author)?;
            undo.push(UndoStep::RestoreUser(original_author));
            Ok(review)
        })?;

        info!(
            review_id = %review.record.id,
            place_id = %review.place_id,
            user_id = %review.user_id,
            rating = review.rating,
            "review created"
        );
        Ok(review)
    }

    pub fn get_review(&self, review_id: Uuid) -> FacadeResult<Review> {
        self.reviews
            .get(review_id)?
            .ok_or_else(|| FacadeError::not_found("Review not found"))
    }

    pub fn get_all_reviews(&self) -> FacadeResult<Vec<Review>> {
        Ok(self.reviews.get_all()?)
    }

    /// Reviews of one place, oldest first
    pub fn get_reviews_by_place(&self, place_id: Uuid) -> FacadeResult<Vec<Review>> {
        self.get_place(place_id)?;
        Ok(self
            .reviews
            .get_all()?
            .into_iter()
            .filter(|review| review.place_id == place_id)
            .collect())
    }

    /// Update a review. `caller` of `None` skips the ownership check.
    pub fn update_review(
        &self,
        review_id: Uuid,
        data: UpdateReview,
        caller: Option<&Caller>,
    ) -> FacadeResult<Review> {
        let _guard = self.lock_writer()?;

        let review = self.get_review(review_id)?;
        self.ensure_can_modify(caller, &review, Review::KIND, review_id)?;

        let review = self.reviews.update(review_id, &data.patch())?;
        info!(review_id = %review_id, rating = review.rating, "review updated");
        Ok(review)
    }

    /// Delete a review and detach it from its place and author.
    pub fn delete_review(&self, review_id: Uuid, caller: Option<&Caller>) -> FacadeResult<Review> {
        let _guard = self.lock_writer()?;

        let review = self.get_review(review_id)?;
        self.ensure_can_modify(caller, &review, Review::KIND, review_id)?;

        let place = self.places.get(review.place_id)?;
        let author = self.users.get(review.user_id)?;

        let removed = self.with_undo(|undo| {
            if let Some(place) = place {
                let mut detached = place.clone();
                detached.remove_review(review_id);
                self.places.replace(detached)?;
                undo.push(UndoStep::RestorePlace(place));
            }
            if let Some(author) = author {
                let mut detached = author.clone();
                detached.remove_review(review_id);
                self.users.replace(detached)?;
                undo.push(UndoStep::RestoreUser(author));
            }
            Ok(self.reviews.delete(review_id)?)
        })?;

        info!(review_id = %review_id, place_id = %removed.place_id, "review deleted");
        Ok(removed)
    }

    /// Mean rating of a place's reviews, 0 if none
    pub fn place_average_rating(&self, place_id: Uuid) -> FacadeResult<f64> {
        let place = self.get_place(place_id)?;
        let reviews = self.get_reviews_by_place(place_id)?;
        Ok(place.average_rating(&reviews))
    }
}
