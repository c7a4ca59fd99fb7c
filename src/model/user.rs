//! # User
//!
//! Account holder. Owns places and writes reviews; both are tracked as id
//! back-references. The password is only ever stored as an Argon2id hash.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::base::{insert_unique, remove_id, require_text, Record};
use super::errors::{ModelError, ModelResult};
use super::Entity;
use crate::auth::crypto::{hash_password, verify_password};

/// Maximum length of first and last names
pub const NAME_MAX_CHARS: usize = 50;

static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok()
});

/// Whether `email` has the `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub record: Record,

    pub first_name: String,

    pub last_name: String,

    /// Unique across users (enforced by the facade and the store)
    pub email: String,

    /// Argon2id password hash (never plaintext)
    pub password_hash: String,

    #[serde(default)]
    pub is_admin: bool,

    /// Places owned by this user
    #[serde(default)]
    pub place_ids: Vec<Uuid>,

    /// Reviews written by this user
    #[serde(default)]
    pub review_ids: Vec<Uuid>,
}

/// Fields that may change through the generic update path.
///
/// Email and password are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: Option<bool>,
}

impl User {
    /// Validate every field and hash the password.
    ///
    /// Fails on the first violated constraint; nothing is built on error.
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password: &str,
        is_admin: bool,
    ) -> ModelResult<Self> {
        require_text("First name", &first_name, Some(NAME_MAX_CHARS))?;
        require_text("Last name", &last_name, Some(NAME_MAX_CHARS))?;
        require_text("Email", &email, None)?;
        if !is_valid_email(&email) {
            return Err(ModelError::validation("Email is not a valid email"));
        }
        require_text("Password", password, None)?;

        let password_hash = hash_password(password).map_err(|_| ModelError::PasswordHashing)?;

        Ok(Self {
            record: Record::new(),
            first_name,
            last_name,
            email,
            password_hash,
            is_admin,
            place_ids: Vec::new(),
            review_ids: Vec::new(),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Verify a password against the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash).unwrap_or(false)
    }

    /// Register a place owned by this user
    pub fn add_place(&mut self, place_id: Uuid) {
        insert_unique(&mut self.place_ids, place_id);
    }

    /// Register a review written by this user
    pub fn add_review(&mut self, review_id: Uuid) {
        insert_unique(&mut self.review_ids, review_id);
    }

    pub fn remove_review(&mut self, review_id: Uuid) {
        remove_id(&mut self.review_ids, review_id);
    }

    /// Public view (no password hash)
    pub fn view(&self) -> UserView {
        UserView {
            id: self.record.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            created_at: self.record.created_at,
            updated_at: self.record.updated_at,
        }
    }

    /// One-hop view embedded in place details
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.record.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

impl Entity for User {
    type Patch = UserPatch;

    const KIND: &'static str = "users";

    fn record(&self) -> &Record {
        &self.record
    }

    fn apply_patch(&mut self, patch: &UserPatch) -> ModelResult<()> {
        if let Some(first_name) = &patch.first_name {
            require_text("First name", first_name, Some(NAME_MAX_CHARS))?;
        }
        if let Some(last_name) = &patch.last_name {
            require_text("Last name", last_name, Some(NAME_MAX_CHARS))?;
        }

        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        self.record.touch();
        Ok(())
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }
}

/// User as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner block embedded in place details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> User {
        User::new(
            "John".to_string(),
            "Doe".to_string(),
            "john.doe@example.com".to_string(),
            "secret123",
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_user_creation() {
        let user = john();
        assert_eq!(user.first_name, "John");
        assert_eq!(user.email, "john.doe@example.com");
        assert!(!user.is_admin);
        assert!(user.place_ids.is_empty());
        assert_ne!(user.password_hash, "secret123"); // Not plaintext!
    }

    #[test]
    fn test_full_name() {
        let names = [("John", "Doe"), ("Ada", "Lovelace"), ("Jean Luc", "Picard")];
        for (first, last) in names {
            let user = User::new(
                first.to_string(),
                last.to_string(),
                "someone@example.org".to_string(),
                "pw",
                false,
            )
            .unwrap();
            assert_eq!(user.full_name(), format!("{} {}", first, last));
        }
    }

    #[test]
    fn test_password_verification() {
        let user = john();
        assert!(user.verify_password("secret123"));
        assert!(!user.verify_password("wrong_password"));
    }

    #[test]
    fn test_email_shapes() {
        for valid in ["a@b.co", "john.doe@example.com", "x_y+z%1@sub.domain.org"] {
            assert!(is_valid_email(valid), "{} should be valid", valid);
        }
        for invalid in [
            "plainaddress",
            "@example.com",
            "john@",
            "john@example",
            "john@example.c",
            "john doe@example.com",
            "john@example.123",
        ] {
            assert!(!is_valid_email(invalid), "{} should be invalid", invalid);
        }
    }

    #[test]
    fn test_invalid_email_rejected() {
        let result = User::new(
            "John".to_string(),
            "Doe".to_string(),
            "not-an-email".to_string(),
            "secret123",
            false,
        );
        assert_eq!(
            result.unwrap_err(),
            ModelError::validation("Email is not a valid email")
        );
    }

    #[test]
    fn test_first_failure_wins() {
        // Both names are invalid; the first name is checked first
        let result = User::new(
            String::new(),
            "x".repeat(51),
            "john@example.com".to_string(),
            "pw",
            false,
        );
        assert_eq!(
            result.unwrap_err(),
            ModelError::validation("First name is required")
        );

        let result = User::new(
            "John".to_string(),
            "x".repeat(51),
            "john@example.com".to_string(),
            "pw",
            false,
        );
        assert_eq!(
            result.unwrap_err(),
            ModelError::validation("Last name cannot exceed 50 characters")
        );
    }

    #[test]
    fn test_empty_password_rejected() {
        let result = User::new(
            "John".to_string(),
            "Doe".to_string(),
            "john@example.com".to_string(),
            "",
            false,
        );
        assert_eq!(
            result.unwrap_err(),
            ModelError::validation("Password is required")
        );
    }

    #[test]
    fn test_patch_is_all_or_nothing() {
        let mut user = john();
        let patch = UserPatch {
            first_name: Some("Johnny".to_string()),
            last_name: Some(String::new()),
            is_admin: Some(true),
        };
        assert!(user.apply_patch(&patch).is_err());
        assert_eq!(user.first_name, "John");
        assert!(!user.is_admin);

        let patch = UserPatch {
            first_name: Some("Johnny".to_string()),
            ..Default::default()
        };
        user.apply_patch(&patch).unwrap();
        assert_eq!(user.first_name, "Johnny");
        assert_eq!(user.last_name, "Doe");
    }

    #[test]
    fn test_back_references_are_idempotent() {
        let mut user = john();
        let place_id = Uuid::new_v4();
        user.add_place(place_id);
        user.add_place(place_id);
        assert_eq!(user.place_ids, vec![place_id]);

        let review_id = Uuid::new_v4();
        user.add_review(review_id);
        user.remove_review(review_id);
        user.remove_review(review_id);
        assert!(user.review_ids.is_empty());
    }

    #[test]
    fn test_view_omits_password() {
        let user = john();
        let json = serde_json::to_string(&user.view()).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains(&user.password_hash));
        assert!(json.contains("john.doe@example.com"));
    }

    #[test]
    fn test_stored_form_round_trips_hash() {
        let user = john();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], serde_json::json!(user.record.id));
        let back: User = serde_json::from_value(json).unwrap();
        assert!(back.verify_password("secret123"));
    }
}
