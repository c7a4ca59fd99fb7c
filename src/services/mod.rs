//! # Service Layer
//!
//! [`HbnbFacade`] and the request payloads it accepts.

pub mod errors;
pub mod facade;
pub mod requests;

pub use errors::{FacadeError, FacadeResult};
pub use facade::HbnbFacade;
pub use requests::{
    CreateAmenity, CreatePlace, CreateReview, CreateUser, UpdateAmenity, UpdatePlace, UpdateReview,
    UpdateUser,
};
