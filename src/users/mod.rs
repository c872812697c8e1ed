//! User records: data model, storage and input validation.

pub mod model;
pub mod store;
pub mod validation;

pub use model::{NewUser, User, UserId, UserInput};
pub use store::{StoreError, UserStore};
pub use validation::{ValidationError, validate_create, validate_update};
