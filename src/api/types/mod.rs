//! Request and response types shared by the HTTP handlers

mod error;
mod json;

pub use error::{ApiError, ApiErrorBody, DUPLICATE_EMAIL_MESSAGE, INTERNAL_ERROR_MESSAGE};
pub use json::{Json, JsonRejection};
