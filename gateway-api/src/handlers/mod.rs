pub mod health;
pub mod metadata;

pub use health::health_check;
pub use metadata::openapi_document;
