//! HTTP handlers for photosite-web

pub mod contact;
pub mod error;
pub mod health;
pub mod pages;

pub use contact::{contact_routes, method_not_allowed, submit_contact};
pub use error::{ApiError, ErrorPage, PageResult};
pub use health::health_routes;
pub use pages::{browse_page, collection_page, home_page, page_routes};
