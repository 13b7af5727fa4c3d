//! Domain logic for the virtual-tour content API.
//!
//! Nothing in this crate touches the database: the persistence layer lives in
//! `vrtour-db` and the HTTP surface in `vrtour-api`.

pub mod error;
pub mod media;
pub mod navigation;
pub mod tour_query;
pub mod types;
pub mod validation;
