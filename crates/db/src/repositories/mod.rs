//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument, or `&mut PgConnection` for the steps of a
//! write that must run inside a caller-owned transaction.

pub mod hotspot_repo;
pub mod navigation_repo;
pub mod scene_repo;
pub mod tour_repo;

pub use hotspot_repo::HotspotRepo;
pub use navigation_repo::{NavigationRepo, NavigationRows};
pub use scene_repo::SceneRepo;
pub use tour_repo::TourRepo;
