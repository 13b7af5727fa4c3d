//! Row models and write DTOs, one module per table.

pub mod hotspot;
pub mod scene;
pub mod tour;
