pub mod form;
pub mod hotspot;
pub mod scene;
pub mod tour;
