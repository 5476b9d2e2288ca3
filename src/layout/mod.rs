//! Layered layout engine.

pub mod sugiyama;
pub mod types;

pub use sugiyama::sugiyama;
pub use types::Layout;
