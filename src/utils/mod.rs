// Utility functions module
pub mod ids;

pub use ids::IdGenerator;
