pub mod aggregate;
pub mod correlation;
pub mod summary;
pub mod trends;
