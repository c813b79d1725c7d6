pub mod accessors;
pub mod error;
pub mod misc;
