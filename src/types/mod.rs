pub mod overview;
pub mod sample;
pub mod summary;
