pub mod aggregate;
pub mod fetch;
pub mod geo;
pub mod overview;
