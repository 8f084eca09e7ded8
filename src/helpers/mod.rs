pub mod geo;
pub mod ratings;
