pub mod geo;
pub mod solar;
