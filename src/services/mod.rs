pub mod estimator;
pub mod footprint;
pub mod geocode;
pub mod irradiance;
pub mod pipeline;
pub mod projection;
