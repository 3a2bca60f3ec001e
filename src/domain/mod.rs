// Domain layer - Price history alignment and station ranking
pub mod comparison;
pub mod identity;
pub mod ranking;
pub mod sample;
pub mod series;
pub mod snapshot;
