// Application layer - Use cases over the price repository
pub mod comparison_service;
pub mod price_repository;
pub mod station_service;
