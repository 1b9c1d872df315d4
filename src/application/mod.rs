// Application layer - Core algorithms, state and use cases
pub mod aggregator;
pub mod benchmark;
pub mod city_service;
pub mod dashboard_service;
pub mod distribution;
pub mod fleet;
pub mod forecast;
pub mod heatmap;
pub mod live_service;
pub mod registry;
pub mod savings;
pub mod scheduler;
pub mod series_generator;
pub mod state_actor;
pub mod telemetry_repository;
