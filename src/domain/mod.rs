// Domain layer - Plain data types shared by every use case
pub mod alert;
pub mod city;
pub mod dashboard;
pub mod device;
pub mod distribution;
pub mod error;
pub mod heatmap;
pub mod recommendation;
pub mod record;
pub mod series;
pub mod telemetry;
