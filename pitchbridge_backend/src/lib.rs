pub mod api;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod error;
pub mod interests;
pub mod messaging;
pub mod pitches;
pub mod profiles;
pub mod telemetry;
pub mod uploads;
pub mod utils;
