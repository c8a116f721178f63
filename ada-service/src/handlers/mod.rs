//! HTTP handlers for the ADA API.

pub mod ai_dm;
pub mod auth;
pub mod campaigns;
pub mod characters;
pub mod health;
pub mod journals;
pub mod metrics;
pub mod scripts;
