//! Application layer: scanning, the repository and what the routing layer
//! consumes.

pub mod error;
pub mod freshness;
pub mod generation;
mod lock;
pub mod repository;
pub mod scan;
pub mod site;
pub mod views;
