//! Travel recommendation API: city recommendations from a clustered
//! preference model, trip cost estimates and city listings, all served from
//! a read-only dataset loaded at startup.

pub mod config;
pub mod dataset;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
