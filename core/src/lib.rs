//! oracle-core: tenant-scoped, reproducible card readings.

pub mod admin;
pub mod app;
pub mod command;
pub mod config;
pub mod demo;
pub mod error;
pub mod identity;
pub mod join;
pub mod master;
pub mod pointer;
pub mod profiles;
pub mod reading;
pub mod rng;
pub mod sampler;
pub mod snapshot;
pub mod store;
pub mod tenancy;
pub mod types;
