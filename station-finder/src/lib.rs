//! Nearby gas station discovery server.
//!
//! Takes the device's position, searches outward for gas stations with the
//! Places API, hydrates every candidate and publishes the stations together
//! with the closest one.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod domain;
pub mod location;
pub mod places;
pub mod search;
pub mod web;
