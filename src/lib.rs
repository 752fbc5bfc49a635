//! RideLink Entitlement Core
//!
//! Membership reconciliation and quota engine for the RideLink
//! driver/passenger marketplace directory.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
