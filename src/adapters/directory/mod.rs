//! Directory collaborator adapters.
//!
//! The marketplace directory owns referral tracking and role management;
//! this core only reads from it. `DirectoryApiClient` talks to the real
//! service; `StaticDirectoryStub` serves tests and local development.

mod client;
mod stub;

pub use client::DirectoryApiClient;
pub use stub::StaticDirectoryStub;
