//! Shared test utilities for the ugrid-io workspace.
//!
//! The grid layers are tested against a scripted double of the API seam;
//! [`FakeUGridApi`] is that double: every result is a plain field a test
//! can overwrite, every call is recorded by name.
//! [`fixtures`] carries the small well-known meshes the scenario tests use.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fake_api;
pub mod fixtures;

pub use fake_api::FakeUGridApi;
pub use fixtures::*;
