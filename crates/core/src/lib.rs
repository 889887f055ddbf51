//! Rolodex Core - Entity model and validation.
//!
//! This crate provides the user entity shared by the `rolodex-server` binary
//! and its tests.
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no
//! database access, no HTTP. The optional `postgres` feature adds sqlx
//! encode/decode support for the newtypes.
//!
//! # Modules
//!
//! - [`types`] - `UserId`, `Email`, `User`, `UserInput`, `NewUser` and `ValidationError`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
