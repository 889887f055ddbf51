//! Core types for Rolodex.
//!
//! This module provides type-safe wrappers for the user entity and its fields.

pub mod email;
pub mod id;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use user::{NewUser, User, UserInput, ValidationError};
