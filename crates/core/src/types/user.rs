//! The user entity and its validation rule.

use serde::{Deserialize, Deserializer, Serialize};

use super::email::{Email, EmailError};
use super::id::UserId;

/// Reasons a [`UserInput`] is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or absent.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// A field is present but malformed.
    #[error("invalid {0} format")]
    InvalidFormat(&'static str),
}

/// A persisted user.
///
/// Instances only come out of a store, so `name` is non-empty and `email`
/// has passed [`Email::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: Email,
}

/// Client-supplied user fields, as decoded from a request body.
///
/// Missing and `null` fields decode as empty strings so that
/// [`UserInput::validate`] reports them, and any `id` in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInput {
    /// Requested display name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Requested contact address.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl UserInput {
    /// Check the input against the entity invariant.
    ///
    /// Checks run in order: name present, email present, email well-formed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for an empty `name` or
    /// `email`, and [`ValidationError::InvalidFormat`] for a malformed `email`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.parse_email().map(|_| ())
    }

    fn parse_email(&self) -> Result<Email, ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }

        Email::parse(&self.email).map_err(|e| match e {
            EmailError::Empty => ValidationError::MissingField("email"),
            EmailError::InvalidFormat => ValidationError::InvalidFormat("email"),
        })
    }
}

/// Validated fields for creating or replacing a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name (non-empty).
    pub name: String,
    /// Contact address.
    pub email: Email,
}

impl TryFrom<UserInput> for NewUser {
    type Error = ValidationError;

    fn try_from(input: UserInput) -> Result<Self, Self::Error> {
        let email = input.parse_email()?;
        Ok(Self {
            name: input.name,
            email,
        })
    }
}

impl NewUser {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
        }
    }
}
