//! Identifier newtypes shared across layers.
//!
//! Both identifiers are opaque text: post ids are generated by the store and
//! user ids are issued by the external auth provider.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

macro_rules! opaque_id {
    ($name:ident, $field:literal) => {
        impl $name {
            /// Trim and validate a raw identifier.
            pub fn parse(raw: &str) -> Result<Self, DomainError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::field($field, "must not be empty"));
                }
                if trimmed.len() > MAX_ID_LEN {
                    return Err(DomainError::field(
                        $field,
                        format!("must be at most {MAX_ID_LEN} characters"),
                    ));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

const MAX_ID_LEN: usize = 128;

opaque_id!(PostId, "id");
opaque_id!(UserId, "user_id");
