//! # Domain Models
//!
//! These structs represent the core entities of fruit-health-cloud.
//! Identifiers are store-assigned 64-bit integers.

use thiserror::Error;

/// A stored or submitted label did not match any variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum using
/// the same labels serde uses on the wire and the store uses in its columns.
macro_rules! labelled_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::models::ParseLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($ty::$variant),)+
                    other => Err($crate::models::ParseLabelError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use labelled_enum;

mod content;
mod governance;
mod knowledge;
mod page;
mod user;
mod warning;

pub use content::*;
pub use governance::*;
pub use knowledge::*;
pub use page::*;
pub use user::*;
pub use warning::*;
