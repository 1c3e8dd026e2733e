//! Record identifiers.
//!
//! Every record kind gets its own newtype over the database-assigned `i64`
//! so a task id can never be passed where a contract id is expected.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw identifier as stored.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`crate::domain::User`].
    UserId
);
define_id!(
    /// Identifier of a [`crate::domain::Contract`].
    ContractId
);
define_id!(
    /// Identifier of a [`crate::domain::Task`].
    TaskId
);
define_id!(
    /// Identifier of an [`crate::domain::AuditEntry`].
    AuditEntryId
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ids_serialise_as_bare_integers() {
        let value = serde_json::to_value(ContractId::new(42)).expect("id serialises");
        assert_eq!(value, serde_json::json!(42));
        let back: TaskId = serde_json::from_value(serde_json::json!(7)).expect("id parses");
        assert_eq!(back.get(), 7);
    }

    #[rstest]
    fn display_matches_raw_value() {
        assert_eq!(UserId::from(9).to_string(), "9");
    }
}
