//! Domain ID Types with NewType Pattern
//!
//! Type-safe wrappers for entity identifiers so a `LeadId` can never be passed
//! where a `UserId` is expected. Each ID type implements Display, FromStr,
//! Serialize/Deserialize and the sqlx traits for transparent column binding.

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Decode, Encode, Sqlite, Type};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Macro to generate NewType ID wrappers with all required traits
macro_rules! domain_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a random UUID
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Create an ID from an existing string (for database retrieval)
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Create an ID from a string slice without UUID validation
            pub fn from_str_unchecked(s: &str) -> Self {
                Self(s.to_string())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to inner string value
            pub fn into_string(self) -> String {
                self.0
            }

            /// Parse and validate a UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        // SQLx trait implementations for database compatibility
        impl Type<Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as Type<Sqlite>>::type_info()
            }
        }

        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <String as Encode<'q, Sqlite>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <String as Decode<'r, Sqlite>>::decode(value)?;
                Ok(Self(s))
            }
        }
    };
}

domain_id!(
    /// Unique identifier for a user account
    UserId
);

domain_id!(
    /// Unique identifier for a lead
    LeadId
);

domain_id!(
    /// Unique identifier for a client
    ClientId
);

domain_id!(
    /// Unique identifier for a company
    CompanyId
);

domain_id!(
    /// Unique identifier for a security token record
    TokenId
);

domain_id!(
    /// Unique identifier for a lead interaction
    InteractionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_creation() {
        let id = UserId::new();
        assert!(!id.as_str().is_empty());
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn lead_id_from_string() {
        let uuid_str = Uuid::new_v4().to_string();
        let id = LeadId::from_string(uuid_str.clone());
        assert_eq!(id.as_str(), uuid_str);
    }

    #[test]
    fn token_id_from_str() {
        let uuid_str = Uuid::new_v4().to_string();
        let id: TokenId = uuid_str.parse().expect("Failed to parse UUID");
        assert_eq!(id.as_str(), uuid_str);
    }

    #[test]
    fn client_id_invalid_uuid_fails() {
        assert!(ClientId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn company_id_serialization() {
        let id = CompanyId::new();
        let json = serde_json::to_string(&id).expect("Failed to serialize");

        // Should serialize as a plain string, not as an object
        assert!(json.starts_with('"'));
        assert!(json.ends_with('"'));

        let deserialized: CompanyId = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(id, deserialized);
    }

    #[test]
    fn user_id_equality() {
        let id1 = UserId::from_string("test-id".to_string());
        let id2 = UserId::from_string("test-id".to_string());
        let id3 = UserId::from_string("different-id".to_string());

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn default_creates_unique_ids() {
        let id1 = InteractionId::default();
        let id2 = InteractionId::default();
        assert_ne!(id1, id2);
    }

    #[test]
    fn compile_time_type_safety() {
        let user_id = UserId::new();
        let lead_id = LeadId::new();

        fn takes_user_id(_id: UserId) {}
        fn takes_lead_id(_id: LeadId) {}

        takes_user_id(user_id);
        takes_lead_id(lead_id);

        // The following would fail at compile time (uncomment to verify):
        // takes_user_id(lead_id); // ERROR: mismatched types
    }
}
