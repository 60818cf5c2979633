use serde::{Deserialize, Serialize};

/// Declares an opaque, string-backed identifier.
///
/// Identifiers are assigned by the persistence layer, so no format is
/// assumed beyond "non-empty text".
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a budget aggregate.
    BudgetId
);

string_id!(
    /// Identifier of a workshop client.
    ClientId
);

string_id!(
    /// Identifier of the service order a budget belongs to.
    ServiceOrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_conversions_preserve_value() {
        let id = BudgetId::new("b-1");
        assert_eq!(id.as_str(), "b-1");

        let client: ClientId = "c1".into();
        assert_eq!(client.to_string(), "c1");

        let order = ServiceOrderId::from(String::from("so-1"));
        assert_eq!(order.into_inner(), "so-1");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = BudgetId::new("b-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"b-1\"");

        let back: BudgetId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
