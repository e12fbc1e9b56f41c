use serde::{Deserialize, Serialize};

/// Declares a typed wrapper around a database-assigned `i64` row id.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an id from its raw row value.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw row value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered member (gift sender or receiver).
    MemberId
);

entity_id!(
    /// Identifier of a product category.
    CategoryId
);

entity_id!(
    /// Identifier of a product.
    ProductId
);

entity_id!(
    /// Identifier of a product option, the unit that carries stock.
    OptionId
);
