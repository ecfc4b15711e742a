use std::fmt;
use std::str::FromStr;

use mti::prelude::{MagicTypeId, MagicTypeIdExt, V7};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

/// Declares a TypeID-backed identifier with a fixed prefix.
///
/// The generated type is opaque: it is created fresh with `new()`, parsed
/// from its string form with `parse()`, and serialized as that string.
macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(MagicTypeId);

        impl $name {
            const PREFIX: &'static str = $prefix;

            /// Generates a new id using UUIDv7.
            pub fn new() -> Self {
                Self(Self::PREFIX.create_type_id::<V7>())
            }

            /// Parses an id from its string form, validating the prefix.
            pub fn parse(s: &str) -> Result<Self, ModelError> {
                let id = MagicTypeId::from_str(s)
                    .map_err(|e| ModelError::InvalidId(format!("{s}: {e}")))?;
                if id.prefix().as_str() != Self::PREFIX {
                    return Err(ModelError::InvalidId(format!(
                        "expected prefix '{}', got '{}'",
                        Self::PREFIX,
                        id.prefix().as_str()
                    )));
                }
                Ok(Self(id))
            }

            /// Returns the string representation of this id.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
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

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.0.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

typed_id!(
    /// Opaque identifier of an entity, e.g. `entity_01h455vb4pex5vsknk084sn02q`.
    EntityId,
    "entity"
);

typed_id!(
    /// Opaque identifier of a field, e.g. `field_01h455vb4pex5vsknk084sn02q`.
    FieldId,
    "field"
);
