//! # Service Records
//!
//! Plain value types exchanged with the PanGenomeAPI service.
//!
//! Every record is produced by the `record!` macro and shares the same shape:
//!
//! * Each declared field is optional (`Option<T>`) and omitted from the JSON when absent.
//! * Fields the record does not declare are kept in an `additional_properties` map, so a
//!   record decoded from a newer server serializes back without losing data.
//! * Records are read-only once built. Values are assembled through a builder:
//!
//! ```rust
//! use pangenome_api_core::models::SearchGenomesFromPG;
//!
//! let params = SearchGenomesFromPG::builder()
//!     .pangenome_ref("7/1/1")
//!     .query("dnaA")
//!     .start(0)
//!     .limit(10)
//!     .build();
//!
//! assert_eq!(params.query().map(String::as_str), Some("dnaA"));
//! ```
//!
//! When a key in `additional_properties` collides with a declared field, the declared
//! field wins on serialization.

/// Declares a record type, its builder, and its JSON mapping.
///
/// Each field is written as `name: Type = "json_key"`.
macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident / $builder:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty = $key:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $( $field: Option<$ty>, )*
            additional_properties: serde_json::Map<String, serde_json::Value>,
        }

        impl $name {
            /// JSON keys of the declared fields.
            pub const FIELDS: &'static [&'static str] = &[$($key),*];

            pub fn builder() -> $builder {
                $builder::default()
            }

            /// Returns a builder pre-populated with this record's values.
            pub fn to_builder(&self) -> $builder {
                $builder { inner: self.clone() }
            }

            $(
                $(#[$field_meta])*
                pub fn $field(&self) -> Option<&$ty> {
                    self.$field.as_ref()
                }
            )*

            /// Properties received from (or destined to) the server that this record does not declare.
            pub fn additional_properties(&self) -> &serde_json::Map<String, serde_json::Value> {
                &self.additional_properties
            }
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            inner: $name,
        }

        impl $builder {
            $(
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.inner.$field = Some(value.into());
                    self
                }
            )*

            pub fn additional_property(
                mut self,
                key: impl Into<String>,
                value: impl Into<serde_json::Value>,
            ) -> Self {
                self.inner.additional_properties.insert(key.into(), value.into());
                self
            }

            pub fn build(self) -> $name {
                self.inner
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                use serde::ser::SerializeMap;

                let mut map = serializer.serialize_map(None)?;
                $(
                    if let Some(value) = &self.$field {
                        map.serialize_entry($key, value)?;
                    }
                )*
                for (key, value) in &self.additional_properties {
                    if !Self::FIELDS.contains(&key.as_str()) {
                        map.serialize_entry(key, value)?;
                    }
                }
                map.end()
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                #[derive(serde::Deserialize)]
                struct Wire {
                    $(
                        #[serde(rename = $key, default)]
                        $field: Option<$ty>,
                    )*
                    #[serde(flatten)]
                    additional_properties: serde_json::Map<String, serde_json::Value>,
                }

                let wire = Wire::deserialize(deserializer)?;
                Ok($name {
                    $( $field: wire.$field, )*
                    additional_properties: wire.additional_properties,
                })
            }
        }
    };
}

/// Implements [`Paginated`] for a search result whose page lives in `$items`.
macro_rules! paginated {
    ($name:ident, $items:ident) => {
        impl $crate::models::Paginated for $name {
            fn page_len(&self) -> usize {
                self.$items.as_ref().map_or(0, Vec::len)
            }

            fn total_found(&self) -> Option<i64> {
                self.num_found
            }
        }
    };
}

mod comparison;
mod context;
mod feature;
mod ortholog;
mod search;
mod summary;

pub use comparison::*;
pub use context::*;
pub use feature::*;
pub use ortholog::*;
pub use search::*;
pub use summary::*;

/// A sort key: the column name and whether to sort ascending (`1`) or descending (`0`).
pub type ColumnSorting = (String, i64);

/// Violations of the pagination contract shared by every search result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationViolation {
    #[error("The page holds {items} items but the requested limit was {limit}")]
    PageExceedsLimit { items: usize, limit: i64 },
    #[error("The server reported num_found={num_found} but returned {items} items")]
    NumFoundBelowPage { num_found: i64, items: usize },
}

/// A page of search results.
///
/// `num_found` is the total number of matches on the server, so it can never be smaller
/// than the page, and the page can never be larger than the requested limit.
pub trait Paginated {
    /// Number of items in this page.
    fn page_len(&self) -> usize;

    /// Total number of matches reported by the server.
    fn total_found(&self) -> Option<i64>;

    fn check_pagination(&self, limit: Option<i64>) -> Result<(), PaginationViolation> {
        let items = self.page_len();

        if let Some(limit) = limit.filter(|l| *l >= 0) {
            if items as i64 > limit {
                return Err(PaginationViolation::PageExceedsLimit { items, limit });
            }
        }

        if let Some(num_found) = self.total_found() {
            if num_found < items as i64 {
                return Err(PaginationViolation::NumFoundBelowPage { num_found, items });
            }
        }

        Ok(())
    }
}
