//! Model registry traits.
//!
//! Every concrete RM record type implements [`RmModel`], which ties the Rust type to its
//! canonical model name (`"EHR_STATUS"`, `"DV_QUANTITY"`, ...). The same string is written as
//! the `_type` discriminator on the wire and is the key of the matching validation schema.
//!
//! Every abstract RM type that appears as a field type is a Rust enum implementing
//! [`RmUnion`]. The variant registry of a union is generated by [`rm_union!`] as an exhaustive,
//! compile-time lookup from discriminator value to concrete decoder, so the only way to reach
//! an unknown variant is genuinely unknown wire input.

use crate::dispatch::VariantError;

/// A concrete RM record type.
pub trait RmModel {
    /// Canonical upper-case model name, used as the `_type` discriminator value.
    const MODEL_NAME: &'static str;
}

/// An abstract RM type whose value is one of a closed set of concrete record types.
pub trait RmUnion: Sized {
    /// Canonical name of the abstract type (for example `"OBJECT_ID"`).
    const UNION_NAME: &'static str;

    /// Model names of the concrete members, in declaration order.
    const VARIANTS: &'static [&'static str];

    /// Discriminator key accepted on decode in addition to `_type`.
    ///
    /// Older producers tagged `OBJECT_ID` and `DV_TEXT` positions with `MetaType`. The alias is
    /// read but never written.
    const LEGACY_DISCRIMINATOR: Option<&'static str> = None;

    /// Model name of the variant held by this value.
    fn model_name(&self) -> &'static str;

    /// Decodes `raw` as the member named `tag`.
    ///
    /// Returns `None` when `tag` is not a member of this union.
    fn decode_variant(tag: &str, raw: serde_json::Value) -> Option<Result<Self, VariantError>>;
}

/// Implements [`RmModel`] and the serde traits for a list of concrete record types.
///
/// Each struct derives its field codec with `#[serde(remote = "Self", tag = "_type", ...)]`,
/// which leaves the derived functions as inherent items. The trait impls generated here wrap
/// them: encoding is unchanged, and decoding goes through
/// [`crate::dispatch::deserialize_record`] so a `_type` naming another model is rejected.
///
/// The name given here must match the struct's `#[serde(rename = "...")]`; the registry
/// tests check every model for this.
macro_rules! rm_model {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl $crate::model::RmModel for $ty {
                const MODEL_NAME: &'static str = $name;
            }

            impl serde::Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    <$ty>::serialize(self, serializer)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    $crate::dispatch::deserialize_record(deserializer, |body| {
                        <$ty>::deserialize(body)
                    })
                }
            }
        )+
    };
}

/// Declares an RM union enum and its variant registry.
///
/// ```ignore
/// rm_union! {
///     /// RM `UID_BASED_ID`.
///     pub enum UidBasedId = "UID_BASED_ID" {
///         HierObjectId(HierObjectId),
///         ObjectVersionId(ObjectVersionId),
///     }
/// }
/// ```
///
/// An optional `legacy = "MetaType"` after the wire name enables the legacy discriminator key
/// for that union.
macro_rules! rm_union {
    (@legacy $legacy:literal) => {
        Some($legacy)
    };
    (@legacy) => {
        None
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident = $wire:literal $(, legacy = $legacy:literal)? {
            $($variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        $vis enum $name {
            $($variant($ty),)+
        }

        impl $crate::model::RmUnion for $name {
            const UNION_NAME: &'static str = $wire;
            const VARIANTS: &'static [&'static str] =
                &[$(<$ty as $crate::model::RmModel>::MODEL_NAME),+];
            const LEGACY_DISCRIMINATOR: Option<&'static str> = rm_union!(@legacy $($legacy)?);

            fn model_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$ty as $crate::model::RmModel>::MODEL_NAME,)+
                }
            }

            fn decode_variant(
                tag: &str,
                raw: serde_json::Value,
            ) -> Option<Result<Self, $crate::dispatch::VariantError>> {
                $(
                    if tag == <$ty as $crate::model::RmModel>::MODEL_NAME {
                        return Some($crate::dispatch::decode_variant::<$ty>(raw).map(Self::$variant));
                    }
                )+
                None
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                match self {
                    $(Self::$variant(value) => serde::Serialize::serialize(value, serializer),)+
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                $crate::dispatch::deserialize_union(deserializer)
            }
        }

        $(
            impl From<$ty> for $name {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

pub(crate) use rm_model;
pub(crate) use rm_union;
