//! Tri-state field wrapper for non-mandatory RM attributes.
//!
//! `Optional<T>` distinguishes "absent" from "present with a value". It is deliberately a
//! separate type from `Option<T>` so that the wire contract is attached to the type rather than
//! repeated at every field:
//!
//! - **Encode**: an absent value is never written. Record fields are declared with
//!   `#[serde(default, skip_serializing_if = "Optional::is_absent")]`, so the key is omitted
//!   entirely instead of being written as `null`.
//! - **Decode**: a missing key yields `Absent` (through `#[serde(default)]`), and so does an
//!   explicit JSON `null`. The two wire shapes collapse into one state; re-encoding an
//!   explicit `null` therefore drops the key.
//! - **Storage** (feature `sqlx`): absent maps to SQL `NULL` in both directions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ValueError;

/// A value that may be absent.
///
/// # Examples
///
/// ```rust
/// use rm_types::Optional;
///
/// let units: Optional<String> = Optional::present("mm[Hg]".to_string());
/// assert!(units.is_present());
/// assert_eq!(units.unwrap_or_default(), "mm[Hg]");
///
/// let precision: Optional<i64> = Optional::absent();
/// assert_eq!(precision.unwrap_or(0), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Optional<T> {
    /// No value. Nothing is read from or written to the wire.
    Absent,
    /// Exactly one value of type `T`.
    Present(T),
}

impl<T> Optional<T> {
    /// Returns the absent state.
    pub const fn absent() -> Self {
        Self::Absent
    }

    /// Wraps `value` in the present state.
    pub const fn present(value: T) -> Self {
        Self::Present(value)
    }

    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns `true` when there is no value.
    ///
    /// This is the predicate record fields use in `skip_serializing_if`.
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the contained value.
    ///
    /// # Panics
    ///
    /// Panics if the value is absent. Reading an absent value is a programming error; use
    /// [`Optional::unwrap_or`], [`Optional::get`] or [`Optional::require`] when absence is an
    /// expected outcome.
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self {
            Self::Present(value) => value,
            Self::Absent => panic!("called `Optional::unwrap()` on an absent value"),
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Present(value) => value,
            Self::Absent => default,
        }
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.unwrap_or_else(T::default)
    }

    pub fn unwrap_or_else(self, f: impl FnOnce() -> T) -> T {
        match self {
            Self::Present(value) => value,
            Self::Absent => f(),
        }
    }

    /// Borrows the contained value, if any.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub fn as_ref(&self) -> Optional<&T> {
        match self {
            Self::Present(value) => Optional::Present(value),
            Self::Absent => Optional::Absent,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Optional<U> {
        match self {
            Self::Present(value) => Optional::Present(f(value)),
            Self::Absent => Optional::Absent,
        }
    }

    /// Converts into the standard library `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Returns the value, or [`ValueError::Absent`] naming `field`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::Absent`] if the value is absent.
    pub fn require(self, field: &'static str) -> Result<T, ValueError> {
        match self {
            Self::Present(value) => Ok(value),
            Self::Absent => Err(ValueError::Absent(field)),
        }
    }
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Present(value),
            None => Self::Absent,
        }
    }
}

impl<T> From<Optional<T>> for Option<T> {
    fn from(value: Optional<T>) -> Self {
        value.into_option()
    }
}

impl<T: Serialize> Serialize for Optional<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Record fields skip absent values before reaching here; this arm only runs when an
        // `Optional` is serialised outside a record (for example as a list element).
        match self {
            Self::Present(value) => value.serialize(serializer),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Optional<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(feature = "sqlx")]
mod sql {
    //! SQL `NULL` mapping.

    use super::Optional;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::{Database, Decode, Encode, Type, ValueRef};

    impl<DB: Database, T: Type<DB>> Type<DB> for Optional<T> {
        fn type_info() -> DB::TypeInfo {
            T::type_info()
        }

        fn compatible(ty: &DB::TypeInfo) -> bool {
            T::compatible(ty)
        }
    }

    impl<'q, DB: Database, T: Encode<'q, DB>> Encode<'q, DB> for Optional<T> {
        fn encode_by_ref(
            &self,
            buf: &mut <DB as Database>::ArgumentBuffer<'q>,
        ) -> Result<IsNull, BoxDynError> {
            match self {
                Optional::Present(value) => value.encode_by_ref(buf),
                Optional::Absent => Ok(IsNull::Yes),
            }
        }
    }

    impl<'r, DB: Database, T: Decode<'r, DB>> Decode<'r, DB> for Optional<T> {
        fn decode(value: <DB as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
            if value.is_null() {
                Ok(Optional::Absent)
            } else {
                T::decode(value).map(Optional::Present)
            }
        }
    }
}
