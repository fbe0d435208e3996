use core::ops::Deref;

/// A resource that is either owned by its holder or borrowed from a caller.
///
/// Estimators keep their kernel, metric and reference tree behind a `Held`.
/// The variant is chosen when the resource is supplied and never changes
/// afterwards. Cloning deep-copies an owned value and shares a borrowed one.
///
/// With the `serde` feature a `Held` serializes as its value and always
/// deserializes as [`Held::Owned`].
#[derive(Debug)]
pub enum Held<'a, T> {
    /// The holder owns the value and drops it with itself.
    Owned(T),
    /// The value belongs to a caller that outlives the holder.
    Borrowed(&'a T),
}

impl<T> Held<'_, T> {
    /// Returns `true` for [`Held::Owned`].
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self, Held::Owned(_))
    }
}

impl<T> Deref for Held<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Held::Owned(value) => value,
            Held::Borrowed(value) => value,
        }
    }
}

impl<T: Clone> Clone for Held<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Held::Owned(value) => Held::Owned(value.clone()),
            Held::Borrowed(value) => Held::Borrowed(value),
        }
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for Held<'_, T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (**self).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for Held<'_, T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Held::Owned)
    }
}
