//! Values the cache facade is willing to store.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;

/// A serializable value that knows whether it is worth caching.
///
/// Empty results (`None`, empty collections) are never written, so a later
/// read still misses and recomputes. Plain structs opt in with an empty impl:
///
/// ```
/// use serde::Serialize;
/// use svckit_http::cache::CacheValue;
///
/// #[derive(Serialize)]
/// struct Book {
///     id: u64,
///     title: String,
/// }
///
/// impl CacheValue for Book {}
///
/// assert!(Vec::<Book>::new().is_empty_value());
/// assert!(!Book { id: 1, title: "Dune".into() }.is_empty_value());
/// ```
pub trait CacheValue: Serialize {
    /// Whether storing this value should be skipped.
    fn is_empty_value(&self) -> bool {
        false
    }
}

macro_rules! scalar_cache_value {
    ($($ty:ty),* $(,)?) => {
        $(impl CacheValue for $ty {})*
    };
}

scalar_cache_value!(
    String, str, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64, uuid::Uuid, chrono::DateTime<chrono::Utc>,
);

impl<T: CacheValue> CacheValue for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().map_or(true, CacheValue::is_empty_value)
    }
}

impl<T: CacheValue + ?Sized> CacheValue for &T {
    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

impl<T: CacheValue + ?Sized> CacheValue for Box<T> {
    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

impl<T: Serialize> CacheValue for [T] {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Serialize> CacheValue for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Serialize> CacheValue for VecDeque<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Serialize, S: BuildHasher> CacheValue for HashSet<T, S> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Serialize> CacheValue for BTreeSet<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: Serialize, V: Serialize, S: BuildHasher> CacheValue for HashMap<K, V, S> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: Serialize, V: Serialize> CacheValue for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl CacheValue for serde_json::Value {
    fn is_empty_value(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(fields) => fields.is_empty(),
            _ => false,
        }
    }
}
