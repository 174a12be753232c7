//! Cache key construction.
//!
//! Keys have the shape `base[:identifier][:func]|args`, where `args` renders
//! every argument's non-empty fields as `name->value`, separated by `,`
//! within an argument and `|` between arguments:
//!
//! ```
//! use svckit_http::cache::build_cache_key;
//! use svckit_http::cache_key_fragment;
//!
//! struct ListOrders {
//!     status: String,
//!     page: u32,
//! }
//!
//! cache_key_fragment!(ListOrders { status, page });
//!
//! let params = ListOrders { status: "paid".into(), page: 2 };
//! assert_eq!(
//!     build_cache_key("order", "u1", "list", &[&params]),
//!     "order:u1:list|status->paid,page->2",
//! );
//! ```

use std::fmt::Write;

/// An argument that contributes to a cache key.
///
/// Implementations list their fields in declaration order; empty values are
/// skipped by [`build_cache_key`]. Usually derived with
/// [`cache_key_fragment!`](crate::cache_key_fragment).
pub trait CacheKeyFragment {
    /// Field names paired with their rendered values.
    fn key_fields(&self) -> Vec<(&'static str, String)>;
}

impl<T: CacheKeyFragment + ?Sized> CacheKeyFragment for &T {
    fn key_fields(&self) -> Vec<(&'static str, String)> {
        (**self).key_fields()
    }
}

/// Rendering of a single field value inside a cache key.
///
/// An empty rendering means "absent" and drops the field from the key.
pub trait KeyFieldValue {
    /// Render the value.
    fn render_key_value(&self) -> String;
}

macro_rules! display_key_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyFieldValue for $ty {
                fn render_key_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_key_value!(
    String, str, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64, uuid::Uuid,
);

impl KeyFieldValue for chrono::DateTime<chrono::Utc> {
    fn render_key_value(&self) -> String {
        self.to_rfc3339()
    }
}

impl<T: KeyFieldValue + ?Sized> KeyFieldValue for &T {
    fn render_key_value(&self) -> String {
        (**self).render_key_value()
    }
}

impl<T: KeyFieldValue> KeyFieldValue for Option<T> {
    fn render_key_value(&self) -> String {
        self.as_ref().map(KeyFieldValue::render_key_value).unwrap_or_default()
    }
}

/// Implement [`CacheKeyFragment`] for a struct from a list of its fields.
///
/// Every listed field must implement [`KeyFieldValue`].
#[macro_export]
macro_rules! cache_key_fragment {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::cache::CacheKeyFragment for $ty {
            fn key_fields(&self) -> ::std::vec::Vec<(&'static str, ::std::string::String)> {
                ::std::vec![
                    $((
                        stringify!($field),
                        $crate::cache::KeyFieldValue::render_key_value(&self.$field),
                    )),*
                ]
            }
        }
    };
}

/// Join non-empty segments with `:`.
pub fn build_prefix_key(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(":")
}

/// Build a deterministic cache key.
///
/// `identifier` and `func_name` are optional: pass `""` to leave them out.
/// The result always contains the `|` separating the prefix from the
/// argument segment, even with no arguments.
pub fn build_cache_key(
    base: &str,
    identifier: &str,
    func_name: &str,
    args: &[&dyn CacheKeyFragment],
) -> String {
    let prefix = match (identifier.is_empty(), func_name.is_empty()) {
        (false, false) => format!("{}:{}:{}", base, identifier, func_name),
        (false, true) => format!("{}:{}", base, identifier),
        (true, false) => format!("{}:{}", base, func_name),
        (true, true) => base.to_string(),
    };

    let mut rendered = String::new();
    for arg in args {
        if !rendered.is_empty() {
            rendered.push('|');
        }

        for (name, value) in arg.key_fields() {
            if value.is_empty() {
                continue;
            }
            if !rendered.is_empty() && !rendered.ends_with('|') {
                rendered.push(',');
            }
            let _ = write!(rendered, "{}->{}", name, value);
        }
    }

    format!("{}|{}", prefix, rendered)
}

/// Escape glob metacharacters so `prefix` matches literally in a scan pattern.
pub fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
