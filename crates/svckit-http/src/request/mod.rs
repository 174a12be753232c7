//! Request decoding and validation helpers.

pub mod params;
pub mod validate;

pub use params::{path_uuid, query_int, Pagination};
pub use validate::{decode_body, validate_struct, ValidatedJson};
