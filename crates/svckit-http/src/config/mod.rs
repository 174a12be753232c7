//! Service configuration module.

pub mod types;
pub mod loader;
pub mod validation;

pub use types::*;
pub use loader::*;
pub use validation::*;
