//! Claim validation against a source tree.

mod root;
mod runner;
mod types;
mod validator;

pub use root::{SourceRoot, SourceRootError};
pub use runner::Runner;
pub use types::{Confidence, ValidationResult, ValidationStatus};
pub use validator::{derive_class_path, kebab_case, ClassPath, Validator};
