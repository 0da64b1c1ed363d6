pub mod enums;
pub mod lab;
pub mod profile;

pub use enums::{ClassificationStatus, Sex};
pub use lab::*;
pub use profile::*;
