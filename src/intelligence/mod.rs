pub mod types;
pub mod reference;
pub mod classify;
pub mod narrative;
pub mod report;

pub use types::*;
pub use reference::*;
pub use classify::*;
pub use narrative::*;
pub use report::*;
