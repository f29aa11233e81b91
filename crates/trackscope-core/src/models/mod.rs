pub mod catalog;
pub mod classified;
pub mod metadata;
pub mod raw;
pub mod scored;

pub use catalog::*;
pub use classified::*;
pub use metadata::*;
pub use raw::*;
pub use scored::*;
