pub mod context;
pub mod result;
pub mod segment;

pub use context::*;
pub use result::*;
pub use segment::*;
