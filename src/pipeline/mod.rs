pub mod analyzer;
pub mod phase1_extract;
pub mod phase2_synthesis;
pub mod segmenter;

pub use analyzer::*;
pub use phase1_extract::*;
pub use phase2_synthesis::*;
pub use segmenter::*;
