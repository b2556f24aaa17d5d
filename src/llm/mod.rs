pub mod client;
pub mod prompts;
pub mod recovery;

pub use client::*;
pub use prompts::*;
pub use recovery::*;
