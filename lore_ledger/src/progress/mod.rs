//! Progress vocabulary: fragments, one-way flags, allegiances and prompts.

mod allegiance;
mod flag;
mod fragment;
mod prompt;

pub use allegiance::*;
pub use flag::*;
pub use fragment::*;
pub use prompt::*;
