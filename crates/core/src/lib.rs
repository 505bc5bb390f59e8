// crates/core/src/lib.rs
pub mod cloze;
pub mod job;
pub mod paths;
pub mod wire;

pub use job::*;
pub use wire::*;
