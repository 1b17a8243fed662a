//! Audio synthesis.

pub mod device;
pub mod mixer;
