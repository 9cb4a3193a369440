//! Request and response models

pub mod prediction;
pub mod batch;
pub mod report;

pub use prediction::*;
pub use batch::*;
pub use report::*;
