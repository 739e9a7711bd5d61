pub mod events;
pub mod setup;

// Re-export main utilities for use by test files
pub use events::{puzzle, sticker};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
