pub mod probe;

mod error;

pub use error::{Error, Result};
pub use probe::{LinkChecker, ProbeVerdict};
