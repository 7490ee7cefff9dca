//! ComplyFlow Detectors
//!
//! Detection primitives used by policy condition evaluation:
//! - Regex-based PII detection and placeholder scrubbing
//! - Aho-Corasick keyword scan for protected health information
//! - Population-variance bias heuristic for protected attributes

pub mod bias;
pub mod phi;
pub mod pii;

pub use phi::PhiDetector;
pub use pii::{PiiDetector, PiiKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::phi::PhiDetector;
    pub use crate::pii::{PiiDetector, PiiKind};
}
