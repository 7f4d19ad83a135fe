//! proxy-mask - Conflict resolution, span masking, response unmasking, and
//! SSE stream transformation.
//!
//! This crate owns everything downstream of detection: turning raw
//! `Entity` lists into a disjoint set, splicing placeholders into text, and
//! reversing that substitution on the way back out, whether the response
//! arrives as one body or as a stream.

mod masker;
mod resolver;
mod stream;
mod unmask;

pub use masker::*;
pub use resolver::*;
pub use stream::*;
pub use unmask::*;
