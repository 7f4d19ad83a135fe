//! proxy-detect - entity detection
//!
//! Two independent producers of `Entity` records over a `TextSpan`:
//! - `scanner`: an in-process, regex-driven credential scanner (can't fail)
//! - `analyzer`: an HTTP client over the external PII analyzer (can fail)
//!
//! Both normalize into the same `proxy_core::Entity` shape so the
//! orchestrator can union their output before conflict resolution.

mod analyzer;
mod scanner;

pub use analyzer::*;
pub use scanner::*;
