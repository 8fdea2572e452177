//! BugScan Workflow - Target resolution and scan submission
//!
//! One submission runs the state machine
//! `Idle -> ResolvingTarget -> CreatingScan -> Success | Failed`:
//! the target is created or reused first (conflicts recover through a
//! single list-and-match fallback), and only a resolved target id is
//! ever submitted for scanning. Targets are deduplicated by canonical
//! URL; scan jobs never are.

pub mod submit;
pub mod validate;

pub use submit::{SubmissionPhase, SubmissionWorkflow};
pub use validate::{validate_local_url, validate_target_url};
