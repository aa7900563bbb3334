//! Target resolution: destination paths, conflict detection and the
//! interactive conflict policies

pub mod conflict;
pub mod decision;
pub mod engine;
pub mod paths;

pub use conflict::{build_targets, detect_conflicts, holds_previous_download};
pub use decision::{ConsoleDecisions, DecisionProvider, ScriptedDecisions};
pub use engine::{
    apply_decision, parse_selection, parse_single_answer, resolve_batch, resolve_single,
    Resolution, Selection,
};
pub use paths::{arrangement_path, numbered_sibling, RenamingAllocator};
