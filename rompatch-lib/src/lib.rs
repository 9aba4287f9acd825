//! Archive-level operations: directory layout, rename planning and
//! execution, naming validation, and badge CSS generation.

pub mod badges;
pub mod error;
pub mod layout;
pub mod rename;
pub mod validate;

pub use error::ArchiveError;
pub use layout::ArchiveLayout;
pub use rename::{
    ExecuteOptions, PlanIssue, PlanOptions, PlanProgress, RecordOutcome, RenamePlan,
    RenameSummary, ValidatedPlan, execute_renames, plan_renames, validate_plan,
};
pub use validate::{ManifestReport, PrIssue, PrReport, validate_manifest, validate_pr_files};
