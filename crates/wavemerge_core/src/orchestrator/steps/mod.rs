//! Pipeline step implementations.

mod finalize;
mod merge;
mod normalize;
mod plan;
mod validate;

pub use finalize::FinalizeStep;
pub use merge::MergeStep;
pub use normalize::NormalizeStep;
pub use plan::PlanStep;
pub use validate::ValidateStep;
