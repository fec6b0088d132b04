/// Per-tile change matrix used to skip stable regions
pub mod bitset;
/// Dirty-tile optimizer wrapping any scheduling policy
pub mod dirty;
/// Generation loop and the strategy contract
pub mod driver;
/// Worker pool that runs blocks under a scheduling policy
pub mod executor;
/// Scheduling policies and block granularity
pub mod policy;
/// Cell transition rule
pub mod rule;
/// Full-interior sweep strategy
pub mod sweep;
