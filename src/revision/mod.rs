//! Diffing, change grouping, review and the manual change ledger.

pub mod apply;
pub mod differ;
pub mod groups;
pub mod ledger;
pub mod render;
pub mod suggestion;
pub mod token_diff;
pub mod workflow;
