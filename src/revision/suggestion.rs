//! Suggestions: persisted sets of change groups under review.

use serde::{Deserialize, Serialize};

use crate::error::{CopydeskError, Result};
use crate::utils::unix_now;

use super::apply::apply_accepted_groups;
use super::groups::{ChangeGroup, GroupStatus};

/// Aggregate review state of a suggestion. Only bulk operations move it;
/// individual group decisions leave it pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Accepted => "accepted",
            SuggestionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SuggestionStatus::Pending),
            "accepted" => Some(SuggestionStatus::Accepted),
            "rejected" => Some(SuggestionStatus::Rejected),
            _ => None,
        }
    }
}

/// One AI proposal against one document revision, broken into change
/// groups for independent review.
///
/// `base_revision` snapshots the document revision the groups were
/// computed against; workflows compare it with the live document before
/// trusting any recorded offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub document_id: String,
    pub base_revision: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    pub groups: Vec<ChangeGroup>,
    pub status: SuggestionStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Suggestion {
    pub fn new(
        document_id: &str,
        base_revision: u64,
        instruction: Option<String>,
        groups: Vec<ChangeGroup>,
    ) -> Self {
        let now = unix_now();
        Suggestion {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            base_revision,
            instruction,
            groups,
            status: SuggestionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.status != SuggestionStatus::Pending {
            return Err(CopydeskError::Generic(format!(
                "suggestion {} has already been {}",
                self.id,
                self.status.as_str()
            )));
        }
        Ok(())
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut ChangeGroup> {
        let count = self.groups.len();
        self.groups.get_mut(index).ok_or_else(|| {
            CopydeskError::NotFound(format!(
                "change group {} (suggestion has {} groups)",
                index, count
            ))
        })
    }

    fn decide_group(&mut self, index: usize, status: GroupStatus) -> Result<()> {
        self.ensure_open()?;
        let group = self.group_mut(index)?;
        if !group.is_pending() {
            return Err(CopydeskError::Generic(format!(
                "change group {} has already been {}",
                index,
                group.status.as_str()
            )));
        }
        group.status = status;
        self.updated_at = unix_now();
        Ok(())
    }

    /// Marks one pending group accepted. Terminal at the group level.
    pub fn accept_group(&mut self, index: usize) -> Result<()> {
        self.decide_group(index, GroupStatus::Accepted)
    }

    /// Marks one pending group rejected. Terminal at the group level.
    pub fn reject_group(&mut self, index: usize) -> Result<()> {
        self.decide_group(index, GroupStatus::Rejected)
    }

    /// Accepts every still-pending group and finalizes the aggregate.
    /// Groups already decided individually keep their decision.
    pub fn accept_all_pending(&mut self) -> Result<()> {
        self.ensure_open()?;
        for group in &mut self.groups {
            if group.is_pending() {
                group.status = GroupStatus::Accepted;
            }
        }
        self.status = SuggestionStatus::Accepted;
        self.updated_at = unix_now();
        Ok(())
    }

    /// Rejects every still-pending group and finalizes the aggregate. The
    /// document is never written on this path.
    pub fn reject_all_pending(&mut self) -> Result<()> {
        self.ensure_open()?;
        for group in &mut self.groups {
            if group.is_pending() {
                group.status = GroupStatus::Rejected;
            }
        }
        self.status = SuggestionStatus::Rejected;
        self.updated_at = unix_now();
        Ok(())
    }

    /// True once no group remains pending. Derived on read; the stored
    /// aggregate status still only moves on bulk operations.
    pub fn is_fully_resolved(&self) -> bool {
        self.groups.iter().all(|g| !g.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.groups.iter().filter(|g| g.is_pending()).count()
    }

    pub fn accepted_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.status == GroupStatus::Accepted)
            .count()
    }

    /// Document content with the currently accepted groups applied.
    pub fn preview_content(&self, base: &str) -> Result<String> {
        apply_accepted_groups(base, &self.groups)
    }

    /// Document content as if every group were accepted.
    pub fn proposed_content(&self, base: &str) -> Result<String> {
        let all_accepted: Vec<ChangeGroup> = self
            .groups
            .iter()
            .cloned()
            .map(|mut g| {
                g.status = GroupStatus::Accepted;
                g
            })
            .collect();
        apply_accepted_groups(base, &all_accepted)
    }
}
