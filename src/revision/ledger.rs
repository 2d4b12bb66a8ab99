//! Manual change ledger: single spans submitted by hand and approved or
//! rejected one at a time, independent of the diff-driven suggestion flow.

use serde::{Deserialize, Serialize};

use crate::error::{CopydeskError, Result};
use crate::store::db::{Database, Document};
use crate::utils::{debug_log, unix_now};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Insertion,
    Deletion,
    Replacement,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Insertion => "insertion",
            ChangeType::Deletion => "deletion",
            ChangeType::Replacement => "replacement",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "insertion" => Some(ChangeType::Insertion),
            "deletion" => Some(ChangeType::Deletion),
            "replacement" => Some(ChangeType::Replacement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Pending => "pending",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ChangeStatus::Pending),
            "approved" => Some(ChangeStatus::Approved),
            "rejected" => Some(ChangeStatus::Rejected),
            _ => None,
        }
    }
}

/// One submitted edit. `old_text` and `content_snapshot` capture what the
/// document looked like at submission time, for audit and divergence
/// detection.
#[derive(Debug, Clone, Serialize)]
pub struct Change {
    pub id: String,
    pub document_id: String,
    pub change_type: ChangeType,
    pub start_pos: usize,
    pub end_pos: usize,
    pub new_text: Option<String>,
    pub old_text: String,
    pub content_snapshot: String,
    pub status: ChangeStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Change {
    pub fn new(
        document_id: &str,
        change_type: ChangeType,
        start_pos: usize,
        end_pos: usize,
        new_text: Option<String>,
        old_text: String,
        content_snapshot: &str,
    ) -> Self {
        let now = unix_now();
        Change {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            change_type,
            start_pos,
            end_pos,
            new_text,
            old_text,
            content_snapshot: content_snapshot.to_string(),
            status: ChangeStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Insertions occupy a zero-width span at `start_pos` no matter what
    /// `end_pos` says.
    fn effective_span(&self) -> (usize, usize) {
        match self.change_type {
            ChangeType::Insertion => (self.start_pos, self.start_pos),
            _ => (self.start_pos, self.end_pos),
        }
    }
}

/// Applies one change to `content`, returning the spliced text. Fails
/// with `InvalidRange` when the span is out of bounds, inverted, or
/// splits a character.
pub fn splice_change(content: &str, change: &Change) -> Result<String> {
    let (start, end) = change.effective_span();
    let invalid = || {
        CopydeskError::InvalidRange(format!(
            "change span {}..{} is invalid for document of length {}",
            start,
            end,
            content.len()
        ))
    };
    let prefix = content.get(..start).ok_or_else(invalid)?;
    let suffix = content.get(end..).ok_or_else(invalid)?;
    if start > end {
        return Err(invalid());
    }

    let new_len = change.new_text.as_ref().map_or(0, |t| t.len());
    let mut out = String::with_capacity(prefix.len() + new_len + suffix.len());
    out.push_str(prefix);
    if change.change_type != ChangeType::Deletion {
        if let Some(text) = &change.new_text {
            out.push_str(text);
        }
    }
    out.push_str(suffix);
    Ok(out)
}

/// Records a new pending change against a document, capturing the text
/// currently in its span.
pub fn submit_change(
    db: &Database,
    document_id: &str,
    change_type: ChangeType,
    start_pos: usize,
    end_pos: usize,
    new_text: Option<String>,
) -> Result<Change> {
    let doc = db
        .get_document(document_id)?
        .ok_or_else(|| CopydeskError::NotFound(format!("document {}", document_id)))?;

    let end_pos = match change_type {
        ChangeType::Insertion => start_pos,
        _ => end_pos,
    };
    let old_text = doc
        .content
        .get(start_pos..end_pos)
        .ok_or_else(|| {
            CopydeskError::InvalidRange(format!(
                "change span {}..{} is invalid for document of length {}",
                start_pos,
                end_pos,
                doc.content.len()
            ))
        })?
        .to_string();

    let new_text = match change_type {
        ChangeType::Deletion => None,
        _ => Some(new_text.ok_or_else(|| {
            CopydeskError::Generic(format!(
                "{} changes require new text",
                change_type.as_str()
            ))
        })?),
    };

    let change = Change::new(
        document_id,
        change_type,
        start_pos,
        end_pos,
        new_text,
        old_text,
        &doc.content,
    );
    db.insert_change(&change)?;
    debug_log(&format!(
        "recorded {} change {} for document {}",
        change.change_type.as_str(),
        change.id,
        document_id
    ));
    Ok(change)
}

/// Approves a pending change, splicing it into the document's current
/// content. The splice runs against the live document, not the snapshot;
/// when the span's text has drifted since submission the change still
/// applies to whatever sits there now.
pub fn approve_change(db: &mut Database, id: &str) -> Result<(Change, Document)> {
    let mut change = require_change(db, id)?;
    ensure_pending(&change)?;
    let doc = db
        .get_document(&change.document_id)?
        .ok_or_else(|| CopydeskError::NotFound(format!("document {}", change.document_id)))?;

    let (start, end) = change.effective_span();
    if let Some(live) = doc.content.get(start..end) {
        if live != change.old_text {
            debug_log(&format!(
                "change {}: span text diverged from the submission snapshot",
                change.id
            ));
        }
    }

    let new_content = splice_change(&doc.content, &change)?;
    change.status = ChangeStatus::Approved;
    change.updated_at = unix_now();
    let doc = db.commit_change_approval(&change, &new_content)?;
    Ok((change, doc))
}

/// Rejects a pending change. The document is untouched.
pub fn reject_change(db: &Database, id: &str) -> Result<Change> {
    let mut change = require_change(db, id)?;
    ensure_pending(&change)?;
    change.status = ChangeStatus::Rejected;
    change.updated_at = unix_now();
    db.update_change(&change)?;
    Ok(change)
}

/// Adjusts a pending change's text or span. Offsets are revalidated
/// against live content at approval; `old_text` stays as captured at
/// submission.
pub fn tweak_change(
    db: &Database,
    id: &str,
    new_text: Option<String>,
    start_pos: Option<usize>,
    end_pos: Option<usize>,
) -> Result<Change> {
    let mut change = require_change(db, id)?;
    ensure_pending(&change)?;

    if let Some(text) = new_text {
        if change.change_type == ChangeType::Deletion {
            return Err(CopydeskError::Generic(
                "deletion changes carry no new text".to_string(),
            ));
        }
        change.new_text = Some(text);
    }
    if let Some(start) = start_pos {
        change.start_pos = start;
    }
    if let Some(end) = end_pos {
        change.end_pos = end;
    }
    if change.change_type == ChangeType::Insertion {
        change.end_pos = change.start_pos;
    }
    if change.start_pos > change.end_pos {
        return Err(CopydeskError::InvalidRange(format!(
            "change span {}..{} is inverted",
            change.start_pos, change.end_pos
        )));
    }

    change.updated_at = unix_now();
    db.update_change(&change)?;
    Ok(change)
}

fn require_change(db: &Database, id: &str) -> Result<Change> {
    db.get_change(id)?
        .ok_or_else(|| CopydeskError::NotFound(format!("change {}", id)))
}

fn ensure_pending(change: &Change) -> Result<()> {
    if change.status != ChangeStatus::Pending {
        return Err(CopydeskError::Generic(format!(
            "change {} has already been {}",
            change.id,
            change.status.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(
        change_type: ChangeType,
        start: usize,
        end: usize,
        new_text: Option<&str>,
    ) -> Change {
        Change::new(
            "doc",
            change_type,
            start,
            end,
            new_text.map(|t| t.to_string()),
            String::new(),
            "ABCDE",
        )
    }

    #[test]
    fn insertion_splices_at_offset() {
        let c = change(ChangeType::Insertion, 2, 2, Some("X"));
        assert_eq!(splice_change("ABCDE", &c).unwrap(), "ABXCDE");
    }

    #[test]
    fn deletion_removes_span() {
        let c = change(ChangeType::Deletion, 1, 3, None);
        assert_eq!(splice_change("ABCDE", &c).unwrap(), "ADE");
    }

    #[test]
    fn replacement_swaps_span() {
        let c = change(ChangeType::Replacement, 1, 3, Some("xy"));
        assert_eq!(splice_change("ABCDE", &c).unwrap(), "AxyDE");
    }

    #[test]
    fn deletion_ignores_stray_new_text() {
        let c = change(ChangeType::Deletion, 1, 3, Some("Z"));
        assert_eq!(splice_change("ABCDE", &c).unwrap(), "ADE");
    }

    #[test]
    fn out_of_bounds_span_is_refused() {
        let c = change(ChangeType::Deletion, 3, 10, None);
        assert!(matches!(
            splice_change("ABCDE", &c),
            Err(CopydeskError::InvalidRange(_))
        ));
    }

    #[test]
    fn inverted_span_is_refused() {
        let c = change(ChangeType::Deletion, 4, 2, None);
        assert!(matches!(
            splice_change("ABCDE", &c),
            Err(CopydeskError::InvalidRange(_))
        ));
    }

    #[test]
    fn mid_character_span_is_refused() {
        let c = change(ChangeType::Deletion, 2, 3, None);
        assert!(matches!(
            splice_change("h\u{e9}llo", &c),
            Err(CopydeskError::InvalidRange(_))
        ));
    }
}
