//! Suggestion lifecycle against the store: create, decide, merge.

use crate::config::Config;
use crate::error::{CopydeskError, Result};
use crate::store::db::{Database, Document};
use crate::utils::debug_log;

use super::groups::compute_change_groups;
use super::suggestion::Suggestion;

/// Diffs `proposed` against the document's current content and persists
/// the result as a pending suggestion. Any previously pending suggestions
/// for the document are rejected first, so at most one suggestion is
/// under review per document.
pub fn create_suggestion(
    db: &Database,
    document_id: &str,
    proposed: &str,
    instruction: Option<String>,
) -> Result<Suggestion> {
    let doc = require_document(db, document_id)?;

    let limit = Config::get().max_document_bytes();
    if doc.content.len() > limit || proposed.len() > limit {
        return Err(CopydeskError::Generic(format!(
            "document too large for suggestion review (limit {} bytes)",
            limit
        )));
    }

    let cleared = clear_pending(db, document_id)?;
    if cleared > 0 {
        debug_log(&format!(
            "cleared {} pending suggestion(s) for document {}",
            cleared, document_id
        ));
    }

    let groups = compute_change_groups(&doc.content, proposed);
    let suggestion = Suggestion::new(document_id, doc.revision, instruction, groups);
    db.insert_suggestion(&suggestion)?;
    Ok(suggestion)
}

/// Loads a suggestion and its document for display, refusing stale ones
/// whose offsets no longer line up with the document.
pub fn review_suggestion(db: &Database, suggestion_id: &str) -> Result<(Suggestion, Document)> {
    let suggestion = require_suggestion(db, suggestion_id)?;
    let doc = require_document(db, &suggestion.document_id)?;
    ensure_fresh(&suggestion, &doc)?;
    Ok((suggestion, doc))
}

/// Accepts one group and returns the suggestion plus a preview of the
/// document with all currently accepted groups applied. The document
/// itself is not written.
pub fn accept_group(
    db: &Database,
    suggestion_id: &str,
    index: usize,
) -> Result<(Suggestion, String)> {
    let mut suggestion = require_suggestion(db, suggestion_id)?;
    let doc = require_document(db, &suggestion.document_id)?;
    suggestion.accept_group(index)?;
    ensure_fresh(&suggestion, &doc)?;
    let preview = suggestion.preview_content(&doc.content)?;
    db.update_suggestion(&suggestion)?;
    Ok((suggestion, preview))
}

/// Rejects one group. No freshness check: discarding part of a stale
/// suggestion is always safe.
pub fn reject_group(db: &Database, suggestion_id: &str, index: usize) -> Result<Suggestion> {
    let mut suggestion = require_suggestion(db, suggestion_id)?;
    suggestion.reject_group(index)?;
    db.update_suggestion(&suggestion)?;
    Ok(suggestion)
}

/// Accepts every remaining pending group and merges the accepted set
/// into the document, bumping its revision. Groups rejected earlier stay
/// rejected.
pub fn accept_all_pending(
    db: &mut Database,
    suggestion_id: &str,
) -> Result<(Suggestion, Document)> {
    let mut suggestion = require_suggestion(db, suggestion_id)?;
    let doc = require_document(db, &suggestion.document_id)?;
    suggestion.accept_all_pending()?;
    ensure_fresh(&suggestion, &doc)?;
    let merged = suggestion.preview_content(&doc.content)?;
    let doc = db.finalize_accepted_suggestion(&suggestion, &merged)?;
    debug_log(&format!(
        "merged suggestion {} into document {} (revision {})",
        suggestion.id, doc.id, doc.revision
    ));
    Ok((suggestion, doc))
}

/// Rejects every remaining pending group and finalizes the suggestion.
/// The document is never written. No freshness check here either.
pub fn reject_all_pending(db: &Database, suggestion_id: &str) -> Result<Suggestion> {
    let mut suggestion = require_suggestion(db, suggestion_id)?;
    suggestion.reject_all_pending()?;
    db.update_suggestion(&suggestion)?;
    Ok(suggestion)
}

/// Rejects every pending suggestion for a document. Returns how many
/// were cleared.
pub fn clear_pending(db: &Database, document_id: &str) -> Result<usize> {
    let pending = db.pending_suggestions_for(document_id)?;
    let count = pending.len();
    for mut suggestion in pending {
        suggestion.reject_all_pending()?;
        db.update_suggestion(&suggestion)?;
    }
    Ok(count)
}

fn require_document(db: &Database, id: &str) -> Result<Document> {
    db.get_document(id)?
        .ok_or_else(|| CopydeskError::NotFound(format!("document {}", id)))
}

fn require_suggestion(db: &Database, id: &str) -> Result<Suggestion> {
    db.get_suggestion(id)?
        .ok_or_else(|| CopydeskError::NotFound(format!("suggestion {}", id)))
}

fn ensure_fresh(suggestion: &Suggestion, doc: &Document) -> Result<()> {
    if suggestion.base_revision != doc.revision {
        return Err(CopydeskError::StaleSuggestion {
            base_revision: suggestion.base_revision,
            document_revision: doc.revision,
        });
    }
    Ok(())
}
