//! `copydesk suggest`: diff a proposed revision into reviewable groups.

use std::path::PathBuf;

use clap::Args;

use crate::error::Result;
use crate::revision::render::render_review;
use crate::revision::workflow;
use crate::store::db::Database;

use super::read_input;

#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Document to revise
    document_id: String,
    /// File holding the proposed text ("-" for stdin)
    #[arg(long)]
    proposed: PathBuf,
    /// What the revision was asked to do, kept for the audit trail
    #[arg(long)]
    instruction: Option<String>,
    #[arg(long)]
    json: bool,
}

pub fn handle_suggest(args: SuggestArgs) -> Result<()> {
    let db = Database::open_default()?;
    let proposed = read_input(&args.proposed)?;

    let suggestion =
        workflow::create_suggestion(&db, &args.document_id, &proposed, args.instruction)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
        return Ok(());
    }

    let (suggestion, doc) = workflow::review_suggestion(&db, &suggestion.id)?;
    println!("{}", suggestion.id);
    print!("{}", render_review(&doc.content, &suggestion.groups));
    Ok(())
}
