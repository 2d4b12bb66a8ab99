//! `copydesk review`: show a suggestion's change groups against its document.

use clap::Args;

use crate::error::Result;
use crate::revision::render::render_review;
use crate::revision::workflow;
use crate::store::db::Database;

#[derive(Debug, Args)]
pub struct ReviewArgs {
    suggestion_id: String,
    #[arg(long)]
    json: bool,
}

pub fn handle_review(args: ReviewArgs) -> Result<()> {
    let db = Database::open_default()?;
    let (suggestion, doc) = workflow::review_suggestion(&db, &args.suggestion_id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
    } else {
        print!("{}", render_review(&doc.content, &suggestion.groups));
    }
    Ok(())
}
