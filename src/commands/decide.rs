//! `copydesk accept` / `copydesk reject`: decide change groups.

use clap::Args;

use crate::error::Result;
use crate::revision::workflow;
use crate::store::db::Database;

#[derive(Debug, Args)]
pub struct AcceptArgs {
    suggestion_id: String,
    /// Accept only this group (as numbered by `review`, starting at 1);
    /// omit to accept everything still pending and merge
    #[arg(long)]
    group: Option<usize>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct RejectArgs {
    suggestion_id: String,
    /// Reject only this group (as numbered by `review`, starting at 1);
    /// omit to reject everything still pending
    #[arg(long)]
    group: Option<usize>,
    #[arg(long)]
    json: bool,
}

pub fn handle_accept(args: AcceptArgs) -> Result<()> {
    let mut db = Database::open_default()?;

    match args.group {
        Some(number) => {
            let index = group_index(number)?;
            let (suggestion, preview) =
                workflow::accept_group(&db, &args.suggestion_id, index)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&suggestion)?);
            } else {
                println!(
                    "accepted group {} of suggestion {} ({} still pending)",
                    number,
                    suggestion.id,
                    suggestion.pending_count()
                );
                println!();
                println!("preview with accepted groups applied:");
                println!("{}", preview);
            }
        }
        None => {
            let (suggestion, doc) = workflow::accept_all_pending(&mut db, &args.suggestion_id)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!(
                    "merged suggestion {} into document {} (revision {}, {} group(s) accepted)",
                    suggestion.id,
                    doc.id,
                    doc.revision,
                    suggestion.accepted_count()
                );
            }
        }
    }
    Ok(())
}

pub fn handle_reject(args: RejectArgs) -> Result<()> {
    let db = Database::open_default()?;

    match args.group {
        Some(number) => {
            let index = group_index(number)?;
            let suggestion = workflow::reject_group(&db, &args.suggestion_id, index)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&suggestion)?);
            } else {
                println!(
                    "rejected group {} of suggestion {} ({} still pending)",
                    number,
                    suggestion.id,
                    suggestion.pending_count()
                );
            }
        }
        None => {
            let suggestion = workflow::reject_all_pending(&db, &args.suggestion_id)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&suggestion)?);
            } else {
                println!(
                    "rejected suggestion {} (document unchanged)",
                    suggestion.id
                );
            }
        }
    }
    Ok(())
}

/// Review output numbers groups from 1; storage indexes from 0.
fn group_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| crate::error::CopydeskError::NotFound("change group 0".to_string()))
}
