//! `copydesk change` command suite: the manual change ledger.

use clap::{Subcommand, ValueEnum};

use crate::error::{CopydeskError, Result};
use crate::revision::ledger::{self, Change, ChangeType};
use crate::store::db::Database;

#[derive(Debug, Subcommand)]
pub enum ChangeCommand {
    /// Record a manual change for later approval
    Submit {
        document_id: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Byte offset where the change starts
        #[arg(long)]
        start: usize,
        /// Byte offset where the affected span ends (ignored for insertions)
        #[arg(long)]
        end: Option<usize>,
        /// Inserted or replacement text
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List changes recorded for a document
    List {
        document_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Show one change in full
    Show {
        change_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Approve a pending change and splice it into the document
    Approve {
        change_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Reject a pending change
    Reject {
        change_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Adjust a pending change's span or text
    Tweak {
        change_id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        end: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Insertion,
    Deletion,
    Replacement,
}

impl From<KindArg> for ChangeType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Insertion => ChangeType::Insertion,
            KindArg::Deletion => ChangeType::Deletion,
            KindArg::Replacement => ChangeType::Replacement,
        }
    }
}

pub fn handle_change(cmd: ChangeCommand) -> Result<()> {
    let mut db = Database::open_default()?;

    match cmd {
        ChangeCommand::Submit {
            document_id,
            kind,
            start,
            end,
            text,
            json,
        } => {
            let change_type = ChangeType::from(kind);
            let end = match change_type {
                ChangeType::Insertion => start,
                _ => end.ok_or_else(|| {
                    CopydeskError::Generic(format!(
                        "--end is required for {} changes",
                        change_type.as_str()
                    ))
                })?,
            };
            let change = ledger::submit_change(&db, &document_id, change_type, start, end, text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&change)?);
            } else {
                println!("{}", change.id);
                println!(
                    "recorded {} change at {}..{} (pending approval)",
                    change.change_type.as_str(),
                    change.start_pos,
                    change.end_pos
                );
            }
        }
        ChangeCommand::List { document_id, json } => {
            let changes = db.changes_for_document(&document_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&changes)?);
            } else if changes.is_empty() {
                println!("(no changes)");
            } else {
                for change in changes {
                    println!("{}", describe_change(&change));
                }
            }
        }
        ChangeCommand::Show { change_id, json } => {
            let change = require_change(&db, &change_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&change)?);
            } else {
                println!("change {}", change.id);
                println!("document: {}", change.document_id);
                println!("type: {}", change.change_type.as_str());
                println!("span: {}..{}", change.start_pos, change.end_pos);
                println!("status: {}", change.status.as_str());
                println!("old text: {:?}", change.old_text);
                match &change.new_text {
                    Some(text) => println!("new text: {:?}", text),
                    None => println!("new text: (none)"),
                }
            }
        }
        ChangeCommand::Approve { change_id, json } => {
            let (change, doc) = ledger::approve_change(&mut db, &change_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!(
                    "approved change {} (document {} now at revision {})",
                    change.id, doc.id, doc.revision
                );
            }
        }
        ChangeCommand::Reject { change_id, json } => {
            let change = ledger::reject_change(&db, &change_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&change)?);
            } else {
                println!("rejected change {} (document unchanged)", change.id);
            }
        }
        ChangeCommand::Tweak {
            change_id,
            text,
            start,
            end,
            json,
        } => {
            let change = ledger::tweak_change(&db, &change_id, text, start, end)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&change)?);
            } else {
                println!("updated change {}", describe_change(&change));
            }
        }
    }
    Ok(())
}

fn describe_change(change: &Change) -> String {
    format!(
        "{}  [{}]  {} {}..{}",
        change.id,
        change.status.as_str(),
        change.change_type.as_str(),
        change.start_pos,
        change.end_pos
    )
}

fn require_change(db: &Database, id: &str) -> Result<Change> {
    db.get_change(id)?
        .ok_or_else(|| CopydeskError::NotFound(format!("change {}", id)))
}
