//! `copydesk doc` command suite: document CRUD.

use std::path::PathBuf;

use clap::Subcommand;

use crate::error::{CopydeskError, Result};
use crate::store::db::{Database, Document};

use super::read_input;

#[derive(Debug, Subcommand)]
pub enum DocCommand {
    /// Create a document
    New {
        /// Document title
        title: String,
        /// Read content from this file ("-" for stdin)
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Inline content
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List documents
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print a document's content
    Show {
        document_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Replace a document's content, bumping its revision
    Edit {
        document_id: String,
        /// Read the new content from this file ("-" for stdin)
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Inline content
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Delete a document and everything recorded against it
    Rm { document_id: String },
}

pub fn handle_doc(cmd: DocCommand) -> Result<()> {
    let mut db = Database::open_default()?;

    match cmd {
        DocCommand::New {
            title,
            file,
            text,
            json,
        } => {
            let content = resolve_content(file, text)?;
            let doc = Document::new(&title, &content);
            db.insert_document(&doc)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("{}", doc.id);
                println!("created document {:?} ({} bytes)", doc.title, doc.content.len());
            }
        }
        DocCommand::List { json } => {
            let docs = db.list_documents()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else if docs.is_empty() {
                println!("(no documents)");
            } else {
                for doc in docs {
                    println!("{}  rev {}  {}", doc.id, doc.revision, doc.title);
                }
            }
        }
        DocCommand::Show { document_id, json } => {
            let doc = require_document(&db, &document_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print!("{}", doc.content);
                if !doc.content.ends_with('\n') {
                    println!();
                }
            }
        }
        DocCommand::Edit {
            document_id,
            file,
            text,
            json,
        } => {
            let content = resolve_content(file, text)?;
            let doc = db.update_document_content(&document_id, &content)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("updated document {} (revision {})", doc.id, doc.revision);
            }
        }
        DocCommand::Rm { document_id } => {
            if !db.delete_document(&document_id)? {
                return Err(CopydeskError::NotFound(format!("document {}", document_id)));
            }
            println!("deleted document {}", document_id);
        }
    }
    Ok(())
}

fn resolve_content(file: Option<PathBuf>, text: Option<String>) -> Result<String> {
    match (file, text) {
        (Some(path), None) => read_input(&path),
        (None, Some(text)) => Ok(text),
        _ => Err(CopydeskError::Generic(
            "provide content with exactly one of --file or --text".to_string(),
        )),
    }
}

fn require_document(db: &Database, id: &str) -> Result<Document> {
    db.get_document(id)?
        .ok_or_else(|| CopydeskError::NotFound(format!("document {}", id)))
}
