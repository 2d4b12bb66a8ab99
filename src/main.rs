use clap::{Parser, Subcommand};

use copydesk::commands::change::{self, ChangeCommand};
use copydesk::commands::decide::{self, AcceptArgs, RejectArgs};
use copydesk::commands::doc::{self, DocCommand};
use copydesk::commands::review::{self, ReviewArgs};
use copydesk::commands::suggest::{self, SuggestArgs};

#[derive(Parser)]
#[command(name = "copydesk")]
#[command(about = "reviewable AI edits for plain-text documents", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage documents
    #[command(subcommand)]
    Doc(DocCommand),
    /// Diff a proposed revision into reviewable change groups
    Suggest(SuggestArgs),
    /// Show a suggestion's change groups
    Review(ReviewArgs),
    /// Accept change groups (one with --group, all pending otherwise)
    Accept(AcceptArgs),
    /// Reject change groups (one with --group, all pending otherwise)
    Reject(RejectArgs),
    /// Record and decide manual changes
    #[command(subcommand)]
    Change(ChangeCommand),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Doc(cmd) => doc::handle_doc(cmd),
        Command::Suggest(args) => suggest::handle_suggest(args),
        Command::Review(args) => review::handle_review(args),
        Command::Accept(args) => decide::handle_accept(args),
        Command::Reject(args) => decide::handle_reject(args),
        Command::Change(cmd) => change::handle_change(cmd),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
