//! prc - pull-request workflow automation
//!
//! CLI binary driving branch detection, PR preparation and submission, and
//! safe commit-history rewriting on top of git and GitHub.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pr_command::config::BranchType;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "prc")]
#[command(about = "Pull-request workflow automation for git and GitHub")]
#[command(version)]
struct Cli {
    /// Path to the git repository (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Print machine-readable JSON instead of styled text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug); `PRC_LOG` overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current branch and suggest a PR target
    DetectBranches {
        /// Target branch to use instead of the suggestion
        #[arg(long)]
        target: Option<String>,
    },

    /// Gather the change bundle, template and card links for a PR
    PreparePr {
        /// Branch the PR merges into
        #[arg(long)]
        target: String,

        /// Branch holding the changes (defaults to the checked-out branch)
        #[arg(long)]
        current: Option<String>,

        /// Card/ticket link to include
        #[arg(long)]
        card_link: Option<String>,
    },

    /// Push the branch and create or update its PR
    SubmitPr {
        /// Branch the PR merges into
        #[arg(long)]
        target: String,

        /// Branch holding the changes (defaults to the checked-out branch)
        #[arg(long)]
        current: Option<String>,

        /// PR title
        #[arg(long)]
        title: String,

        /// PR body
        #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
        body: Option<String>,

        /// Read the PR body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Existing PR to update instead of opening a new one
        #[arg(long)]
        pr: Option<u64>,

        /// Keep the generated scratch files
        #[arg(long)]
        keep_scratch: bool,
    },

    /// List the messages of the commits not yet on the target
    CommitMessages {
        /// Base branch of the range
        #[arg(long)]
        target: String,

        /// Head branch of the range (defaults to the checked-out branch)
        #[arg(long)]
        current: Option<String>,
    },

    /// Write the change bundle (messages, diff summary, full diff) to a file
    CommitContents {
        /// Base branch of the range
        #[arg(long)]
        target: String,

        /// Head branch of the range (defaults to the checked-out branch)
        #[arg(long)]
        current: Option<String>,
    },

    /// Replace every commit message in target..current and force-push
    ReplaceMessages {
        /// Base branch of the range
        #[arg(long)]
        target: String,

        /// Branch to rewrite (defaults to the checked-out branch)
        #[arg(long)]
        current: Option<String>,

        /// New message, oldest commit first; repeat once per commit
        #[arg(short, long = "message", conflicts_with = "messages_file")]
        messages: Vec<String>,

        /// JSON array of new messages, oldest commit first
        #[arg(long)]
        messages_file: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Squash target..current into one commit and force-push
    Squash {
        /// Base branch of the range
        #[arg(long)]
        target: String,

        /// Branch to rewrite (defaults to the checked-out branch)
        #[arg(long)]
        current: Option<String>,

        /// Message of the squashed commit
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        message: Option<String>,

        /// Read the squashed commit message from a file
        #[arg(short = 'F', long)]
        file: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create and check out `<type>/<suffix>` from its configured base
    CreateBranch {
        /// Branch type: feat, fix, hotfix or release
        branch_type: BranchType,

        /// Name after the type prefix
        suffix: String,

        /// Base branch instead of the configured one
        #[arg(long)]
        base: Option<String>,
    },

    /// Prepare an update for an existing PR given its URL
    UpdatePr {
        /// PR URL, e.g. https://github.com/owner/repo/pull/12
        url: String,

        /// Card/ticket link to include
        #[arg(long)]
        card_link: Option<String>,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test GitHub authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("PRC_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));
    let json = cli.json;

    let result = match cli.command {
        Commands::DetectBranches { target } => {
            cli::run_detect_branches(&path, json, target.as_deref()).await
        }
        Commands::PreparePr {
            target,
            current,
            card_link,
        } => {
            cli::run_prepare_pr(
                &path,
                json,
                &target,
                current.as_deref(),
                card_link.as_deref(),
            )
            .await
        }
        Commands::SubmitPr {
            target,
            current,
            title,
            body,
            body_file,
            pr,
            keep_scratch,
        } => {
            let args = cli::SubmitArgs {
                target,
                current,
                title,
                body: cli::TextSource::new(body, body_file),
                pr,
                keep_scratch,
            };
            cli::run_submit_pr(&path, json, args).await
        }
        Commands::CommitMessages { target, current } => {
            cli::run_commit_messages(&path, json, &target, current.as_deref()).await
        }
        Commands::CommitContents { target, current } => {
            cli::run_commit_contents(&path, json, &target, current.as_deref()).await
        }
        Commands::ReplaceMessages {
            target,
            current,
            messages,
            messages_file,
            yes,
        } => {
            let source = match messages_file {
                Some(file) => cli::MessagesSource::JsonFile(file),
                None => cli::MessagesSource::Inline(messages),
            };
            cli::run_replace_messages(&path, json, &target, current.as_deref(), source, yes).await
        }
        Commands::Squash {
            target,
            current,
            message,
            file,
            yes,
        } => {
            let message = cli::TextSource::new(message, file);
            cli::run_squash(&path, json, &target, current.as_deref(), message, yes).await
        }
        Commands::CreateBranch {
            branch_type,
            suffix,
            base,
        } => cli::run_create_branch(&path, json, branch_type, &suffix, base.as_deref()).await,
        Commands::UpdatePr { url, card_link } => {
            cli::run_update_pr(&path, json, &url, card_link.as_deref()).await
        }
        Commands::Auth { action } => match action {
            AuthAction::Test => cli::run_auth_test(json).await,
            AuthAction::Setup => {
                cli::run_auth_setup();
                Ok(())
            }
        },
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            cli::report_error(json, &err);
            Ok(ExitCode::FAILURE)
        }
    }
}
