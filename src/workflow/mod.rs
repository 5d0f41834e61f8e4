//! Caller-facing PR workflow operations
//!
//! Each operation returns a serializable output whose `next_actions` tell
//! the caller what to do next:
//! 1. Detection - current branch, target suggestion, card link
//! 2. Preparation - change bundle, PR template, existing PR content
//! 3. Submission - push, then create or update the PR

mod branches;
pub mod card_link;
mod commits;
mod pull_request;

pub use branches::{CreateBranchOutput, DetectBranchesOutput, create_branch, detect_branches};
pub use commits::{
    CommitContentsOutput, CommitMessagesOutput, get_commit_contents, get_commit_messages,
    replace_commit_messages, squash_commits,
};
pub use pull_request::{
    PreparePrOutput, PreparePrRequest, SubmitPrOutput, SubmitPrRequest, UpdatePrByLinkOutput,
    UpdatePrByLinkRequest, prepare_pr, submit_pr, update_pr_by_link,
};

/// Prefix each action with its 1-based position
pub(crate) fn numbered(actions: Vec<String>) -> Vec<String> {
    actions
        .into_iter()
        .enumerate()
        .map(|(i, action)| format!("{}. {action}", i + 1))
        .collect()
}
