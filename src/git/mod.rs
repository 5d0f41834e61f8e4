//! Version-control façade
//!
//! Every git invocation goes through [`GitCommand`], bound to an explicit
//! repository path, and fails with a single error kind
//! ([`Error::VcsCommandFailed`](crate::error::Error::VcsCommandFailed)).

mod command;
mod log;
mod refs;
mod repo;

pub use command::GitCommand;
pub use log::{COMMIT_SENTINEL, LogFormat, LogOptions, parse_messages, parse_records};
pub use refs::RefResolver;
pub use repo::{CheckoutOptions, CommitMessage, CommitOptions, GitRepo, PushOptions, ResetMode};
pub(crate) use repo::shell_quote;
