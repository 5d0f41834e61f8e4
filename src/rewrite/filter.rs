//! Commit message mapping and the `--msg-filter` script that applies it
//!
//! Each replacement message is written to `<dir>/messages/<original hash>`.
//! The filter script looks up `$GIT_COMMIT` there and passes every other
//! commit's message through unchanged.

use crate::attempt::attempt_sync;
use crate::error::Result;
use crate::git::shell_quote;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Replacement messages keyed by commit hash
///
/// Only commits whose message actually changes are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageMapping {
    entries: BTreeMap<String, String>,
}

impl MessageMapping {
    /// Build from `(hash, current message, new message)` triples
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String, String)>,
    {
        let entries = pairs
            .into_iter()
            .filter(|(_, current, new)| normalize(current) != normalize(new))
            .map(|(hash, _, new)| (hash, normalize(&new)))
            .collect();
        Self { entries }
    }

    /// No commit needs rewriting
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of commits to rewrite
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Replacement for `hash`, if any
    pub fn get(&self, hash: &str) -> Option<&str> {
        self.entries.get(hash).map(String::as_str)
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }
}

fn normalize(message: &str) -> String {
    message.replace("\r\n", "\n").trim().to_string()
}

/// Filter script plus its message files, removed when dropped
#[derive(Debug)]
pub struct MsgFilterScript {
    dir: PathBuf,
    script: PathBuf,
}

impl MsgFilterScript {
    /// Write the mapping and script under the system temp folder
    pub async fn write(mapping: &MessageMapping, stamp: &str) -> Result<Self> {
        let dir = std::env::temp_dir()
            .join("pr-command")
            .join(format!("msg-filter-{stamp}-{}", std::process::id()));
        let messages = dir.join("messages");
        fs::create_dir_all(&messages).await?;
        let this = Self {
            script: dir.join("filter.sh"),
            dir,
        };

        for (hash, message) in mapping.iter() {
            fs::write(messages.join(hash), format!("{message}\n")).await?;
        }
        fs::write(&this.script, render_script(&messages)).await?;
        Ok(this)
    }

    /// Path of the script to hand to `git filter-branch --msg-filter`
    pub fn path(&self) -> &Path {
        &self.script
    }

    /// Remove script and message files
    pub fn remove(mut self) -> std::io::Result<()> {
        let dir = std::mem::take(&mut self.dir);
        std::fs::remove_dir_all(dir)
    }
}

impl Drop for MsgFilterScript {
    fn drop(&mut self) {
        if !self.dir.as_os_str().is_empty() {
            attempt_sync("remove message filter", std::fs::remove_dir_all(&self.dir));
        }
    }
}

fn render_script(messages_dir: &Path) -> String {
    format!(
        "#!/bin/sh\n\
         dir={}\n\
         if [ -f \"$dir/$GIT_COMMIT\" ]; then\n\
         \tcat >/dev/null\n\
         \tcat \"$dir/$GIT_COMMIT\"\n\
         else\n\
         \tcat\n\
         fi\n",
        shell_quote(&messages_dir.to_string_lossy())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(hash: &str, current: &str, new: &str) -> (String, String, String) {
        (hash.to_string(), current.to_string(), new.to_string())
    }

    #[test]
    fn test_mapping_skips_unchanged() {
        let mapping = MessageMapping::from_pairs([
            triple("h1", "old A\n", "new A"),
            triple("h2", "old B\n\n", "old B"),
        ]);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("h1"), Some("new A"));
        assert_eq!(mapping.get("h2"), None);
    }

    #[test]
    fn test_mapping_ignores_line_endings() {
        let mapping = MessageMapping::from_pairs([triple("h1", "a\n\nb", "a\r\n\r\nb\r\n")]);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_script_reads_git_commit() {
        let script = render_script(Path::new("/tmp/x y/messages"));
        assert!(script.contains("dir='/tmp/x y/messages'"));
        assert!(script.contains("\"$dir/$GIT_COMMIT\""));
    }

    #[tokio::test]
    async fn test_script_files_removed() {
        let mapping = MessageMapping::from_pairs([triple("abc", "old", "new")]);
        let script = MsgFilterScript::write(&mapping, "unit-test").await.unwrap();
        let dir = script.path().parent().unwrap().to_path_buf();
        let message = std::fs::read_to_string(dir.join("messages").join("abc")).unwrap();
        assert_eq!(message, "new\n");
        script.remove().unwrap();
        assert!(!dir.exists());
    }
}
