//! Workflow operation tests: real repositories, mocked PR gateway

#![cfg(unix)]

mod common;

use common::{MockPrGateway, TestRepo};
use pr_command::config::{BranchType, CardLinkConfig, Config};
use pr_command::error::Error;
use pr_command::rewrite::NoopProgress;
use pr_command::types::PrField;
use pr_command::workflow::{
    PreparePrRequest, SubmitPrRequest, UpdatePrByLinkRequest, create_branch, detect_branches,
    get_commit_contents, get_commit_messages, prepare_pr, replace_commit_messages, squash_commits,
    submit_pr, update_pr_by_link,
};

fn card_config() -> Config {
    Config {
        card_links: CardLinkConfig {
            website: Some("https://tracker.example.com".to_string()),
            path_template: Some("/cards/{cardId}".to_string()),
            branch_card_id_pattern: Some(r"(\d+)".to_string()),
        },
        ..Config::default()
    }
}

// =============================================================================
// Commit inspection
// =============================================================================

#[tokio::test]
async fn test_commit_messages_oldest_first() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/list", &["feat: first", "feat: second\n\nwith body", "feat: third"]);
    let git = repo.open().await;

    let out = get_commit_messages(&git, &Config::default(), "feat/list", "main")
        .await
        .unwrap();

    assert_eq!(
        out.commits,
        vec!["feat: first", "feat: second\n\nwith body", "feat: third"]
    );
}

#[tokio::test]
async fn test_commit_messages_unknown_target() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/list", &["feat: first"]);
    let git = repo.open().await;

    let err = get_commit_messages(&git, &Config::default(), "feat/list", "nope")
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::RefNotFound(name) if name == "nope"), "got {err}");
}

#[tokio::test]
async fn test_commit_messages_remote_only_branch() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/remote", &["feat: pushed"]);
    repo.push("feat/remote");
    repo.git(&["checkout", "--quiet", "main"]);
    repo.git(&["branch", "-D", "feat/remote"]);
    let git = repo.open().await;

    let out = get_commit_messages(&git, &Config::default(), "feat/remote", "main")
        .await
        .unwrap();

    assert_eq!(out.commits, vec!["feat: pushed"]);
}

#[tokio::test]
async fn test_commit_messages_unfetched_remote_branch() {
    let repo = TestRepo::new();
    repo.push_from_other_clone("feat/mate", &["feat: from a teammate", "fix: follow-up"]);
    assert!(!repo.has_tracking_ref("feat/mate"));
    let git = repo.open().await;

    let out = get_commit_messages(&git, &Config::default(), "feat/mate", "main")
        .await
        .unwrap();

    assert_eq!(out.commits, vec!["feat: from a teammate", "fix: follow-up"]);
    assert!(repo.has_tracking_ref("feat/mate"));
}

#[tokio::test]
async fn test_commit_contents_unfetched_remote_branch() {
    let repo = TestRepo::new();
    repo.push_from_other_clone("feat/mate", &["feat: shared work"]);
    let git = repo.open().await;

    let out = get_commit_contents(&git, &Config::default(), "feat/mate", "main")
        .await
        .unwrap();

    let content = std::fs::read_to_string(&out.changes_file).unwrap();
    assert!(content.contains("feat: shared work"));
    assert!(content.contains("feat-mate-0.txt"));
}

#[tokio::test]
async fn test_commit_contents_writes_bundle() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/bundle", &["feat: add widget"]);
    let git = repo.open().await;

    let out = get_commit_contents(&git, &Config::default(), "feat/bundle", "main")
        .await
        .unwrap();

    assert!(out.changes_file.starts_with(repo.git_dir().join("pr-command")));
    let content = std::fs::read_to_string(&out.changes_file).unwrap();
    assert!(content.contains("## Commits"));
    assert!(content.contains("feat: add widget"));
    assert!(content.contains("## Diff Summary"));
    assert!(content.contains("feat-bundle-0.txt"));
    assert!(content.contains("## Code Diff"));
    assert!(content.contains("+feat: add widget"));
    // the scratch folder never dirties the tree
    assert!(repo.git(&["status", "--porcelain"]).is_empty());
}

#[tokio::test]
async fn test_commit_contents_requires_remote_target() {
    let repo = TestRepo::new();
    repo.git(&["branch", "local-only"]);
    repo.feature_branch("feat/bundle", &["feat: add widget"]);
    let git = repo.open().await;

    let err = get_commit_contents(&git, &Config::default(), "feat/bundle", "local-only")
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::RefNotFound(name) if name == "origin/local-only"));
}

// =============================================================================
// Branches
// =============================================================================

#[tokio::test]
async fn test_detect_branches_with_explicit_target() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/1234-login", &["wip"]);
    let git = repo.open().await;

    let out = detect_branches(&git, &card_config(), Some("main"))
        .await
        .unwrap();

    assert_eq!(out.current_branch, "feat/1234-login");
    assert_eq!(out.suggested_target, "main");
    assert_eq!(
        out.inferred_card_link.as_deref(),
        Some("https://tracker.example.com/cards/1234")
    );
    assert!(out.next_actions.iter().all(|a| a.starts_with(char::is_numeric)));
    assert!(out.next_actions.last().unwrap().contains("prepare-pr"));
}

#[tokio::test]
async fn test_detect_branches_suggests_closest() {
    let repo = TestRepo::new();
    repo.git(&["checkout", "--quiet", "staging"]);
    repo.commit_file("staging.txt", "s\n", "chore: staging only");
    repo.feature_branch("feat/near", &["wip"]);
    let git = repo.open().await;

    let out = detect_branches(&git, &Config::default(), None).await.unwrap();

    assert_eq!(out.current_branch, "feat/near");
    assert_eq!(out.suggested_target, "staging");
    assert!(out.inferred_card_link.is_none());
    assert!(out.next_actions[0].starts_with("1. Confirm"));
}

#[tokio::test]
async fn test_create_branch_from_configured_base() {
    let repo = TestRepo::new();
    let git = repo.open().await;

    let out = create_branch(&git, &Config::default(), BranchType::Feat, "New Login Page", None)
        .await
        .unwrap();

    assert_eq!(out.branch_name, "feat/new-login-page");
    assert_eq!(out.base_branch, "staging");
    assert_eq!(repo.current_branch(), "feat/new-login-page");
    assert_eq!(repo.branch_tip("feat/new-login-page"), repo.remote_tip("staging"));
}

#[tokio::test]
async fn test_create_branch_hotfix_uses_production() {
    let repo = TestRepo::new();
    let git = repo.open().await;

    let out = create_branch(&git, &Config::default(), BranchType::Hotfix, "crash", None)
        .await
        .unwrap();

    assert_eq!(out.branch_name, "hotfix/crash");
    assert_eq!(out.base_branch, "main");
}

#[tokio::test]
async fn test_create_branch_missing_base() {
    let repo = TestRepo::new();
    let git = repo.open().await;

    let err = create_branch(&git, &Config::default(), BranchType::Fix, "x", Some("nowhere"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RefNotFound(_)));
}

// =============================================================================
// Rewrites through the workflow surface
// =============================================================================

#[tokio::test]
async fn test_workflow_replace_and_squash() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/flow", &["a", "b"]);
    repo.push("feat/flow");
    let git = repo.open().await;
    let config = Config::default();

    let replaced = replace_commit_messages(
        &git,
        &config,
        "feat/flow",
        "main",
        &["feat: a".to_string(), "feat: b".to_string()],
        &NoopProgress,
    )
    .await
    .unwrap();
    assert_eq!(replaced.replaced, 2);

    let squashed = squash_commits(&git, &config, "feat/flow", "main", "feat: a and b", &NoopProgress)
        .await
        .unwrap();
    assert_eq!(squashed.commit_count, 2);
    assert_eq!(repo.messages("main", "feat/flow"), vec!["feat: a and b"]);
}

// =============================================================================
// Pull requests
// =============================================================================

#[tokio::test]
async fn test_prepare_pr_new() {
    let repo = TestRepo::new();
    std::fs::create_dir_all(repo.path().join(".github")).unwrap();
    std::fs::write(
        repo.path().join(".github/PULL_REQUEST_TEMPLATE.md"),
        "## What\n\n## Why\n",
    )
    .unwrap();
    repo.git(&["add", ".github"]);
    repo.git(&["commit", "--quiet", "-m", "chore: template"]);
    repo.feature_branch("feat/77-search", &["feat: search box"]);
    let git = repo.open().await;
    let gateway = MockPrGateway::new();

    let out = prepare_pr(
        &git,
        &card_config(),
        &gateway,
        PreparePrRequest {
            target_branch: "staging",
            current_branch: "feat/77-search",
            card_link: Some("https://tracker.example.com/cards/5"),
        },
    )
    .await
    .unwrap();

    assert_eq!(out.pr_number, None);
    assert_eq!(
        out.pr_template.as_deref(),
        Some(".github/PULL_REQUEST_TEMPLATE.md")
    );
    assert_eq!(
        out.card_links,
        vec![
            "https://tracker.example.com/cards/5",
            "https://tracker.example.com/cards/77",
        ]
    );
    assert_eq!(out.files_to_read.len(), 1);
    assert!(out.files_to_read[0].exists());
    assert!(out.next_actions.iter().any(|a| a.contains("cardLinks")));
    assert!(out.next_actions.last().unwrap().contains("submit-pr"));
    assert_eq!(
        gateway.list_calls(),
        vec![("staging".to_string(), "feat/77-search".to_string())]
    );
}

#[tokio::test]
async fn test_prepare_pr_existing_pr() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/update", &["feat: update"]);
    repo.push("feat/update");
    let git = repo.open().await;
    let gateway = MockPrGateway::new();
    gateway.add_pr(
        42,
        "main",
        "feat/update",
        "Old title",
        "See https://tracker.example.com/cards/9 for context",
    );

    let out = prepare_pr(
        &git,
        &card_config(),
        &gateway,
        PreparePrRequest {
            target_branch: "main",
            current_branch: "feat/update",
            card_link: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(out.pr_number, Some(42));
    assert!(out.pr_template.is_none());
    assert_eq!(out.card_links, vec!["https://tracker.example.com/cards/9"]);
    assert_eq!(out.files_to_read.len(), 2);
    let pr_content = std::fs::read_to_string(&out.files_to_read[1]).unwrap();
    assert!(pr_content.starts_with("Title: Old title\n\n"));
    assert!(out.next_actions.last().unwrap().contains("42"));
    assert_eq!(gateway.view_calls()[0].1, vec![PrField::Title, PrField::Body]);
}

#[tokio::test]
async fn test_prepare_pr_for_unfetched_remote_branch() {
    let repo = TestRepo::new();
    repo.push_from_other_clone("feat/review-me", &["feat: needs review"]);
    let git = repo.open().await;
    let gateway = MockPrGateway::new();

    let out = prepare_pr(
        &git,
        &Config::default(),
        &gateway,
        PreparePrRequest {
            target_branch: "main",
            current_branch: "feat/review-me",
            card_link: None,
        },
    )
    .await
    .unwrap();

    let changes = std::fs::read_to_string(&out.files_to_read[0]).unwrap();
    assert!(changes.contains("feat: needs review"));
    assert!(repo.has_tracking_ref("feat/review-me"));
}

#[tokio::test]
async fn test_prepare_pr_creates_local_target() {
    let repo = TestRepo::new();
    repo.git(&["branch", "-D", "staging"]);
    repo.feature_branch("feat/tracking", &["feat: x"]);
    let git = repo.open().await;
    let gateway = MockPrGateway::new();

    prepare_pr(
        &git,
        &Config::default(),
        &gateway,
        PreparePrRequest {
            target_branch: "staging",
            current_branch: "feat/tracking",
            card_link: None,
        },
    )
    .await
    .unwrap();

    assert!(repo.branches().contains(&"staging".to_string()));
    assert_eq!(repo.branch_tip("staging"), repo.remote_tip("staging"));
}

#[tokio::test]
async fn test_prepare_pr_unknown_target() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/lost", &["feat: x"]);
    let git = repo.open().await;
    let gateway = MockPrGateway::new();

    let err = prepare_pr(
        &git,
        &Config::default(),
        &gateway,
        PreparePrRequest {
            target_branch: "release/9",
            current_branch: "feat/lost",
            card_link: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(&err, Error::RefNotFound(name) if name == "release/9"));
}

#[tokio::test]
async fn test_prepare_pr_gateway_failure() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/offline", &["feat: x"]);
    let git = repo.open().await;
    let gateway = MockPrGateway::new();
    gateway.fail_list("gh: not logged in");

    let err = prepare_pr(
        &git,
        &Config::default(),
        &gateway,
        PreparePrRequest {
            target_branch: "main",
            current_branch: "feat/offline",
            card_link: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Platform(_)));
}

#[tokio::test]
async fn test_submit_pr_creates_and_pushes() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/ship", &["feat: ship it"]);
    let git = repo.open().await;
    let gateway = MockPrGateway::new();

    let out = submit_pr(
        &git,
        &Config::default(),
        &gateway,
        SubmitPrRequest {
            pr_number: None,
            title: "feat: ship it",
            body: "## What\n\nShips it.",
            target_branch: "main",
            current_branch: "feat/ship",
            keep_scratch: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(out.pr_url.as_deref(), Some("https://github.com/acme/app/pull/100"));
    assert_eq!(repo.remote_tip("feat/ship"), repo.branch_tip("feat/ship"));
    let calls = gateway.create_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].base, "main");
    assert_eq!(calls[0].head, "feat/ship");
    assert_eq!(calls[0].body, "## What\n\nShips it.");
    assert!(!repo.git_dir().join("pr-command").exists());
}

#[tokio::test]
async fn test_submit_pr_updates_existing() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/edit", &["feat: edit"]);
    repo.push("feat/edit");
    let git = repo.open().await;
    let gateway = MockPrGateway::new();
    gateway.add_pr(7, "main", "feat/edit", "Old", "old body");

    let out = submit_pr(
        &git,
        &Config::default(),
        &gateway,
        SubmitPrRequest {
            pr_number: Some(7),
            title: "New title",
            body: "new body",
            target_branch: "main",
            current_branch: "feat/edit",
            keep_scratch: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(out.pr_url.as_deref(), Some("https://github.com/acme/app/pull/7"));
    let edits = gateway.edit_calls();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].number, 7);
    assert_eq!(edits[0].title, "New title");
    assert_eq!(edits[0].body, "new body");
    assert!(gateway.create_calls().is_empty());
    assert!(repo.git_dir().join("pr-command").exists());
}

#[tokio::test]
async fn test_submit_pr_push_rejected() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/blocked", &["feat: blocked"]);
    repo.reject_pushes();
    let git = repo.open().await;
    let gateway = MockPrGateway::new();

    let err = submit_pr(
        &git,
        &Config::default(),
        &gateway,
        SubmitPrRequest {
            pr_number: None,
            title: "feat: blocked",
            body: "",
            target_branch: "main",
            current_branch: "feat/blocked",
            keep_scratch: false,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(&err, Error::PushRejected { branch, .. } if branch == "feat/blocked"));
    assert!(gateway.create_calls().is_empty());
}

#[tokio::test]
async fn test_update_pr_by_link() {
    let repo = TestRepo::new();
    repo.feature_branch("feat/linked", &["feat: linked"]);
    repo.push("feat/linked");
    let git = repo.open().await;
    let gateway = MockPrGateway::new();
    gateway.add_pr(12, "staging", "feat/linked", "Linked", "body");

    let out = update_pr_by_link(
        &git,
        &Config::default(),
        &gateway,
        UpdatePrByLinkRequest {
            pr_url: "https://github.com/acme/app/pull/12",
            card_link: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(out.current_branch, "feat/linked");
    assert_eq!(out.target_branch, "staging");
    assert_eq!(out.prepared.pr_number, Some(12));

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["currentBranch"], "feat/linked");
    assert_eq!(json["prNumber"], 12);
}

#[tokio::test]
async fn test_update_pr_by_link_rejects_non_pr_url() {
    let repo = TestRepo::new();
    let git = repo.open().await;
    let gateway = MockPrGateway::new();

    let err = update_pr_by_link(
        &git,
        &Config::default(),
        &gateway,
        UpdatePrByLinkRequest {
            pr_url: "https://github.com/acme/app/issues/12",
            card_link: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(gateway.view_calls().is_empty());
}
