//! Mock PR gateway for workflow tests
//!
//! Hand-written rather than generated so the body file contents can be
//! captured at call time; the workflow removes the file afterwards.

use async_trait::async_trait;
use pr_command::error::{Error, Result};
use pr_command::platform::PrGateway;
use pr_command::types::{NewPullRequest, PrDetails, PrField, PrSummary};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `edit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCall {
    pub number: u64,
    pub title: String,
    pub body: String,
}

/// Call record for `create`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCall {
    pub base: String,
    pub head: String,
    pub title: String,
    pub body: String,
}

/// In-memory [`PrGateway`]
///
/// Features:
/// - Open PRs keyed by `(base, head)`
/// - PR details keyed by number
/// - Auto-incrementing numbers for created PRs
/// - Call tracking and error injection
pub struct MockPrGateway {
    next_number: AtomicU64,
    open_prs: Mutex<HashMap<(String, String), u64>>,
    details: Mutex<HashMap<u64, PrDetails>>,
    // Call tracking
    list_calls: Mutex<Vec<(String, String)>>,
    view_calls: Mutex<Vec<(u64, Vec<PrField>)>>,
    edit_calls: Mutex<Vec<EditCall>>,
    create_calls: Mutex<Vec<CreateCall>>,
    // Error injection
    error_on_list: Mutex<Option<String>>,
    error_on_create: Mutex<Option<String>>,
}

impl MockPrGateway {
    pub fn new() -> Self {
        Self {
            next_number: AtomicU64::new(100),
            open_prs: Mutex::new(HashMap::new()),
            details: Mutex::new(HashMap::new()),
            list_calls: Mutex::new(Vec::new()),
            view_calls: Mutex::new(Vec::new()),
            edit_calls: Mutex::new(Vec::new()),
            create_calls: Mutex::new(Vec::new()),
            error_on_list: Mutex::new(None),
            error_on_create: Mutex::new(None),
        }
    }

    /// Register an open PR from `head` into `base`
    pub fn add_pr(&self, number: u64, base: &str, head: &str, title: &str, body: &str) {
        self.open_prs
            .lock()
            .unwrap()
            .insert((base.to_string(), head.to_string()), number);
        self.details.lock().unwrap().insert(
            number,
            PrDetails {
                title: title.to_string(),
                body: body.to_string(),
                url: format!("https://github.com/acme/app/pull/{number}"),
                head_ref_name: Some(head.to_string()),
                base_ref_name: Some(base.to_string()),
            },
        );
    }

    /// Make `list` return an error
    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create` return an error
    pub fn fail_create(&self, msg: &str) {
        *self.error_on_create.lock().unwrap() = Some(msg.to_string());
    }

    pub fn list_calls(&self) -> Vec<(String, String)> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn view_calls(&self) -> Vec<(u64, Vec<PrField>)> {
        self.view_calls.lock().unwrap().clone()
    }

    pub fn edit_calls(&self) -> Vec<EditCall> {
        self.edit_calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> Vec<CreateCall> {
        self.create_calls.lock().unwrap().clone()
    }
}

impl Default for MockPrGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn read_body(path: &Path) -> String {
    std::fs::read_to_string(path).expect("body file exists during the call")
}

#[async_trait]
impl PrGateway for MockPrGateway {
    async fn list(&self, base: &str, head: &str) -> Result<Vec<PrSummary>> {
        self.list_calls
            .lock()
            .unwrap()
            .push((base.to_string(), head.to_string()));

        if let Some(msg) = self.error_on_list.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let prs = self.open_prs.lock().unwrap();
        Ok(prs
            .get(&(base.to_string(), head.to_string()))
            .map(|&number| vec![PrSummary { number }])
            .unwrap_or_default())
    }

    async fn view(&self, number: u64, fields: &[PrField]) -> Result<Option<PrDetails>> {
        self.view_calls
            .lock()
            .unwrap()
            .push((number, fields.to_vec()));
        Ok(self.details.lock().unwrap().get(&number).cloned())
    }

    async fn edit(&self, number: u64, title: &str, body_file: &Path) -> Result<()> {
        self.edit_calls.lock().unwrap().push(EditCall {
            number,
            title: title.to_string(),
            body: read_body(body_file),
        });
        if let Some(pr) = self.details.lock().unwrap().get_mut(&number) {
            pr.title = title.to_string();
            pr.body = read_body(body_file);
        }
        Ok(())
    }

    async fn create(&self, request: &NewPullRequest<'_>) -> Result<String> {
        self.create_calls.lock().unwrap().push(CreateCall {
            base: request.base.to_string(),
            head: request.head.to_string(),
            title: request.title.to_string(),
            body: read_body(request.body_file),
        });

        if let Some(msg) = self.error_on_create.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://github.com/acme/app/pull/{number}"))
    }
}
