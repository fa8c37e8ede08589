//! Scripted in-memory actor for poller, service and router tests

use async_trait::async_trait;
use lookout_client::{ClientError, Result};
use lookout_core::domain::run::{RunHandle, RunStatus};
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::ActorRepository;

/// How the scripted actor answers one phase
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Answered with this HTTP status
    Rejected(u16),
    /// Answered with a body missing a required field
    Malformed,
    /// Never answered
    Hang,
    /// The handler panicked
    Panic,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Rejected(status) => Err(ClientError::api_error(*status, "rejected")),
            Reply::Malformed => Err(ClientError::MissingField("status")),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(ClientError::ParseError("hung up".to_string()))
            }
            Reply::Panic => panic!("scripted panic"),
        }
    }
}

/// Actor whose answers are fixed up front
///
/// Status replies are consumed in order; the last one repeats forever.
pub struct ScriptedActor {
    submit: Reply<RunHandle>,
    statuses: Mutex<Vec<Reply<RunStatus>>>,
    items: Reply<Vec<Value>>,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl ScriptedActor {
    /// An actor that succeeds on the first status check and returns `items`
    pub fn succeeding(items: Vec<Value>) -> Self {
        Self {
            submit: Reply::Ok(RunHandle {
                run_id: "run-1".to_string(),
                dataset_id: "ds-1".to_string(),
            }),
            statuses: Mutex::new(vec![Reply::Ok(RunStatus::Succeeded)]),
            items: Reply::Ok(items),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// An actor whose single result item is the profile of `username`
    pub fn profile(username: &str, followers: u64) -> Self {
        Self::succeeding(vec![json!({
            "username": username,
            "fullName": username.to_uppercase(),
            "followersCount": followers
        })])
    }

    /// An actor reporting that the account does not exist
    pub fn not_found() -> Self {
        Self::succeeding(vec![json!({ "error": "not_found" })])
    }

    pub fn with_submit(mut self, reply: Reply<RunHandle>) -> Self {
        self.submit = reply;
        self
    }

    pub fn with_statuses(self, replies: Vec<Reply<RunStatus>>) -> Self {
        *self.statuses.lock().unwrap() = replies;
        self
    }

    pub fn with_items(mut self, reply: Reply<Vec<Value>>) -> Self {
        self.items = reply;
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActorRepository for ScriptedActor {
    async fn start_run(&self, _username: &str) -> Result<RunHandle> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit.resolve().await
    }

    async fn run_status(&self, _run_id: &str) -> Result<RunStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let reply = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0].clone()
            }
        };
        reply.resolve().await
    }

    async fn dataset_items(&self, _dataset_id: &str) -> Result<Vec<Value>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.items.resolve().await
    }
}
