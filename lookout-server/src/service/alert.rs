//! Alert service
//!
//! Best-effort operator notifications. Callers hand a message to the sink
//! and move on: the message is queued for a background task and dropped if
//! the queue is full. Delivery failures are logged and swallowed.

use chrono::{DateTime, Utc};
use lookout_client::TelegramClient;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

/// Number of alerts kept for the stats endpoint
pub const RECENT_ALERTS: usize = 10;

/// An alert as it was raised
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedAlert {
    pub time: DateTime<Utc>,
    pub message: String,
}

/// Destination for operator alerts
pub trait AlertSink: Send + Sync {
    /// Hands a message over for delivery; never blocks and never fails
    fn notify(&self, message: String);

    /// The most recent alerts, newest last
    fn recent(&self) -> Vec<RecordedAlert> {
        Vec::new()
    }
}

/// Alert sink backed by a bounded queue and a delivery task
pub struct QueuedAlertSink {
    sender: mpsc::Sender<String>,
    recent: Mutex<VecDeque<RecordedAlert>>,
}

impl QueuedAlertSink {
    /// Creates the sink and the receiving end of its queue
    ///
    /// The caller is responsible for draining the receiver; see `spawn`.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let sink = Self {
            sender,
            recent: Mutex::new(VecDeque::with_capacity(RECENT_ALERTS)),
        };
        (sink, receiver)
    }

    /// Creates the sink and spawns the task delivering its alerts
    ///
    /// # Arguments
    /// * `capacity` - Alerts buffered before new ones are dropped
    /// * `telegram` - Delivery channel; alerts are only logged when `None`
    pub fn spawn(capacity: usize, telegram: Option<TelegramClient>) -> (Arc<Self>, JoinHandle<()>) {
        let (sink, receiver) = Self::new(capacity);
        let handle = tokio::spawn(deliver_alerts(receiver, telegram));
        (Arc::new(sink), handle)
    }

    fn remember(&self, message: &str) {
        let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
        if recent.len() == RECENT_ALERTS {
            recent.pop_front();
        }
        recent.push_back(RecordedAlert {
            time: Utc::now(),
            message: message.to_string(),
        });
    }
}

impl AlertSink for QueuedAlertSink {
    fn notify(&self, message: String) {
        self.remember(&message);

        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                warn!("Alert queue full, dropping alert: {}", first_line(&message));
            }
            Err(TrySendError::Closed(message)) => {
                warn!("Alert delivery stopped, dropping alert: {}", first_line(&message));
            }
        }
    }

    fn recent(&self) -> Vec<RecordedAlert> {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

/// Drains the alert queue until every sender is gone
async fn deliver_alerts(mut receiver: mpsc::Receiver<String>, telegram: Option<TelegramClient>) {
    while let Some(message) = receiver.recv().await {
        match &telegram {
            Some(client) => match client.send_message(&message).await {
                Ok(()) => debug!("Delivered alert: {}", first_line(&message)),
                Err(e) => warn!("Failed to deliver alert: {}", e),
            },
            None => info!("Alert: {}", message.replace('\n', " | ")),
        }
    }

    debug!("Alert queue closed");
}

/// Waits for the delivery task to flush the queue after the last sink is dropped
///
/// # Returns
/// `false` if the queue was not drained within `grace`
pub async fn wait_for_drain(handle: JoinHandle<()>, grace: Duration) -> bool {
    match time::timeout(grace, handle).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Alert delivery task failed: {}", e);
            false
        }
        Err(_) => false,
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

/// Formats an alert: headline, `@username`, then the detail
pub fn format_alert(headline: &str, username: &str, detail: &str) -> String {
    format!("{headline}\n@{username}\n{detail}")
}

/// Sink that keeps every message in memory
#[cfg(test)]
#[derive(Default)]
pub struct RecordingAlertSink {
    messages: Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingAlertSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl AlertSink for RecordingAlertSink {
    fn notify(&self, message: String) {
        self.messages.lock().unwrap().push(message);
    }
}
