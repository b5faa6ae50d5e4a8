//! Notification System
//!
//! Tracks the create and delete operations issued from the terminal view
//! with toast messages and a bounded history.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Level of detail for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Minimal: action + document + status icon
    Minimal,
    /// Detailed: action + document + duration
    #[default]
    Detailed,
    /// Verbose: all info including doctype and error details
    Verbose,
}

/// Type of operation being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Create,
    Delete,
}

impl OperationType {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Delete => "Delete",
        }
    }

    pub fn past_tense(&self) -> &str {
        match self {
            Self::Create => "Created",
            Self::Delete => "Deleted",
        }
    }

    pub fn present_participle(&self) -> &str {
        match self {
            Self::Create => "Creating",
            Self::Delete => "Deleting",
        }
    }
}

/// Status of a notification/operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    /// Request sent, waiting for the server
    Pending,
    /// Operation completed successfully
    Success,
    /// Operation failed with error message
    Error(String),
}

impl NotificationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error(_))
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Pending => "◯",
            Self::Success => "✓",
            Self::Error(_) => "✗",
        }
    }
}

/// A single notification
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub operation_type: OperationType,
    pub doctype: String,
    pub document: String,
    pub status: NotificationStatus,
    pub timestamp: DateTime<Local>,
    pub created_at: Instant,
    pub completed_at: Option<Instant>,
}

impl Notification {
    pub fn new(operation_type: OperationType, doctype: String, document: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation_type,
            doctype,
            document,
            status: NotificationStatus::Pending,
            timestamp: Local::now(),
            created_at: Instant::now(),
            completed_at: None,
        }
    }

    /// Mark operation as successful
    pub fn set_success(&mut self) {
        self.status = NotificationStatus::Success;
        self.completed_at = Some(Instant::now());
    }

    /// Mark operation as failed
    pub fn set_error(&mut self, error: String) {
        self.status = NotificationStatus::Error(error);
        self.completed_at = Some(Instant::now());
    }

    /// Get duration of operation (or elapsed time if still running)
    pub fn duration(&self) -> Duration {
        self.completed_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.created_at)
    }

    /// Format duration for display
    pub fn duration_display(&self) -> String {
        let d = self.duration();
        if d.as_secs() < 1 {
            format!("{}ms", d.as_millis())
        } else if d.as_secs() < 60 {
            format!("{}s", d.as_secs())
        } else {
            format!("{}m{}s", d.as_secs() / 60, d.as_secs() % 60)
        }
    }

    /// Wall-clock time the operation started, for the history panel
    pub fn time_display(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// Format notification for toast display (short form)
    pub fn toast_message(&self, detail_level: DetailLevel) -> String {
        let icon = self.status.icon();
        let verb = match &self.status {
            NotificationStatus::Pending => self.operation_type.present_participle(),
            NotificationStatus::Success => self.operation_type.past_tense(),
            NotificationStatus::Error(_) => "Failed",
        };

        match detail_level {
            DetailLevel::Minimal => {
                format!("{} {} {}", icon, verb, self.document)
            },
            DetailLevel::Detailed => {
                if self.status.is_terminal() {
                    format!("{} {} {} ({})", icon, verb, self.document, self.duration_display())
                } else {
                    format!("{} {} {}...", icon, verb, self.document)
                }
            },
            DetailLevel::Verbose => {
                let base = format!("{} {} {} [{}]", icon, verb, self.document, self.doctype);
                if let NotificationStatus::Error(ref err) = self.status {
                    format!("{} - {}", base, err)
                } else if self.status.is_terminal() {
                    format!("{} ({})", base, self.duration_display())
                } else {
                    format!("{}...", base)
                }
            },
        }
    }
}

/// Notification manager
pub struct NotificationManager {
    /// All notifications (recent first)
    pub notifications: VecDeque<Notification>,
    /// Maximum notifications to keep in history
    pub max_history: usize,
    /// Toast display duration
    pub toast_duration: Duration,
    /// Detail level for display
    pub detail_level: DetailLevel,
    last_toast_time: Option<Instant>,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: VecDeque::new(),
            max_history: 50,
            toast_duration: Duration::from_secs(5),
            detail_level: DetailLevel::Detailed,
            last_toast_time: None,
        }
    }

    /// Create a new notification for an operation
    pub fn create_notification(
        &mut self,
        operation_type: OperationType,
        doctype: &str,
        document: &str,
    ) -> Uuid {
        let notification = Notification::new(operation_type, doctype.to_string(), document.to_string());
        let id = notification.id;
        self.notifications.push_front(notification);
        self.last_toast_time = Some(Instant::now());
        self.trim_history();
        id
    }

    /// Mark a notification as successful, optionally renaming its document
    ///
    /// Creates only learn the server-assigned name once the response arrives.
    pub fn mark_success(&mut self, id: Uuid, document: Option<&str>) {
        if let Some(notif) = self.notifications.iter_mut().find(|n| n.id == id) {
            notif.set_success();
            if let Some(name) = document {
                notif.document = name.to_string();
            }
            self.last_toast_time = Some(Instant::now());
        }
    }

    /// Mark a notification as failed
    pub fn mark_error(&mut self, id: Uuid, error: String) {
        if let Some(notif) = self.notifications.iter_mut().find(|n| n.id == id) {
            notif.set_error(error);
            self.last_toast_time = Some(Instant::now());
        }
    }

    /// Get notification by ID
    pub fn get(&self, id: Uuid) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Get the most recent notification while its toast is visible
    pub fn current_toast(&self) -> Option<&Notification> {
        let last_time = self.last_toast_time?;
        if last_time.elapsed() > self.toast_duration {
            return None;
        }
        self.notifications.front()
    }

    /// Get count of operations still waiting for the server
    pub fn pending_count(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.status == NotificationStatus::Pending)
            .count()
    }

    /// Clear all notifications
    pub fn clear(&mut self) {
        self.notifications.clear();
        self.last_toast_time = None;
    }

    /// Trim history to max size
    fn trim_history(&mut self) {
        while self.notifications.len() > self.max_history {
            // Remove oldest completed notification
            if let Some(pos) = self.notifications.iter().rposition(|n| n.status.is_terminal()) {
                self.notifications.remove(pos);
            } else {
                self.notifications.pop_back();
            }
        }
    }
}
