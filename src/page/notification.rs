use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// Button offered on a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationAction {
    Retry,
    Dismiss,
}

impl NotificationAction {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationAction::Retry => "Retry",
            NotificationAction::Dismiss => "Dismiss",
        }
    }
}

/// A transient message shown after a read or write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
}

impl Notification {
    pub fn success(title: String) -> Self {
        Self {
            level: Level::Success,
            title,
            description: None,
            action: Some(NotificationAction::Dismiss),
        }
    }

    pub fn error(title: String, description: String) -> Self {
        Self {
            level: Level::Error,
            title,
            description: Some(description),
            action: None,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }
}
