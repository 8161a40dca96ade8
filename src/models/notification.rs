//! Notification models
//!
//! Notifications are created inline when an interaction is recorded, gated by
//! the recipient's notification settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::InteractionKind;

/// An interaction notification delivered to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: i64,
    /// Recipient user ID
    pub user_id: i64,
    /// Human-readable message
    pub message: String,
    /// The interaction kind that produced this notification
    pub interaction_kind: InteractionKind,
    /// Whether the recipient has read it
    pub read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: i64, message: String, interaction_kind: InteractionKind) -> Self {
        Self {
            id: 0, // Set by the database
            user_id,
            message,
            interaction_kind,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Per-profile notification preferences. All flags default to enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(skip_serializing)]
    pub id: i64,
    #[serde(skip_serializing)]
    pub profile_id: i64,
    pub notify_on_like: bool,
    pub notify_on_comment: bool,
    pub notify_on_new_follower: bool,
    pub notify_on_milestone: bool,
}

impl NotificationSettings {
    /// Default settings for a freshly created profile.
    pub fn new(profile_id: i64) -> Self {
        Self {
            id: 0, // Set by the database
            profile_id,
            notify_on_like: true,
            notify_on_comment: true,
            notify_on_new_follower: true,
            notify_on_milestone: true,
        }
    }
}

/// Input for updating notification settings.
///
/// Used for both PUT (all fields expected) and PATCH (partial merge).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNotificationSettingsInput {
    pub notify_on_like: Option<bool>,
    pub notify_on_comment: Option<bool>,
    pub notify_on_new_follower: Option<bool>,
    pub notify_on_milestone: Option<bool>,
}

impl UpdateNotificationSettingsInput {
    /// Apply this input on top of existing settings.
    pub fn apply(&self, settings: &mut NotificationSettings) {
        if let Some(v) = self.notify_on_like {
            settings.notify_on_like = v;
        }
        if let Some(v) = self.notify_on_comment {
            settings.notify_on_comment = v;
        }
        if let Some(v) = self.notify_on_new_follower {
            settings.notify_on_new_follower = v;
        }
        if let Some(v) = self.notify_on_milestone {
            settings.notify_on_milestone = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_all_enabled() {
        let settings = NotificationSettings::new(1);
        assert!(settings.notify_on_like);
        assert!(settings.notify_on_comment);
        assert!(settings.notify_on_new_follower);
        assert!(settings.notify_on_milestone);
    }

    #[test]
    fn test_partial_update_leaves_other_flags() {
        let mut settings = NotificationSettings::new(1);
        let input = UpdateNotificationSettingsInput {
            notify_on_like: Some(false),
            ..Default::default()
        };
        input.apply(&mut settings);
        assert!(!settings.notify_on_like);
        assert!(settings.notify_on_new_follower);
    }

    #[test]
    fn test_new_notification_is_unread() {
        let n = Notification::new(1, "hello".to_string(), InteractionKind::Like);
        assert!(!n.read);
        assert_eq!(n.user_id, 1);
    }
}
