use serde::{Deserialize, Serialize};

/// App-wide preferences stored next to the alarm list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// `None` follows the system theme.
    pub dark_mode: Option<bool>,
    pub notifications: bool,
    pub early_reminders: bool,
    pub vibration: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: None,
            notifications: true,
            early_reminders: true,
            vibration: true,
        }
    }
}
