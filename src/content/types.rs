use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

/// Accept `"42"` and `42` alike for identifiers; the id is only ever
/// compared as a string against the location fragment.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(f) => f.to_string(),
    })
}

// ============================================================================
// Partners
// ============================================================================

/// A Live TV channel or OTT platform entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
}

/// Both partner collections, published together once both documents loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collections {
    pub tv: Arc<Vec<PartnerItem>>,
    pub ott: Arc<Vec<PartnerItem>>,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Alert,
    Update,
    #[serde(other)]
    Info,
}

impl Default for NotificationKind {
    fn default() -> Self {
        Self::Info
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub is_read: bool,
}

// ============================================================================
// Content bundle (content.json)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryScreen {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub button_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AboutSection {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSection {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub email_general: String,
    #[serde(default)]
    pub email_partners: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AboutPage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub mission: AboutSection,
    #[serde(default)]
    pub vision: AboutSection,
    #[serde(default)]
    pub contact: ContactSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppBranding {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tagline: String,
}

/// Static UI text plus the initial notification list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBundle {
    pub entry_screen: EntryScreen,
    #[serde(default)]
    pub notifications: Vec<NotificationRecord>,
    #[serde(default)]
    pub about_page: AboutPage,
    /// Header branding is optional; without it the header shows no brand.
    #[serde(default)]
    pub app_branding: Option<AppBranding>,
}
