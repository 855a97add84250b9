//! Remote content: the bundle of UI text (`content.json`) and the two partner
//! collections (`tv.json`, `ott.json`). Everything is read-only once loaded.

mod loader;
mod types;

pub use loader::{
    load_bundle, load_collections, DocumentError, LoadError, CONTENT_DOCUMENT,
    FATAL_LOAD_MESSAGE, OTT_DOCUMENT, PARTIAL_LOAD_MESSAGE, TV_DOCUMENT,
};
pub use types::{
    AboutPage, AboutSection, AppBranding, Collections, ContactSection, ContentBundle,
    EntryScreen, NotificationKind, NotificationRecord, PartnerItem,
};
