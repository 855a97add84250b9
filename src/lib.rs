//! Terminal directory of Live TV channels and OTT platforms.
//!
//! Content is three JSON documents served from a base URL. A cache worker
//! sits between the client and the network and serves a versioned offline
//! copy when the network is unreachable; notifications arrive over a
//! server-sent event stream.

pub mod app;
pub mod config;
pub mod content;
pub mod keybindings;
pub mod listing;
pub mod net;
pub mod notifications;
pub mod preferences;
pub mod router;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
pub mod view;
pub mod worker;
