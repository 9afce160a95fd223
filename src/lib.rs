//! Reverse infinite scroll for chat feeds.
//!
//! A feed shows the newest messages first and pulls older pages from the
//! server as the user scrolls toward the top, prepending them without moving
//! what is already on screen.
//!
//! # Architecture
//!
//! - **Feed**: cursor, rendering and the scroll-driven loader
//! - **Store**: in-memory message history paged newest-first
//! - **Server**: Axum endpoints serving pages and the host feed page
//!
//! The served feed page is static markup. It declares the container and its
//! `data-*` attributes but ships no script; the paging client is
//! [`feed::FeedScroller`], which the `feed-browse` binary drives over HTTP.
//!
//! # Modules
//!
//! - [`feed`]: feed scroller, page sources and message rendering
//! - [`store`]: paged message history
//! - [`server`]: HTTP endpoints
//! - [`config`]: layered configuration

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

pub mod config;
pub mod error;
pub mod feed;
pub mod server;
pub mod store;

use crate::config::AppConfig;
use crate::store::PostStore;
use std::sync::Arc;

pub use error::{FeedError, Result};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Message history for every group.
    pub store: PostStore,
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
}
