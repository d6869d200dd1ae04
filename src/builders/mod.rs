//! Builders that turn configuration into replay components.

pub mod replay_builder;

pub use replay_builder::{build_http_client, ReplayBuilder, MAX_REDIRECTS};
