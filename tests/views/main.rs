//! End-to-end view tests
//!
//! Each module drives the public facade through the contracts declared in
//! `common`.

mod common;

mod attribute_views;
mod cache_scoping;
mod composition;
mod entity_views;
