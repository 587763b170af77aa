// src/lib.rs

//! attachrss: forum attachment scraper and RSS republisher.
//!
//! Periodically discovers attachment links on a forum's thread pages,
//! records unseen links in a durable store and republishes the latest
//! items as an RSS 2.0 feed served over HTTP.

pub mod collector;
pub mod config;
pub mod error;
pub mod extract;
pub mod feed;
pub mod fetch;
pub mod models;
pub mod scheduler;
pub mod server;
pub mod store;
