#![doc = "portfolio-feed-core: repository aggregation, classification and the tiered project feed."]

//! Builds the data a portfolio site renders: projects classified from a
//! developer's repositories, a skills breakdown, posts and about-page content.
//!
//! Entry point is [`aggregate::Portfolio`], which resolves every query through
//! source control, then the record store, then a static dataset.
//!
//! # Usage
//! The `portfolio-feed` CLI wires this crate to GitHub and a PostgREST backend;
//! tests use the `mockall` mocks exported from [`contract`].

pub mod aggregate;
pub mod analyzer;
pub mod cache;
pub mod classify;
pub mod config;
pub mod contract;
pub mod error;
pub mod fallback;
pub mod feed;
pub mod format;
pub mod github;
pub mod http;
pub mod model;
pub mod rules;
pub mod store;
