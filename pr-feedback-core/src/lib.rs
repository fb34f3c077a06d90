#![doc = "pr-feedback-core: core logic library for pr-feedback."]

//! This crate contains everything that decides *what* gets posted to a pull request:
//! resolving action inputs against the execution context, batching check-run
//! annotations, and upserting marker comments. Transport lives behind the
//! [`contract::GitHubApi`] trait so the binary crate can plug in a real client and
//! tests can plug in `MockGitHubApi`.
//!
//! # Usage
//! Resolve a [`inputs::Command`] with [`inputs::resolve`], then hand it to
//! [`comment::upsert_comment`], [`check::post_check`] or [`check::post_report`].

pub mod annotation;
pub mod batch;
pub mod check;
pub mod comment;
pub mod context;
pub mod contract;
pub mod error;
pub mod inputs;
