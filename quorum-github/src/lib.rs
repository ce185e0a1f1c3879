//! Quorum GitHub - pull request plumbing for evaluation runs
//!
//! This crate fetches the context an evaluation needs from a pull request
//! (title, body, diff, check runs) and posts the rendered evaluation back as
//! a PR comment. It contains no scoring logic; everything here is transport
//! for `quorum-core`.

mod client;
mod comment;
mod error;
mod pr;

pub use client::GitHubClient;
pub use comment::render_comment;
pub use error::{Error, Result};
pub use pr::{CheckResult, PrContext};
