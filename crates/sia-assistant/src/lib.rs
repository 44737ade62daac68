//! Server inventory assistant: answers free-text questions about servers
//! and users.
//!
//! A question is classified by a fixed rule table, turned into an
//! inventory predicate and answered from a template. Questions no rule
//! covers go to an optional text-completion service, then to a canned
//! reply. The binary (`main.rs`) serves this over HTTP; the e2e crate
//! drives `Assistant` and `build_router` directly.

pub mod assistant;
pub mod classifier;
pub mod completion;
pub mod config;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod formatter;
pub mod routes;
pub mod state;

pub use assistant::{Assistant, AssistantOptions};
pub use classifier::IntentClassifier;
pub use config::AssistantConfig;
