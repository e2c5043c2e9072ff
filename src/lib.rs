//! Agentry: an agent invocation engine.
//!
//! An [`LlmAgent`](agent::LlmAgent) drives a [`ModelProvider`](provider::ModelProvider)
//! through generate and tool rounds until the model produces a final answer,
//! recording the transcript in a [`Session`](session::Session). Every run is a
//! lazy [`MessageStream`](stream::MessageStream): work happens only while the
//! consumer polls it, and dropping it cancels the run.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentry::prelude::*;
//!
//! # async fn example(provider: Arc<dyn ModelProvider>) -> agentry::error::Result<()> {
//! let agent = LlmAgent::builder("assistant")
//!     .with_instruction("Be brief.")
//!     .with_provider(provider)
//!     .build()?;
//! let runner = Runner::new(Arc::new(agent)).with_config(AgentryConfig::load()?);
//! let reply = runner
//!     .run(RunContext::new(), Message::user("Hello!"), RunOptions::default())
//!     .await?;
//! println!("{}", reply.text());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod prelude;
pub mod provider;
pub mod runner;
pub mod session;
pub mod stream;
pub mod tools;
pub mod types;
pub mod util;
