//! # overlap-core
//!
//! Request-scoped workspace and subprocess orchestration for the
//! Overlap PSI audience-measurement service.
//!
//! The actual private set intersection is performed by an external
//! binary; this crate's job is everything around it:
//!
//! ```text
//! PsiRequest ──▶ Workspace::create ──▶ invoker::invoke ──▶ output::parse
//!                (sender-<id>.csv,      (<binary> <sender>   (last two
//!                 receiver-<id>.csv,     <receiver>            non-empty
//!                 config-<id>.json)      --config <config>)    stdout lines)
//!                        │                                        │
//!                        └──────── Workspace::destroy ◀───────────┘
//!                                  (every exit path)
//! ```
//!
//! Workspace files are keyed by a random per-request id, so concurrent
//! requests never collide, and teardown is guaranteed by a `Drop`
//! fallback even when a request errors, panics, or is cancelled.
//!
//! ## Quick Start
//!
//! ```ignore
//! use overlap_core::{EngineConfig, PsiEngine, PsiRequest};
//!
//! # async fn example() -> overlap_core::Result<()> {
//! let engine = PsiEngine::new(
//!     EngineConfig::builder()
//!         .binary("/usr/local/bin/dpca_psi")
//!         .work_dir("/tmp/overlap")
//!         .build()?,
//! )?;
//!
//! let request: PsiRequest = serde_json::from_str(body)?;
//! let outcome = engine.execute(&request).await?;
//! println!("{} matched, {} impressions", outcome.audience_size, outcome.impressions);
//! # Ok(())
//! # }
//! ```

mod config;
mod engine;
mod error;
mod invoker;
mod output;
mod request;
mod workspace;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::PsiEngine;
pub use error::{CoreError, Result};
pub use invoker::ProcessOutput;
pub use output::PsiOutcome;
pub use request::PsiRequest;
pub use workspace::{ReceiverSource, Workspace, WorkspaceId};
