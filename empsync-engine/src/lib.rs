//! # empsync Engine
//!
//! Employee record reconciliation and career-timeline engine:
//! - `cache` — per-record detail cache (get / put / shallow merge)
//! - `upload` — asset upload orchestrator (ticket + transfer handshake)
//! - `sections` — section update coordinator (fan-out/fan-in persistence)
//! - `timeline` — career timeline synthesizer (pure transform)
//! - `client` — persistence/asset/read trait seams + HTTP implementation
//! - `engine` — composition root wiring cache and client together

pub mod cache;
pub mod client;
pub mod engine;
pub mod error;
pub mod sections;
pub mod timeline;
pub mod upload;

pub use engine::ProfileEngine;
pub use error::{SectionFailure, SubmitError};
