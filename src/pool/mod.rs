//! Connection pool subsystem.
//!
//! # Data Flow
//! ```text
//! executor attempt
//!     → manager.rs acquire (reuse idle | dial new | wait for slot)
//!     → connection.rs guard held for exactly one in-flight request
//!     → release back to the idle set, or drop to discard
//!
//! Background:
//!     manager.rs sweeper evicts idle/expired connections periodically
//! ```
//!
//! # Design Decisions
//! - Global and per-route caps are enforced under one mutex
//! - A saturated acquire blocks up to the acquire deadline instead of failing
//!   silently
//! - Connections are never shared between concurrent requests

pub mod connection;
pub mod manager;
pub mod route;

pub use connection::PooledConnection;
pub use manager::{ConnectionPool, PoolStats};
pub use route::Route;
