//! Core synchronization layer for a P2P poker node's HTTP gateway.
//!
//! The node itself is authoritative for all game rules; this crate only keeps a
//! local observable copy of the table in step with it and submits player
//! actions. The moving parts:
//!
//! - [`api_client`]: the [`api_client::Gateway`] trait and its reqwest-backed
//!   implementation
//! - [`store`]: last-known-good table/roster state, replaced wholesale by
//!   ticketed reconcile cycles
//! - [`poller`]: the recurring refresh task, active only while the connection
//!   is healthy
//! - [`dispatcher`]: validated, one-at-a-time action submission

pub mod api_client;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod entities;
pub mod poller;
pub mod store;
