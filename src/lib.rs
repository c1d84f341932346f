// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address Binder - Substrate/EVM address bindings
//!
//! A user binds a Substrate address to an EVM address by signing a canonical
//! message with the EVM account. The resulting record is kept locally and
//! relayed to an Airtable table.
//!
//! ## Modules
//!
//! - `composer` - Client-side binding workflow and wallet collaborators
//! - `api` - Relay HTTP handlers (Axum)
//! - `providers` - Airtable integration
//! - `store` - Row store abstraction used by the relay

pub mod api;
pub mod composer;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod state;
pub mod store;
