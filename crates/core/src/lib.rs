//! Inkwell Core - Shared domain types.
//!
//! This crate provides the common types used across Inkwell components:
//! - `api` - Backend-for-frontend serving the storefront client
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. WooCommerce and WordPress remain the systems of record; these
//! types model the slices of their payloads that Inkwell actually touches.
//!
//! # Modules
//!
//! - [`types`] - Products, orders, reviews, users, filters, and money helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
