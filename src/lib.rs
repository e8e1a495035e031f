//! ot-console library
//!
//! Client-side workflow for creating manufacturing work orders: draft grid
//! management, recipe resolution with session-wide memoization, bill-of-
//! materials scaling, and the multi-step submission pipeline (ERP
//! integration, sequential order creation, concurrent status polling)
//! against the plant operations backend.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod catalog;
pub mod client;
pub mod config;
pub mod draft;
pub mod errors;
pub mod models;
pub mod payload;
pub mod services;
pub mod submit;
pub mod validate;
