//! Core application modules
//!
//! This module contains configuration, constants, logging, the provider
//! abstraction, and the one-shot invoker.

pub mod config;
pub mod constants;
pub mod invoker;
pub mod logging;
pub mod provider;
pub mod providers;
