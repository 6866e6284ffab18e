//! API data models
//!
//! This module contains the chat completion wire structures.

pub mod openai;
