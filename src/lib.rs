//! daybook - calendar-oriented task list library
//!
//! This library provides the core functionality for the daybook CLI: tasks
//! scheduled on days, kept in a user-chosen order, with optimistic list
//! updates reconciled against a persistent store.
//!
//! # Core Concepts
//!
//! - **Tasks**: scheduled on a due date; tasks sharing a day form one ordered list
//! - **Reorder engine**: pure move-and-renumber over a day's sequence
//! - **Controller**: optimistic in-memory list that reconciles with the store
//! - **Service**: single-writer command queue in front of a controller
//! - **Store**: async persistence contract with memory and file backends
//!
//! # Module Organization
//!
//! - `achievements`: Monthly badges
//! - `calendar`: Month navigation and per-day overview
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.daybook.toml`
//! - `controller`: Task list controller and mutation outcomes
//! - `error`: Error types and result aliases
//! - `events`: JSONL event output
//! - `lock`: File locking and atomic writes
//! - `output`: JSON and human output envelopes
//! - `prefs`: Theme and language preferences
//! - `reorder`: Reorder engine
//! - `service`: Command queue around the controller
//! - `stats`: Completion statistics
//! - `store`: Task and holiday persistence
//! - `task`: Task, holiday and scope types

pub mod achievements;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod lock;
pub mod output;
pub mod prefs;
pub mod reorder;
pub mod service;
pub mod stats;
pub mod store;
pub mod task;

pub use error::{Error, Result};
