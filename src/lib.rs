// ABOUTME: Main library entry point for the macroplan meal-plan allocation crate
// ABOUTME: Exposes target derivation, allocation, and plan persistence modules
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Macroplan
//!
//! A nutrition-planning allocator: given a user's daily macro targets and a
//! catalog of recipes tagged by meal slot, it selects one recipe per slot,
//! scales the portion toward the slot sub-target, and persists the plan so it
//! can be retrieved later for adherence reporting.
//!
//! The crate is a library core. Request routing, authentication, and
//! analytics read-models live in the host application; this crate consumes a
//! validated user identity and plan date and talks to storage through the
//! [`storage::PlanStore`] trait.
//!
//! ## Flow
//!
//! 1. [`targets::derive_targets`] computes daily macro targets from biometric
//!    input (or the caller supplies a [`models::MacroTarget`] directly)
//! 2. [`allocator::allocate`] picks and scales one recipe per meal slot
//! 3. [`planner::MealPlanner`] drives the run and persists the result
//!    atomically through a [`storage::PlanStore`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use macroplan::database::Database;
//! use macroplan::models::MacroTarget;
//! use macroplan::planner::{parse_plan_date, MealPlanner};
//! use uuid::Uuid;
//!
//! # async fn run() -> Result<(), macroplan::errors::PlannerError> {
//! let db = Database::new("sqlite:./macroplan.db").await?;
//! let planner = MealPlanner::new(db);
//!
//! let targets = MacroTarget {
//!     kcal: 2000.0,
//!     protein_g: 150.0,
//!     carbs_g: 200.0,
//!     fats_g: 60.0,
//! };
//! let plan = planner
//!     .generate(Uuid::new_v4(), parse_plan_date("2024-01-01")?, targets)
//!     .await?;
//! println!("plan {} hits {} kcal", plan.plan_id, plan.achieved.kcal);
//! # Ok(())
//! # }
//! ```

/// Meal allocation algorithm: per-slot scoring, selection, and portion scaling
pub mod allocator;

/// Calculation coefficients and product constants with sensible defaults
pub mod config;

/// `SQLite` storage backend implementing the `PlanStore` collaborator
pub mod database;

/// Unified error taxonomy for validation, catalog, and storage failures
pub mod errors;

/// Structured logging setup built on tracing-subscriber
pub mod logging;

/// Domain records shared across allocation, persistence, and retrieval
pub mod models;

/// Plan generation and retrieval orchestration
pub mod planner;

/// Storage collaborator trait: catalog reads and atomic plan writes
pub mod storage;

/// Daily macro target derivation from biometric input
pub mod targets;
