// ABOUTME: Unified error taxonomy for the meal-plan allocator and its storage layer
// ABOUTME: Maps validation, catalog-gap, persistence, and not-found failures to caller results
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Error Handling
//!
//! Every failure in this crate maps to one caller-visible [`PlannerError`]
//! variant; nothing is fatal to the process and the crate holds no cross-call
//! state, so one failed call cannot corrupt a later one.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::MealSlot;

/// Result alias used throughout the crate
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Error taxonomy for planning, persistence, and retrieval
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Missing or out-of-range input; surfaced before any work is performed
    #[error("Invalid input: {message}")]
    Validation {
        /// Human-readable description of the offending field
        message: String,
    },

    /// A meal slot has zero eligible recipes; the whole allocation run aborts
    ///
    /// This is a user-actionable configuration gap in the recipe catalog, not
    /// a transient failure, so callers should not retry.
    #[error("No recipes configured for {slot}")]
    CatalogGap {
        /// Slot with no candidates
        slot: MealSlot,
    },

    /// Storage failure during a read or an atomic write
    ///
    /// Writes roll back fully before this surfaces; regeneration is a full
    /// replace, so callers may safely retry the whole planning call.
    #[error("Storage operation failed: {context}")]
    Persistence {
        /// What the storage layer was doing when it failed
        context: String,
        /// Underlying driver error, when one exists
        #[source]
        source: Option<sqlx::Error>,
    },

    /// No plan exists for the requested user and date
    #[error("No meal plan found for user {user_id} on {plan_date}")]
    PlanNotFound {
        /// User the lookup was scoped to
        user_id: Uuid,
        /// Date the lookup was scoped to
        plan_date: NaiveDate,
    },
}

impl PlannerError {
    /// Build a validation error from any message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a persistence error with operation context and no driver cause
    pub fn persistence(context: impl Into<String>) -> Self {
        Self::Persistence {
            context: context.into(),
            source: None,
        }
    }
}

impl From<sqlx::Error> for PlannerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence {
            context: "database query failed".into(),
            source: Some(err),
        }
    }
}
