// ABOUTME: Storage collaborator trait for the meal planner
// ABOUTME: Catalog reads, atomic plan replacement, and point plan lookup behind one async seam
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Storage Abstraction
//!
//! The planner touches storage only through [`PlanStore`], so orchestration
//! can be tested against an in-memory fake while production runs on the
//! `SQLite` implementation in [`crate::database`].

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PlannerResult;
use crate::models::{ChosenMeal, MacroTarget, Macros, MealSlot, RecipeNutrition};

/// One plan line item as read back from storage
///
/// `base` is recomputed from the current recipe definition at read time, not
/// cached on the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlanItem {
    /// Slot the item fills
    pub slot: MealSlot,
    /// Selected recipe id
    pub recipe_id: i64,
    /// Selected recipe name
    pub recipe_name: String,
    /// Portion multiplier stored at persist time
    pub scale_factor: f64,
    /// Current base-portion macros of the recipe
    pub base: Macros,
}

/// A plan header with its line items as read back from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlan {
    /// Storage id of the plan header
    pub plan_id: i64,
    /// Targets stored on the header
    pub targets: MacroTarget,
    /// Line items in insertion (slot) order
    pub items: Vec<StoredPlanItem>,
}

/// Storage collaborator for the meal planner
///
/// Implementations must guarantee that `replace_plan` is atomic: concurrent
/// regenerations for the same `(user_id, plan_date)` may interleave in time
/// but must never produce a mixed-version plan for readers.
#[async_trait]
pub trait PlanStore: Send + Sync {
    // ================================
    // Recipe Catalog
    // ================================

    /// Read every recipe's aggregated base macros, in stable catalog order
    ///
    /// The returned order is the allocator's tie-break order and must not
    /// change between calls with an unchanged catalog.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::PlannerError::Persistence`] on query failure.
    async fn recipe_catalog(&self) -> PlannerResult<Vec<RecipeNutrition>>;

    // ================================
    // Meal Plans
    // ================================

    /// Atomically upsert the plan header for `(user_id, plan_date)` and
    /// replace all of its line items with `meals`
    ///
    /// An existing plan for the date keeps its id and gets its targets
    /// overwritten; otherwise a new id is minted. Returns the plan id. On any
    /// failure the whole write rolls back and no partial state is visible.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::PlannerError::Persistence`] on any storage
    /// failure; no retry is attempted here.
    async fn replace_plan(
        &self,
        user_id: Uuid,
        plan_date: NaiveDate,
        targets: &MacroTarget,
        meals: &[ChosenMeal],
    ) -> PlannerResult<i64>;

    /// Look up the plan for `(user_id, plan_date)` with items joined to
    /// CURRENT recipe macros
    ///
    /// Base macros are deliberately recomputed from the live catalog rather
    /// than snapshotted at persist time, so retrieval reflects ingredient
    /// edits made after the plan was created (freshness over immutability).
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::PlannerError::Persistence`] on query failure.
    async fn plan_for_date(
        &self,
        user_id: Uuid,
        plan_date: NaiveDate,
    ) -> PlannerResult<Option<StoredPlan>>;
}
