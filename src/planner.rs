// ABOUTME: Plan generation and retrieval orchestration over a PlanStore collaborator
// ABOUTME: Validates targets, runs the allocator, persists atomically, reconstructs on fetch
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Meal Planner
//!
//! [`MealPlanner`] drives one planning run: validate (or derive) the daily
//! targets, snapshot the recipe catalog, allocate one meal per slot, and
//! replace the user's plan for the date in a single atomic write. The fetch
//! path rebuilds the same plan shape from storage, recomputing achieved
//! macros from current recipe definitions.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::allocator::{allocate, CandidatePool};
use crate::config::PlannerConfig;
use crate::errors::{PlannerError, PlannerResult};
use crate::models::{
    achieved_totals, round2, BiometricProfile, ChosenMeal, MacroTarget, MealPlan,
};
use crate::storage::PlanStore;
use crate::targets::derive_targets;

/// Parse an ISO calendar date (`YYYY-MM-DD`) supplied by the caller
///
/// # Errors
///
/// Returns [`PlannerError::Validation`] for unparseable input; rejected
/// before any allocation work runs.
pub fn parse_plan_date(raw: &str) -> PlannerResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        PlannerError::validation(format!("invalid plan date '{raw}', expected YYYY-MM-DD"))
    })
}

/// Orchestrates allocation and persistence over an injected [`PlanStore`]
pub struct MealPlanner<S> {
    store: S,
    config: PlannerConfig,
}

impl<S: PlanStore> MealPlanner<S> {
    /// Create a planner with the default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, PlannerConfig::default())
    }

    /// Create a planner with an explicit configuration
    pub const fn with_config(store: S, config: PlannerConfig) -> Self {
        Self { store, config }
    }

    /// Active configuration
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Generate and persist a meal plan for the given daily targets
    ///
    /// Replaces any existing plan for `(user_id, plan_date)`. The returned
    /// plan carries the freshly allocated meals and their achieved totals.
    ///
    /// # Errors
    ///
    /// - [`PlannerError::Validation`] for non-positive targets
    /// - [`PlannerError::CatalogGap`] if a slot has no recipes
    /// - [`PlannerError::Persistence`] if the atomic write fails (fully
    ///   rolled back; the call is safe to retry)
    pub async fn generate(
        &self,
        user_id: Uuid,
        plan_date: NaiveDate,
        targets: MacroTarget,
    ) -> PlannerResult<MealPlan> {
        targets.validate()?;

        let catalog = self.store.recipe_catalog().await?;
        let pool = CandidatePool::from_rows(catalog);
        let meals = allocate(&targets, &pool, &self.config)?;

        let plan_id = self
            .store
            .replace_plan(user_id, plan_date, &targets, &meals)
            .await?;
        let achieved = achieved_totals(&meals);

        info!(
            %user_id,
            %plan_date,
            plan_id,
            achieved_kcal = achieved.kcal,
            "meal plan generated"
        );

        Ok(MealPlan {
            plan_id,
            user_id,
            plan_date,
            targets,
            achieved,
            meals,
        })
    }

    /// Derive targets from biometrics, then generate and persist a plan
    ///
    /// # Errors
    ///
    /// As [`Self::generate`], plus [`PlannerError::Validation`] for
    /// out-of-range biometrics.
    pub async fn generate_for_profile(
        &self,
        user_id: Uuid,
        plan_date: NaiveDate,
        profile: &BiometricProfile,
    ) -> PlannerResult<MealPlan> {
        let targets = derive_targets(profile, &self.config)?;
        self.generate(user_id, plan_date, targets).await
    }

    /// Fetch the persisted plan for `(user_id, plan_date)`
    ///
    /// Achieved macros are recomputed from the current recipe definitions
    /// multiplied by the stored scale factors, and totals use the same
    /// summation as the generate path. If the catalog changed since the plan
    /// was persisted, the totals legitimately differ.
    ///
    /// # Errors
    ///
    /// - [`PlannerError::PlanNotFound`] if no plan exists for the date
    /// - [`PlannerError::Persistence`] on storage failure
    pub async fn fetch(&self, user_id: Uuid, plan_date: NaiveDate) -> PlannerResult<MealPlan> {
        let stored = self
            .store
            .plan_for_date(user_id, plan_date)
            .await?
            .ok_or(PlannerError::PlanNotFound { user_id, plan_date })?;

        let meals: Vec<ChosenMeal> = stored
            .items
            .into_iter()
            .map(|item| {
                let scale_factor = round2(item.scale_factor);
                ChosenMeal {
                    slot: item.slot,
                    recipe_id: item.recipe_id,
                    recipe_name: item.recipe_name,
                    scale_factor,
                    base: item.base.rounded(),
                    achieved: item.base.scaled(scale_factor).rounded(),
                }
            })
            .collect();
        let achieved = achieved_totals(&meals);

        Ok(MealPlan {
            plan_id: stored.plan_id,
            user_id,
            plan_date,
            targets: stored.targets,
            achieved,
            meals,
        })
    }
}
