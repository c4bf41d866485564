// ABOUTME: Meal allocation algorithm - per-slot candidate scoring, selection, portion scaling
// ABOUTME: Pure function of targets and catalog snapshot; identical inputs give identical output
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Meal Allocator
//!
//! For each meal slot the allocator scores every candidate recipe against the
//! slot's macro sub-target with a weighted absolute deviation, picks the
//! lowest score (first candidate wins ties, in catalog order), and computes a
//! bounded portion scale from the calorie ratio.
//!
//! The allocator performs no I/O. Determinism matters here: persistence
//! treats a regeneration as a full replace, so rerunning with the same target
//! and catalog snapshot must reproduce the same plan.

use tracing::debug;

use crate::config::PlannerConfig;
use crate::errors::{PlannerError, PlannerResult};
use crate::models::{round2, ChosenMeal, MacroTarget, MealSlot, RecipeNutrition};

/// Recipe candidates grouped by meal slot, preserving catalog read order
///
/// Catalog order is the tie-break order, so grouping must not reorder rows
/// within a slot.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    slots: [Vec<RecipeNutrition>; 4],
}

impl CandidatePool {
    /// Group catalog rows by slot, keeping each slot's rows in input order
    #[must_use]
    pub fn from_rows(rows: Vec<RecipeNutrition>) -> Self {
        let mut pool = Self::default();
        for row in rows {
            pool.slots[row.slot.index()].push(row);
        }
        pool
    }

    /// Candidates for one slot, in catalog order
    #[must_use]
    pub fn candidates(&self, slot: MealSlot) -> &[RecipeNutrition] {
        &self.slots[slot.index()]
    }
}

/// Weighted absolute-deviation score of a candidate against a sub-target
///
/// Lower is better. Works on unrounded values; rounding is presentation-only.
fn score(candidate: &RecipeNutrition, sub_target: &MacroTarget, config: &PlannerConfig) -> f64 {
    let w = &config.scoring;
    w.kcal * (candidate.macros.kcal - sub_target.kcal).abs()
        + w.protein * (candidate.macros.protein_g - sub_target.protein_g).abs()
        + w.carbs * (candidate.macros.carbs_g - sub_target.carbs_g).abs()
        + w.fats * (candidate.macros.fats_g - sub_target.fats_g).abs()
}

/// Allocate one scaled meal per slot against the daily targets
///
/// The portion scale is the ratio of the slot's calorie sub-target to the
/// winning recipe's base calories (a zero-calorie recipe divides by 1),
/// clamped to the configured bounds and rounded to 2 decimals. Achieved
/// macros are the base macros multiplied by that rounded factor, so the
/// numbers reported here survive a persist/fetch round trip bit-for-bit as
/// long as the catalog is unchanged.
///
/// # Errors
///
/// - [`PlannerError::Validation`] if any target component is missing or not
///   strictly positive; no selection work happens in that case.
/// - [`PlannerError::CatalogGap`] if any slot has zero candidates. The whole
///   run aborts; no partial plan is emitted.
pub fn allocate(
    targets: &MacroTarget,
    pool: &CandidatePool,
    config: &PlannerConfig,
) -> PlannerResult<Vec<ChosenMeal>> {
    targets.validate()?;

    let mut chosen = Vec::with_capacity(MealSlot::ALL.len());
    for slot in MealSlot::ALL {
        let candidates = pool.candidates(slot);
        let Some(first) = candidates.first() else {
            return Err(PlannerError::CatalogGap { slot });
        };

        let sub_target = targets.fraction(config.meal_split.share(slot));

        let mut best = first;
        let mut best_score = score(first, &sub_target, config);
        for candidate in &candidates[1..] {
            let candidate_score = score(candidate, &sub_target, config);
            // Strict comparison keeps the first candidate on ties.
            if candidate_score < best_score {
                best = candidate;
                best_score = candidate_score;
            }
        }

        let divisor = if best.macros.kcal == 0.0 {
            1.0
        } else {
            best.macros.kcal
        };
        let raw_scale = sub_target.kcal / divisor;
        let scale_factor = round2(config.scale_bounds.clamp(raw_scale));

        debug!(
            %slot,
            recipe_id = best.recipe_id,
            best_score,
            raw_scale,
            scale_factor,
            "selected recipe for slot"
        );

        chosen.push(ChosenMeal {
            slot,
            recipe_id: best.recipe_id,
            recipe_name: best.name.clone(),
            scale_factor,
            base: best.macros.rounded(),
            achieved: best.macros.scaled(scale_factor).rounded(),
        });
    }

    Ok(chosen)
}
