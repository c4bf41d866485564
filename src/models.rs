// ABOUTME: Domain records for meal planning - slots, macros, recipes, chosen meals, plans
// ABOUTME: Shared by the allocator, persister, and retriever so all paths agree on shapes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Domain model for meal-plan allocation
//!
//! Every record that crosses a module boundary is an explicit serde-derived
//! struct; nothing duck-typed leaves the storage layer. Numeric presentation
//! values are rounded to 2 decimal places; internal scoring always works on
//! unrounded values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{PlannerError, PlannerResult};

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    /// First meal of the day (25% of the daily target)
    Breakfast,
    /// Midday meal (35% of the daily target)
    Lunch,
    /// Evening meal (30% of the daily target)
    Dinner,
    /// Smallest allocation (10% of the daily target)
    Snack,
}

impl MealSlot {
    /// All slots in allocation order. Plans always carry exactly one meal per
    /// entry in this list.
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    /// Storage representation of the slot
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Breakfast => 0,
            Self::Lunch => 1,
            Self::Dinner => 2,
            Self::Snack => 3,
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealSlot {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            other => Err(PlannerError::validation(format!(
                "unknown meal slot '{other}'"
            ))),
        }
    }
}

/// A macro quadruple: energy plus the three macronutrients in grams
///
/// Used for recipe base nutrition, achieved (scaled) nutrition, and plan
/// totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macros {
    /// Energy in kilocalories
    pub kcal: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fats in grams
    pub fats_g: f64,
}

impl Macros {
    /// Multiply every component by `factor`
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            kcal: self.kcal * factor,
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fats_g: self.fats_g * factor,
        }
    }

    /// Round every component to 2 decimal places for presentation
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            kcal: round2(self.kcal),
            protein_g: round2(self.protein_g),
            carbs_g: round2(self.carbs_g),
            fats_g: round2(self.fats_g),
        }
    }

    /// Component-wise sum
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self {
            kcal: self.kcal + other.kcal,
            protein_g: self.protein_g + other.protein_g,
            carbs_g: self.carbs_g + other.carbs_g,
            fats_g: self.fats_g + other.fats_g,
        }
    }
}

/// Daily macro targets for one planning request
///
/// Immutable after creation; allocation rejects non-positive components
/// before any selection work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTarget {
    /// Daily energy target in kilocalories
    pub kcal: f64,
    /// Daily protein target in grams
    pub protein_g: f64,
    /// Daily carbohydrate target in grams
    pub carbs_g: f64,
    /// Daily fat target in grams
    pub fats_g: f64,
}

impl MacroTarget {
    /// Check that all four components are finite and strictly positive
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Validation`] naming the offending component.
    pub fn validate(&self) -> PlannerResult<()> {
        for (name, value) in [
            ("kcal", self.kcal),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fats_g", self.fats_g),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlannerError::validation(format!(
                    "macro target '{name}' must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Scale the target by a split fraction to form a per-slot sub-target
    #[must_use]
    pub fn fraction(&self, split: f64) -> Self {
        Self {
            kcal: self.kcal * split,
            protein_g: self.protein_g * split,
            carbs_g: self.carbs_g * split,
            fats_g: self.fats_g * split,
        }
    }
}

/// Recipe nutritional totals at the fixed base portion (1.0x scale)
///
/// Aggregated from the recipe's ingredient list by the catalog query;
/// read-only from the allocator's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeNutrition {
    /// Catalog id of the recipe
    pub recipe_id: i64,
    /// Human-readable recipe name
    pub name: String,
    /// Slot the recipe is tagged for
    pub slot: MealSlot,
    /// Base-portion macros summed over the recipe's ingredients
    pub macros: Macros,
}

/// One allocated meal: the winning recipe for a slot with its applied scale
///
/// Never mutated after creation; a regeneration run produces new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenMeal {
    /// Slot this meal fills
    pub slot: MealSlot,
    /// Catalog id of the selected recipe
    pub recipe_id: i64,
    /// Name of the selected recipe
    pub recipe_name: String,
    /// Portion multiplier, clamped to the configured bounds and rounded to
    /// 2 decimals
    pub scale_factor: f64,
    /// Recipe macros at 1.0x scale
    pub base: Macros,
    /// `base` multiplied by `scale_factor`
    pub achieved: Macros,
}

/// A persisted (or freshly generated) daily meal plan
///
/// Identity is `(user_id, plan_date)`; at most one plan exists per user per
/// date, enforced by the storage layer's replace-on-conflict write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Storage id of the plan header
    pub plan_id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Calendar date the plan covers
    pub plan_date: NaiveDate,
    /// Daily targets the plan was allocated against
    pub targets: MacroTarget,
    /// Sum of achieved macros across all meals, rounded to 2 decimals
    pub achieved: Macros,
    /// One meal per slot, in slot order
    pub meals: Vec<ChosenMeal>,
}

/// Biological sex for basal metabolic rate calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Mifflin-St Jeor constant +5
    Male,
    /// Mifflin-St Jeor constant -161
    Female,
}

/// Self-reported activity level feeding the TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise (factor 1.20)
    Sedentary,
    /// 1-3 sessions per week (factor 1.375)
    Light,
    /// 3-5 sessions per week (factor 1.55)
    Moderate,
    /// 6-7 sessions per week (factor 1.725)
    Active,
    /// Hard daily training (factor 1.90)
    VeryActive,
}

/// Planning goal applied as a flat calorie adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Caloric deficit (-500 kcal)
    FatLoss,
    /// Caloric balance
    Maintenance,
    /// Caloric surplus (+300 kcal)
    MuscleGain,
}

/// Biometric input for target derivation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiometricProfile {
    /// Age in whole years
    pub age_years: u32,
    /// Biological sex
    pub sex: Sex,
    /// Height in centimeters
    pub height_cm: f64,
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Activity level
    pub activity_level: ActivityLevel,
    /// Planning goal
    pub goal: Goal,
}

/// Round to 2 decimal places for presentation
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum the achieved macros of a set of chosen meals, rounded to 2 decimals
///
/// The persist and fetch paths both use this so reported totals always agree
/// with the per-meal breakdown.
#[must_use]
pub fn achieved_totals(meals: &[ChosenMeal]) -> Macros {
    meals
        .iter()
        .fold(Macros::default(), |acc, meal| acc.plus(meal.achieved))
        .rounded()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_round_trips_through_storage_form() {
        for slot in MealSlot::ALL {
            assert_eq!(slot.as_str().parse::<MealSlot>().unwrap(), slot);
        }
        assert!("brunch".parse::<MealSlot>().is_err());
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert!((round2(1.0417) - 1.04).abs() < 1e-12);
        assert!((round2(499.20000000000005) - 499.2).abs() < 1e-12);
        assert!((round2(68.756) - 68.76).abs() < 1e-12);
    }

    #[test]
    fn target_validation_names_the_bad_component() {
        let target = MacroTarget {
            kcal: 2000.0,
            protein_g: 0.0,
            carbs_g: 200.0,
            fats_g: 60.0,
        };
        let err = target.validate().unwrap_err();
        assert!(err.to_string().contains("protein_g"), "{err}");
    }
}
