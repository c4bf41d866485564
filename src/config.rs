// ABOUTME: Planner configuration - BMR coefficients, activity factors, split, scoring, clamps
// ABOUTME: Every numeric constant of the allocation algorithm lives here with a documented default
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Planner Configuration
//!
//! Calculation coefficients and product constants for target derivation and
//! meal allocation. Defaults encode the shipped product behavior; hosts may
//! deserialize overrides from their own configuration source.
//!
//! # Scientific References
//!
//! - BMR: Mifflin et al. (1990) DOI: 10.1093/ajcn/51.2.241
//! - Activity factors: `McArdle` et al. (2010), Exercise Physiology

use serde::{Deserialize, Serialize};

use crate::models::{ActivityLevel, Goal, MealSlot, Sex};

/// Top-level planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Basal Metabolic Rate calculation coefficients
    pub bmr: BmrConfig,
    /// Activity factor multipliers for maintenance calories
    pub activity_factors: ActivityFactorsConfig,
    /// Flat calorie adjustments per planning goal
    pub goal_adjustments: GoalAdjustmentsConfig,
    /// Per-kilogram macro rules and calorie densities
    pub macro_rules: MacroRulesConfig,
    /// Daily target share assigned to each meal slot
    pub meal_split: MealSplitConfig,
    /// Weighted absolute-deviation scoring coefficients
    pub scoring: ScoringWeightsConfig,
    /// Portion scale clamp bounds
    pub scale_bounds: ScaleBoundsConfig,
}

/// Mifflin-St Jeor BMR coefficients
///
/// Reference: Mifflin, M.D., et al. (1990). A new predictive equation for
/// resting energy expenditure. DOI: 10.1093/ajcn/51.2.241
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmrConfig {
    /// Weight coefficient (10.0)
    pub weight_coef: f64,
    /// Height coefficient (6.25)
    pub height_coef: f64,
    /// Age coefficient (-5.0)
    pub age_coef: f64,
    /// Male constant (+5)
    pub male_constant: f64,
    /// Female constant (-161)
    pub female_constant: f64,
}

impl Default for BmrConfig {
    fn default() -> Self {
        Self {
            weight_coef: 10.0,
            height_coef: 6.25,
            age_coef: -5.0,
            male_constant: 5.0,
            female_constant: -161.0,
        }
    }
}

impl BmrConfig {
    /// Sex-specific additive constant
    #[must_use]
    pub const fn sex_constant(&self, sex: Sex) -> f64 {
        match sex {
            Sex::Male => self.male_constant,
            Sex::Female => self.female_constant,
        }
    }
}

/// Activity factor multipliers applied to BMR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFactorsConfig {
    /// Little or no exercise: 1.20
    pub sedentary: f64,
    /// 1-3 sessions per week: 1.375
    pub light: f64,
    /// 3-5 sessions per week: 1.55
    pub moderate: f64,
    /// 6-7 sessions per week: 1.725
    pub active: f64,
    /// Hard daily training: 1.90
    pub very_active: f64,
}

impl Default for ActivityFactorsConfig {
    fn default() -> Self {
        Self {
            sedentary: 1.20,
            light: 1.375,
            moderate: 1.55,
            active: 1.725,
            very_active: 1.90,
        }
    }
}

impl ActivityFactorsConfig {
    /// Multiplier for an activity level
    #[must_use]
    pub const fn factor(&self, level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::Sedentary => self.sedentary,
            ActivityLevel::Light => self.light,
            ActivityLevel::Moderate => self.moderate,
            ActivityLevel::Active => self.active,
            ActivityLevel::VeryActive => self.very_active,
        }
    }
}

/// Flat calorie adjustments per planning goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalAdjustmentsConfig {
    /// Deficit applied for fat loss: -500 kcal
    pub fat_loss_kcal: f64,
    /// Surplus applied for muscle gain: +300 kcal
    pub muscle_gain_kcal: f64,
}

impl Default for GoalAdjustmentsConfig {
    fn default() -> Self {
        Self {
            fat_loss_kcal: -500.0,
            muscle_gain_kcal: 300.0,
        }
    }
}

impl GoalAdjustmentsConfig {
    /// Calorie adjustment for a goal; maintenance is always zero
    #[must_use]
    pub const fn adjustment(&self, goal: Goal) -> f64 {
        match goal {
            Goal::FatLoss => self.fat_loss_kcal,
            Goal::Maintenance => 0.0,
            Goal::MuscleGain => self.muscle_gain_kcal,
        }
    }
}

/// Per-kilogram macro rules and calorie densities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroRulesConfig {
    /// Protein grams per kilogram bodyweight: 2.0
    pub protein_g_per_kg: f64,
    /// Fat grams per kilogram bodyweight: 0.8
    pub fat_g_per_kg: f64,
    /// Calories per gram of protein: 4
    pub kcal_per_g_protein: f64,
    /// Calories per gram of carbohydrate: 4
    pub kcal_per_g_carb: f64,
    /// Calories per gram of fat: 9
    pub kcal_per_g_fat: f64,
}

impl Default for MacroRulesConfig {
    fn default() -> Self {
        Self {
            protein_g_per_kg: 2.0,
            fat_g_per_kg: 0.8,
            kcal_per_g_protein: 4.0,
            kcal_per_g_carb: 4.0,
            kcal_per_g_fat: 9.0,
        }
    }
}

/// Share of the daily target assigned to each slot
///
/// Applied independently to each macro, not just calories. The four shares
/// sum to 1.0 in the shipped defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealSplitConfig {
    /// Breakfast share: 0.25
    pub breakfast: f64,
    /// Lunch share: 0.35
    pub lunch: f64,
    /// Dinner share: 0.30
    pub dinner: f64,
    /// Snack share: 0.10
    pub snack: f64,
}

impl Default for MealSplitConfig {
    fn default() -> Self {
        Self {
            breakfast: 0.25,
            lunch: 0.35,
            dinner: 0.30,
            snack: 0.10,
        }
    }
}

impl MealSplitConfig {
    /// Share for a slot
    #[must_use]
    pub const fn share(&self, slot: MealSlot) -> f64 {
        match slot {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Dinner => self.dinner,
            MealSlot::Snack => self.snack,
        }
    }
}

/// Weighted absolute-deviation scoring coefficients
///
/// Protein adherence matters most, carbs and fats next, calories least since
/// portion scaling corrects calories after selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeightsConfig {
    /// Weight on |kcal deviation|: 0.5
    pub kcal: f64,
    /// Weight on |protein deviation|: 3.0
    pub protein: f64,
    /// Weight on |carb deviation|: 2.0
    pub carbs: f64,
    /// Weight on |fat deviation|: 2.0
    pub fats: f64,
}

impl Default for ScoringWeightsConfig {
    fn default() -> Self {
        Self {
            kcal: 0.5,
            protein: 3.0,
            carbs: 2.0,
            fats: 2.0,
        }
    }
}

/// Portion scale clamp bounds
///
/// Bounds how far a single recipe can be stretched or shrunk before it is
/// considered a poor fit; the allocator never re-scores after clamping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleBoundsConfig {
    /// Smallest allowed portion multiplier: 0.7
    pub min: f64,
    /// Largest allowed portion multiplier: 1.5
    pub max: f64,
}

impl Default for ScaleBoundsConfig {
    fn default() -> Self {
        Self { min: 0.7, max: 1.5 }
    }
}

impl ScaleBoundsConfig {
    /// Clamp a raw scale into the configured bounds
    #[must_use]
    pub fn clamp(&self, raw: f64) -> f64 {
        raw.clamp(self.min, self.max)
    }
}
