// ABOUTME: Daily macro target derivation from biometric input
// ABOUTME: Mifflin-St Jeor BMR, activity-factor TDEE, goal adjustment, g/kg macro rules
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Target Derivation
//!
//! Computes a [`MacroTarget`] from biometric input:
//!
//! 1. BMR via the Mifflin-St Jeor equation (1990)
//! 2. Maintenance calories = BMR x activity factor
//! 3. Flat goal adjustment (-500 fat loss, +300 muscle gain)
//! 4. Protein at 2 g/kg, fat at 0.8 g/kg, carbs from the remaining calories
//!
//! All outputs are rounded to the nearest whole gram/kcal.
//!
//! # Reference
//! Mifflin et al. (1990) DOI: 10.1093/ajcn/51.2.241

use tracing::warn;

use crate::config::{BmrConfig, PlannerConfig};
use crate::errors::{PlannerError, PlannerResult};
use crate::models::{BiometricProfile, MacroTarget, Sex};

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation
///
/// Formula: BMR = 10 x `weight_kg` + 6.25 x `height_cm` - 5 x age + constant
/// (+5 male, -161 female).
///
/// # Errors
///
/// Returns [`PlannerError::Validation`] if any input is out of the formula's
/// validated range (weight/height in (0, 300], age in [10, 120]).
pub fn mifflin_st_jeor(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    sex: Sex,
    config: &BmrConfig,
) -> PlannerResult<f64> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 || weight_kg > 300.0 {
        return Err(PlannerError::validation(
            "weight must be between 0 and 300 kg",
        ));
    }
    if !height_cm.is_finite() || height_cm <= 0.0 || height_cm > 300.0 {
        return Err(PlannerError::validation(
            "height must be between 0 and 300 cm",
        ));
    }
    if !(10..=120).contains(&age_years) {
        return Err(PlannerError::validation(
            "age must be between 10 and 120 years",
        ));
    }

    Ok(config.weight_coef * weight_kg
        + config.height_coef * height_cm
        + config.age_coef * f64::from(age_years)
        + config.sex_constant(sex))
}

/// Derive daily macro targets from a biometric profile
///
/// Protein and fat come from per-kilogram rules; carbohydrates absorb the
/// calories left after protein (4 kcal/g) and fat (9 kcal/g). When protein
/// and fat already exceed the calorie budget the carb target is floored at
/// zero grams and a warning is emitted, since negative grams are meaningless
/// to a caller.
///
/// # Errors
///
/// Returns [`PlannerError::Validation`] if the profile's biometrics are out
/// of range.
pub fn derive_targets(
    profile: &BiometricProfile,
    config: &PlannerConfig,
) -> PlannerResult<MacroTarget> {
    let bmr = mifflin_st_jeor(
        profile.weight_kg,
        profile.height_cm,
        profile.age_years,
        profile.sex,
        &config.bmr,
    )?;

    let maintenance = bmr * config.activity_factors.factor(profile.activity_level);
    let kcal = maintenance + config.goal_adjustments.adjustment(profile.goal);

    let rules = &config.macro_rules;
    let protein_g = profile.weight_kg * rules.protein_g_per_kg;
    let fats_g = profile.weight_kg * rules.fat_g_per_kg;

    let remaining_kcal = kcal - protein_g * rules.kcal_per_g_protein - fats_g * rules.kcal_per_g_fat;
    let mut carbs_g = remaining_kcal / rules.kcal_per_g_carb;
    if carbs_g < 0.0 {
        warn!(
            kcal,
            protein_g,
            fats_g,
            unfloored_carbs_g = carbs_g,
            "protein and fat calories exceed the daily budget; flooring carbs at 0 g"
        );
        carbs_g = 0.0;
    }

    Ok(MacroTarget {
        kcal: kcal.round(),
        protein_g: protein_g.round(),
        carbs_g: carbs_g.round(),
        fats_g: fats_g.round(),
    })
}
