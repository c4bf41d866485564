// ABOUTME: Orchestration tests for MealPlanner over an in-memory PlanStore fake and real SQLite
// ABOUTME: Covers generate/fetch round trips, plan-date parsing, and error propagation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Planner orchestration tests
//!
//! The storage collaborator is injected, so most cases run against a small
//! in-memory fake; one end-to-end case runs the full pipeline on SQLite.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use macroplan::database::Database;
use macroplan::errors::{PlannerError, PlannerResult};
use macroplan::models::{
    ActivityLevel, BiometricProfile, ChosenMeal, Goal, MacroTarget, Macros, MealSlot,
    RecipeNutrition, Sex,
};
use macroplan::planner::{parse_plan_date, MealPlanner};
use macroplan::storage::{PlanStore, StoredPlan, StoredPlanItem};
use uuid::Uuid;

/// In-memory `PlanStore` mimicking the SQLite backend's contract: items hold
/// only (slot, recipe, scale) and base macros are joined from the catalog at
/// read time.
#[derive(Default)]
struct FakeStore {
    catalog: Vec<RecipeNutrition>,
    plans: Mutex<HashMap<(Uuid, NaiveDate), StoredHeader>>,
    next_id: AtomicI64,
}

struct StoredHeader {
    plan_id: i64,
    targets: MacroTarget,
    items: Vec<(MealSlot, i64, f64)>,
}

impl FakeStore {
    fn with_catalog(catalog: Vec<RecipeNutrition>) -> Self {
        Self {
            catalog,
            plans: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl PlanStore for FakeStore {
    async fn recipe_catalog(&self) -> PlannerResult<Vec<RecipeNutrition>> {
        Ok(self.catalog.clone())
    }

    async fn replace_plan(
        &self,
        user_id: Uuid,
        plan_date: NaiveDate,
        targets: &MacroTarget,
        meals: &[ChosenMeal],
    ) -> PlannerResult<i64> {
        let mut plans = self.plans.lock().unwrap();
        let plan_id = plans
            .get(&(user_id, plan_date))
            .map_or_else(|| self.next_id.fetch_add(1, Ordering::SeqCst), |p| p.plan_id);
        plans.insert(
            (user_id, plan_date),
            StoredHeader {
                plan_id,
                targets: *targets,
                items: meals
                    .iter()
                    .map(|m| (m.slot, m.recipe_id, m.scale_factor))
                    .collect(),
            },
        );
        Ok(plan_id)
    }

    async fn plan_for_date(
        &self,
        user_id: Uuid,
        plan_date: NaiveDate,
    ) -> PlannerResult<Option<StoredPlan>> {
        let plans = self.plans.lock().unwrap();
        let Some(header) = plans.get(&(user_id, plan_date)) else {
            return Ok(None);
        };

        let mut items = Vec::new();
        for &(slot, recipe_id, scale_factor) in &header.items {
            let recipe = self
                .catalog
                .iter()
                .find(|r| r.recipe_id == recipe_id)
                .ok_or_else(|| PlannerError::persistence("dangling recipe reference"))?;
            items.push(StoredPlanItem {
                slot,
                recipe_id,
                recipe_name: recipe.name.clone(),
                scale_factor,
                base: recipe.macros,
            });
        }

        Ok(Some(StoredPlan {
            plan_id: header.plan_id,
            targets: header.targets,
            items,
        }))
    }
}

/// A store whose writes always fail, for error-propagation cases
struct BrokenStore {
    catalog: Vec<RecipeNutrition>,
}

#[async_trait]
impl PlanStore for BrokenStore {
    async fn recipe_catalog(&self) -> PlannerResult<Vec<RecipeNutrition>> {
        Ok(self.catalog.clone())
    }

    async fn replace_plan(
        &self,
        _user_id: Uuid,
        _plan_date: NaiveDate,
        _targets: &MacroTarget,
        _meals: &[ChosenMeal],
    ) -> PlannerResult<i64> {
        Err(PlannerError::persistence("disk on fire"))
    }

    async fn plan_for_date(
        &self,
        _user_id: Uuid,
        _plan_date: NaiveDate,
    ) -> PlannerResult<Option<StoredPlan>> {
        Err(PlannerError::persistence("disk on fire"))
    }
}

fn recipe(
    id: i64,
    name: &str,
    slot: MealSlot,
    kcal: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
) -> RecipeNutrition {
    RecipeNutrition {
        recipe_id: id,
        name: name.into(),
        slot,
        macros: Macros {
            kcal,
            protein_g: protein,
            carbs_g: carbs,
            fats_g: fats,
        },
    }
}

fn catalog() -> Vec<RecipeNutrition> {
    vec![
        recipe(1, "oat bowl", MealSlot::Breakfast, 480.0, 35.0, 55.0, 12.0),
        recipe(2, "chicken rice", MealSlot::Lunch, 680.0, 52.0, 72.0, 20.0),
        recipe(3, "salmon pasta", MealSlot::Dinner, 610.0, 44.0, 58.0, 19.0),
        recipe(4, "greek yogurt", MealSlot::Snack, 190.0, 16.0, 18.0, 6.0),
    ]
}

fn targets() -> MacroTarget {
    MacroTarget {
        kcal: 2000.0,
        protein_g: 150.0,
        carbs_g: 200.0,
        fats_g: 60.0,
    }
}

// ============================================================================
// Plan date parsing
// ============================================================================

#[test]
fn parse_plan_date_accepts_iso_and_rejects_garbage() {
    assert_eq!(
        parse_plan_date("2024-01-31").unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    );
    for bad in ["2024-13-01", "2024-02-30", "31/01/2024", "tomorrow", ""] {
        assert!(
            matches!(parse_plan_date(bad), Err(PlannerError::Validation { .. })),
            "'{bad}' should be rejected"
        );
    }
}

// ============================================================================
// Generate and fetch over the fake store
// ============================================================================

#[tokio::test]
async fn generate_then_fetch_reproduces_the_plan() {
    let planner = MealPlanner::new(FakeStore::with_catalog(catalog()));
    let user = Uuid::new_v4();
    let day = parse_plan_date("2024-01-01").unwrap();

    let generated = planner.generate(user, day, targets()).await.unwrap();
    assert_eq!(generated.meals.len(), 4);

    let fetched = planner.fetch(user, day).await.unwrap();
    assert_eq!(fetched.plan_id, generated.plan_id);
    assert_eq!(fetched.targets, generated.targets);
    // Catalog unchanged, so the whole plan reproduces exactly.
    assert_eq!(fetched.meals, generated.meals);
    assert_eq!(fetched.achieved, generated.achieved);
}

#[tokio::test]
async fn regeneration_replaces_and_keeps_plan_identity() {
    let planner = MealPlanner::new(FakeStore::with_catalog(catalog()));
    let user = Uuid::new_v4();
    let day = parse_plan_date("2024-01-01").unwrap();

    let first = planner.generate(user, day, targets()).await.unwrap();
    let bigger = MacroTarget {
        kcal: 2600.0,
        protein_g: 180.0,
        carbs_g: 280.0,
        fats_g: 75.0,
    };
    let second = planner.generate(user, day, bigger).await.unwrap();

    assert_eq!(first.plan_id, second.plan_id);

    let fetched = planner.fetch(user, day).await.unwrap();
    assert_eq!(fetched.targets, bigger, "replace must overwrite targets");
}

#[tokio::test]
async fn achieved_totals_sum_the_per_meal_breakdown() {
    let planner = MealPlanner::new(FakeStore::with_catalog(catalog()));
    let user = Uuid::new_v4();
    let day = parse_plan_date("2024-05-05").unwrap();

    let plan = planner.generate(user, day, targets()).await.unwrap();

    let kcal_sum: f64 = plan.meals.iter().map(|m| m.achieved.kcal).sum();
    assert!((plan.achieved.kcal - kcal_sum).abs() < 0.01);
}

#[tokio::test]
async fn fetch_without_plan_is_not_found() {
    let planner = MealPlanner::new(FakeStore::with_catalog(catalog()));
    let user = Uuid::new_v4();
    let day = parse_plan_date("2024-01-01").unwrap();

    match planner.fetch(user, day).await {
        Err(PlannerError::PlanNotFound { user_id, plan_date }) => {
            assert_eq!(user_id, user);
            assert_eq!(plan_date, day);
        }
        other => panic!("expected PlanNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn storage_failure_surfaces_as_persistence_error() {
    let planner = MealPlanner::new(BrokenStore { catalog: catalog() });
    let user = Uuid::new_v4();
    let day = parse_plan_date("2024-01-01").unwrap();

    let result = planner.generate(user, day, targets()).await;
    assert!(matches!(result, Err(PlannerError::Persistence { .. })));
}

#[tokio::test]
async fn profile_driven_generation_derives_targets_first() {
    let planner = MealPlanner::new(FakeStore::with_catalog(catalog()));
    let user = Uuid::new_v4();
    let day = parse_plan_date("2024-01-01").unwrap();
    let profile = BiometricProfile {
        age_years: 30,
        sex: Sex::Male,
        height_cm: 180.0,
        weight_kg: 75.0,
        activity_level: ActivityLevel::Moderate,
        goal: Goal::Maintenance,
    };

    let plan = planner
        .generate_for_profile(user, day, &profile)
        .await
        .unwrap();

    // 1730 BMR * 1.55 = 2681.5, rounded to 2682.
    assert!((plan.targets.kcal - 2682.0).abs() < 1e-9);
    assert!((plan.targets.protein_g - 150.0).abs() < 1e-9);
    assert_eq!(plan.meals.len(), 4);
}

// ============================================================================
// Serialization shape for the request layer
// ============================================================================

#[tokio::test]
async fn plan_serializes_with_snake_case_slots() {
    let planner = MealPlanner::new(FakeStore::with_catalog(catalog()));
    let user = Uuid::new_v4();
    let day = parse_plan_date("2024-01-01").unwrap();

    let plan = planner.generate(user, day, targets()).await.unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["meals"][0]["slot"], "breakfast");
    assert_eq!(json["plan_date"], "2024-01-01");
    assert!(json["achieved"]["kcal"].is_number());
}

// ============================================================================
// End to end on SQLite
// ============================================================================

#[tokio::test]
async fn end_to_end_on_sqlite_round_trips() {
    let db = Database::new("sqlite::memory:").await.unwrap();

    let oats = db
        .upsert_food(
            "oats",
            Macros { kcal: 380.0, protein_g: 13.0, carbs_g: 68.0, fats_g: 7.0 },
        )
        .await
        .unwrap();
    let chicken = db
        .upsert_food(
            "chicken breast",
            Macros { kcal: 165.0, protein_g: 31.0, carbs_g: 0.0, fats_g: 3.6 },
        )
        .await
        .unwrap();
    let rice = db
        .upsert_food(
            "rice",
            Macros { kcal: 130.0, protein_g: 2.7, carbs_g: 28.0, fats_g: 0.3 },
        )
        .await
        .unwrap();
    let yogurt = db
        .upsert_food(
            "greek yogurt",
            Macros { kcal: 97.0, protein_g: 9.0, carbs_g: 3.9, fats_g: 5.0 },
        )
        .await
        .unwrap();

    db.create_recipe("oat bowl", MealSlot::Breakfast, &[(oats, 130.0)])
        .await
        .unwrap();
    db.create_recipe(
        "chicken rice",
        MealSlot::Lunch,
        &[(chicken, 220.0), (rice, 250.0)],
    )
    .await
    .unwrap();
    db.create_recipe(
        "chicken bowl",
        MealSlot::Dinner,
        &[(chicken, 180.0), (rice, 220.0)],
    )
    .await
    .unwrap();
    db.create_recipe("yogurt cup", MealSlot::Snack, &[(yogurt, 170.0)])
        .await
        .unwrap();

    let planner = MealPlanner::new(db);
    let user = Uuid::new_v4();
    let day = parse_plan_date("2024-04-01").unwrap();

    let generated = planner.generate(user, day, targets()).await.unwrap();
    let fetched = planner.fetch(user, day).await.unwrap();

    assert_eq!(fetched.plan_id, generated.plan_id);
    assert_eq!(fetched.meals.len(), 4);
    for (g, f) in generated.meals.iter().zip(fetched.meals.iter()) {
        assert_eq!(g.slot, f.slot);
        assert_eq!(g.recipe_id, f.recipe_id);
        assert!((g.scale_factor - f.scale_factor).abs() < 1e-9);
        assert!((g.achieved.kcal - f.achieved.kcal).abs() < 0.01);
    }
}
