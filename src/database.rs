// ABOUTME: SQLite storage backend - schema migration, catalog management, PlanStore implementation
// ABOUTME: Raw sqlx queries; plan replacement runs as a single transaction with rollback on drop
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Database Management
//!
//! `SQLite` implementation of the [`PlanStore`] collaborator plus the schema
//! it owns. Recipe macros are never stored denormalized: both the catalog
//! read and the plan lookup aggregate `SUM(per_100g * grams / 100)` over the
//! recipe's ingredient rows, so every read reflects the current ingredient
//! composition.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{PlannerError, PlannerResult};
use crate::models::{ChosenMeal, MacroTarget, Macros, MealSlot, RecipeNutrition};
use crate::storage::{PlanStore, StoredPlan, StoredPlanItem};

/// `SQLite`-backed storage for the recipe catalog and meal plans
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// File-backed URLs get `mode=rwc` appended so the database file is
    /// created on first use.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Persistence`] if the connection or migration
    /// fails.
    pub async fn new(database_url: &str) -> PlannerResult<Self> {
        let in_memory = database_url.contains(":memory:");
        let connection_options = if database_url.starts_with("sqlite:") && !in_memory {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        // An in-memory SQLite database exists per connection; cap the pool at
        // one so the migrated schema is visible to every later query.
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&connection_options)
                .await?
        } else {
            SqlitePool::connect(&connection_options).await?
        };

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Run idempotent schema migrations
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Persistence`] if any statement fails.
    pub async fn migrate(&self) -> PlannerResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS foods (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                kcal_per_100g REAL NOT NULL,
                protein_per_100g REAL NOT NULL,
                carbs_per_100g REAL NOT NULL,
                fats_per_100g REAL NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                meal_slot TEXT NOT NULL CHECK (meal_slot IN ('breakfast', 'lunch', 'dinner', 'snack'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recipe_id INTEGER NOT NULL,
                food_id INTEGER NOT NULL,
                grams REAL NOT NULL,
                FOREIGN KEY (recipe_id) REFERENCES recipes (id) ON DELETE CASCADE,
                FOREIGN KEY (food_id) REFERENCES foods (id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_meal_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                plan_date TEXT NOT NULL,
                target_kcal REAL NOT NULL,
                target_protein REAL NOT NULL,
                target_carbs REAL NOT NULL,
                target_fats REAL NOT NULL,
                UNIQUE (user_id, plan_date)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_meal_plan_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                meal_plan_id INTEGER NOT NULL,
                meal_slot TEXT NOT NULL,
                recipe_id INTEGER NOT NULL,
                scale_factor REAL NOT NULL,
                FOREIGN KEY (meal_plan_id) REFERENCES user_meal_plans (id) ON DELETE CASCADE,
                FOREIGN KEY (recipe_id) REFERENCES recipes (id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recipe_items_recipe ON recipe_items (recipe_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_plan_items_plan ON user_meal_plan_items (meal_plan_id)",
        )
        .execute(&self.pool)
        .await?;

        debug!("database migrations complete");
        Ok(())
    }

    // ================================
    // Catalog Management
    // ================================

    /// Insert or update a food by name, returning its id
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Persistence`] on query failure.
    pub async fn upsert_food(&self, name: &str, per_100g: Macros) -> PlannerResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO foods (name, kcal_per_100g, protein_per_100g, carbs_per_100g, fats_per_100g)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (name) DO UPDATE SET
                kcal_per_100g = excluded.kcal_per_100g,
                protein_per_100g = excluded.protein_per_100g,
                carbs_per_100g = excluded.carbs_per_100g,
                fats_per_100g = excluded.fats_per_100g
            RETURNING id
            ",
        )
        .bind(name)
        .bind(per_100g.kcal)
        .bind(per_100g.protein_g)
        .bind(per_100g.carbs_g)
        .bind(per_100g.fats_g)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Create a recipe with its ingredient list in one transaction
    ///
    /// `items` pairs a food id with the grams of that food in the base
    /// portion.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Validation`] for an empty ingredient list and
    /// [`PlannerError::Persistence`] on storage failure.
    pub async fn create_recipe(
        &self,
        name: &str,
        slot: MealSlot,
        items: &[(i64, f64)],
    ) -> PlannerResult<i64> {
        if items.is_empty() {
            return Err(PlannerError::validation(
                "a recipe needs at least one ingredient",
            ));
        }

        let mut tx = self.pool.begin().await?;

        let recipe_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO recipes (name, meal_slot) VALUES (?1, ?2) RETURNING id",
        )
        .bind(name)
        .bind(slot.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for &(food_id, grams) in items {
            sqlx::query("INSERT INTO recipe_items (recipe_id, food_id, grams) VALUES (?1, ?2, ?3)")
                .bind(recipe_id)
                .bind(food_id)
                .bind(grams)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(recipe_id)
    }
}

#[async_trait]
impl PlanStore for Database {
    async fn recipe_catalog(&self) -> PlannerResult<Vec<RecipeNutrition>> {
        let rows = sqlx::query(
            r"
            SELECT
                r.id AS recipe_id,
                r.name AS recipe_name,
                r.meal_slot,
                SUM(f.kcal_per_100g * ri.grams / 100.0) AS kcal,
                SUM(f.protein_per_100g * ri.grams / 100.0) AS protein_g,
                SUM(f.carbs_per_100g * ri.grams / 100.0) AS carbs_g,
                SUM(f.fats_per_100g * ri.grams / 100.0) AS fats_g
            FROM recipes r
            JOIN recipe_items ri ON ri.recipe_id = r.id
            JOIN foods f ON f.id = ri.food_id
            GROUP BY r.id, r.name, r.meal_slot
            ORDER BY r.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut catalog = Vec::with_capacity(rows.len());
        for row in rows {
            let slot: String = row.try_get("meal_slot")?;
            catalog.push(RecipeNutrition {
                recipe_id: row.try_get("recipe_id")?,
                name: row.try_get("recipe_name")?,
                slot: slot.parse()?,
                macros: Macros {
                    kcal: row.try_get("kcal")?,
                    protein_g: row.try_get("protein_g")?,
                    carbs_g: row.try_get("carbs_g")?,
                    fats_g: row.try_get("fats_g")?,
                },
            });
        }
        Ok(catalog)
    }

    async fn replace_plan(
        &self,
        user_id: Uuid,
        plan_date: NaiveDate,
        targets: &MacroTarget,
        meals: &[ChosenMeal],
    ) -> PlannerResult<i64> {
        // Header upsert, item delete, and item insert are one atomic unit; a
        // dropped transaction rolls everything back.
        let mut tx = self.pool.begin().await?;

        let plan_id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO user_meal_plans
                (user_id, plan_date, target_kcal, target_protein, target_carbs, target_fats)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (user_id, plan_date) DO UPDATE SET
                target_kcal = excluded.target_kcal,
                target_protein = excluded.target_protein,
                target_carbs = excluded.target_carbs,
                target_fats = excluded.target_fats
            RETURNING id
            ",
        )
        .bind(user_id.to_string())
        .bind(plan_date)
        .bind(targets.kcal)
        .bind(targets.protein_g)
        .bind(targets.carbs_g)
        .bind(targets.fats_g)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM user_meal_plan_items WHERE meal_plan_id = ?1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        for meal in meals {
            sqlx::query(
                r"
                INSERT INTO user_meal_plan_items (meal_plan_id, meal_slot, recipe_id, scale_factor)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(plan_id)
            .bind(meal.slot.as_str())
            .bind(meal.recipe_id)
            .bind(meal.scale_factor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(%user_id, %plan_date, plan_id, items = meals.len(), "meal plan replaced");
        Ok(plan_id)
    }

    async fn plan_for_date(
        &self,
        user_id: Uuid,
        plan_date: NaiveDate,
    ) -> PlannerResult<Option<StoredPlan>> {
        let header = sqlx::query(
            r"
            SELECT id, target_kcal, target_protein, target_carbs, target_fats
            FROM user_meal_plans
            WHERE user_id = ?1 AND plan_date = ?2
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(plan_date)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let plan_id: i64 = header.try_get("id")?;
        let targets = MacroTarget {
            kcal: header.try_get("target_kcal")?,
            protein_g: header.try_get("target_protein")?,
            carbs_g: header.try_get("target_carbs")?,
            fats_g: header.try_get("target_fats")?,
        };

        // Base macros come from the live catalog, not a persist-time
        // snapshot, so ingredient edits show up in old plans.
        let rows = sqlx::query(
            r"
            SELECT
                mpi.meal_slot,
                mpi.recipe_id,
                r.name AS recipe_name,
                mpi.scale_factor,
                SUM(f.kcal_per_100g * ri.grams / 100.0) AS base_kcal,
                SUM(f.protein_per_100g * ri.grams / 100.0) AS base_protein,
                SUM(f.carbs_per_100g * ri.grams / 100.0) AS base_carbs,
                SUM(f.fats_per_100g * ri.grams / 100.0) AS base_fats
            FROM user_meal_plan_items mpi
            JOIN recipes r ON r.id = mpi.recipe_id
            JOIN recipe_items ri ON ri.recipe_id = r.id
            JOIN foods f ON f.id = ri.food_id
            WHERE mpi.meal_plan_id = ?1
            GROUP BY mpi.id, mpi.meal_slot, mpi.recipe_id, r.name, mpi.scale_factor
            ORDER BY mpi.id
            ",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let slot: String = row.try_get("meal_slot")?;
            items.push(StoredPlanItem {
                slot: slot.parse()?,
                recipe_id: row.try_get("recipe_id")?,
                recipe_name: row.try_get("recipe_name")?,
                scale_factor: row.try_get("scale_factor")?,
                base: Macros {
                    kcal: row.try_get("base_kcal")?,
                    protein_g: row.try_get("base_protein")?,
                    carbs_g: row.try_get("base_carbs")?,
                    fats_g: row.try_get("base_fats")?,
                },
            });
        }

        Ok(Some(StoredPlan {
            plan_id,
            targets,
            items,
        }))
    }
}
