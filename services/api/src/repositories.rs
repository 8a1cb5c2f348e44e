//! Repositories for database operations

use common::error::{DatabaseError, DatabaseResult};
use engine::{Gender, Lifestyle, Profile, ProfileUpdate};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

/// Profile repository
///
/// This is the profile store adapter: one snapshot row per identity,
/// replaced in full on every update. Merge semantics are computed in the
/// engine before the write; concurrent updates for the same identity are
/// last-write-wins.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the profile snapshot for an identity
    ///
    /// An identity with no stored row has an empty partial profile, which
    /// is a valid state, not an error.
    pub async fn get(&self, user_id: Uuid) -> DatabaseResult<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT birthdate, gender, height_cm, weight_kg, country,
                   smoker, drinker, regular_exercise, healthy_diet
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.map(profile_from_row))
    }

    /// Merge an update into the stored snapshot and persist the result
    pub async fn update(&self, user_id: Uuid, update: &ProfileUpdate) -> DatabaseResult<Profile> {
        info!("Updating profile for user: {}", user_id);

        let prior = self.get(user_id).await?.unwrap_or_default();
        let merged = prior.merge(update);

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, birthdate, gender, height_cm, weight_kg, country,
                                  smoker, drinker, regular_exercise, healthy_diet, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            ON CONFLICT (user_id) DO UPDATE SET
                birthdate = EXCLUDED.birthdate,
                gender = EXCLUDED.gender,
                height_cm = EXCLUDED.height_cm,
                weight_kg = EXCLUDED.weight_kg,
                country = EXCLUDED.country,
                smoker = EXCLUDED.smoker,
                drinker = EXCLUDED.drinker,
                regular_exercise = EXCLUDED.regular_exercise,
                healthy_diet = EXCLUDED.healthy_diet,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(merged.birthdate)
        .bind(merged.gender.map(|g| g.as_str()))
        .bind(merged.height_cm)
        .bind(merged.weight_kg)
        .bind(&merged.country)
        .bind(merged.lifestyle.smoker)
        .bind(merged.lifestyle.drinker)
        .bind(merged.lifestyle.regular_exercise)
        .bind(merged.lifestyle.healthy_diet)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(merged)
    }
}

fn profile_from_row(row: PgRow) -> Profile {
    let gender: Option<String> = row.get("gender");
    Profile {
        birthdate: row.get("birthdate"),
        gender: gender.as_deref().and_then(Gender::parse),
        height_cm: row.get("height_cm"),
        weight_kg: row.get("weight_kg"),
        country: row.get("country"),
        lifestyle: Lifestyle {
            smoker: row.get("smoker"),
            drinker: row.get("drinker"),
            regular_exercise: row.get("regular_exercise"),
            healthy_diet: row.get("healthy_diet"),
        },
    }
}
