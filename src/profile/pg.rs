//! PostgreSQL-backed profile store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info, Instrument};

use super::{Preferences, ProfileStore, UserProfile};
use crate::config::DatabaseConfig;
use crate::errors::{AppError, AppResult};
use crate::filters::DietaryFilter;
use crate::observability::profile_span;

/// Create the profile table
pub async fn init_profile_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing profile schema");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            uid TEXT PRIMARY KEY,
            email TEXT,
            display_name TEXT,
            photo_url TEXT,
            dietary VARCHAR(20) NOT NULL DEFAULT 'None',
            allergies TEXT[] NOT NULL DEFAULT '{}',
            dislikes TEXT[] NOT NULL DEFAULT '{}',
            pantry TEXT[] NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    info!("Profile schema initialized successfully");
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the configured URL and make sure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .context("DATABASE_URL is not set")?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(url)
            .await
            .context("Failed to connect to profile database")?;

        init_profile_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        async {
            debug!(uid = %uid, "Fetching profile");

            let row = sqlx::query(
                "SELECT uid, email, display_name, photo_url, dietary, allergies, dislikes, pantry
                 FROM users WHERE uid = $1",
            )
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;

            Ok::<_, AppError>(row.map(|row| {
                let dietary: String = row.get(4);
                UserProfile {
                    uid: row.get(0),
                    email: row.get(1),
                    display_name: row.get(2),
                    photo_url: row.get(3),
                    preferences: Preferences {
                        dietary: dietary.parse().unwrap_or(DietaryFilter::None),
                        allergies: row.get(5),
                        dislikes: row.get(6),
                    },
                    pantry: row.get(7),
                }
            }))
        }
        .instrument(profile_span("fetch", Some(uid)))
        .await
    }

    async fn save(&self, profile: &UserProfile) -> AppResult<()> {
        async {
            debug!(uid = %profile.uid, "Saving profile");

            sqlx::query(
                "INSERT INTO users (uid, email, display_name, photo_url, dietary, allergies, dislikes, pantry)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (uid) DO UPDATE SET
                    email = EXCLUDED.email,
                    display_name = EXCLUDED.display_name,
                    photo_url = EXCLUDED.photo_url,
                    dietary = EXCLUDED.dietary,
                    allergies = EXCLUDED.allergies,
                    dislikes = EXCLUDED.dislikes,
                    pantry = EXCLUDED.pantry,
                    updated_at = CURRENT_TIMESTAMP",
            )
            .bind(&profile.uid)
            .bind(&profile.email)
            .bind(&profile.display_name)
            .bind(&profile.photo_url)
            .bind(profile.preferences.dietary.label())
            .bind(&profile.preferences.allergies)
            .bind(&profile.preferences.dislikes)
            .bind(&profile.pantry)
            .execute(&self.pool)
            .await?;

            Ok::<_, AppError>(())
        }
        .instrument(profile_span("save", Some(&profile.uid)))
        .await
    }

    async fn update_pantry(&self, uid: &str, pantry: &[String]) -> AppResult<()> {
        async {
            debug!(uid = %uid, items = pantry.len(), "Updating pantry");

            let result = sqlx::query(
                "UPDATE users SET pantry = $1, updated_at = CURRENT_TIMESTAMP WHERE uid = $2",
            )
            .bind(pantry.to_vec())
            .bind(uid)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::Profile(format!("No profile for uid {}", uid)));
            }
            Ok(())
        }
        .instrument(profile_span("update_pantry", Some(uid)))
        .await
    }
}
