use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Pool, Sqlite};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

pub type DbPool = Pool<Sqlite>;

pub async fn init_pool(database_url: &str) -> AppResult<DbPool> {
    let opts = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Internal(format!("Invalid DB URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    Ok(SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect_with(opts)
        .await?)
}

/// Creates the schema if it does not exist yet. Safe to run on every startup.
pub async fn init_database(pool: &DbPool) -> AppResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            location TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS crops (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            crop_type TEXT NOT NULL,
            location TEXT,
            planted_date DATE,
            status TEXT NOT NULL DEFAULT 'healthy'
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS detections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            crop_id INTEGER REFERENCES crops(id),
            image_path TEXT NOT NULL,
            disease_name TEXT NOT NULL,
            confidence REAL NOT NULL,
            detected_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            notes TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS treatments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            crop_id INTEGER NOT NULL REFERENCES crops(id),
            disease_name TEXT,
            treatment_type TEXT,
            treatment_details TEXT,
            applied_date DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            effectiveness TEXT,
            notes TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS consultations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id),
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            crop_type TEXT,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// Enumerations are enforced at the API boundary; storage keeps plain TEXT.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStatus {
    Healthy,
    Infected,
    Treated,
}

impl CropStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropStatus::Healthy => "healthy",
            CropStatus::Infected => "infected",
            CropStatus::Treated => "treated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentType {
    Chemical,
    Organic,
}

impl TreatmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentType::Chemical => "chemical",
            TreatmentType::Organic => "organic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effectiveness {
    Effective,
    PartiallyEffective,
    NotEffective,
}

impl Effectiveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effectiveness::Effective => "effective",
            Effectiveness::PartiallyEffective => "partially_effective",
            Effectiveness::NotEffective => "not_effective",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub location: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Crop {
    pub id: i64,
    pub user_id: i64,
    pub crop_type: String,
    pub location: Option<String>,
    pub planted_date: Option<NaiveDate>,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Detection {
    pub id: i64,
    pub user_id: i64,
    pub crop_id: Option<i64>,
    pub image_path: String,
    pub disease_name: String,
    pub confidence: f64,
    pub detected_at: NaiveDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Treatment {
    pub id: i64,
    pub crop_id: i64,
    pub disease_name: Option<String>,
    pub treatment_type: Option<String>,
    pub treatment_details: Option<String>,
    pub applied_date: NaiveDateTime,
    pub effectiveness: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Consultation {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub crop_type: Option<String>,
    pub message: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}
