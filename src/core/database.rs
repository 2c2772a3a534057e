// src/core/database.rs
//! SQLite storage for job records

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

use crate::core::FsOps;
use crate::types::{Category, ExperienceLevel, Job, JobType, NewJob};
use crate::utils::escape_like;

// ===== Connection Management =====

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!("Database connection established: {}", database_path.display());

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn jobs(&self) -> JobRepository {
        JobRepository::new(self.pool.clone())
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT 'Other',
                description TEXT NOT NULL,
                skills TEXT NOT NULL DEFAULT '[]',
                budget TEXT,
                client_location TEXT,
                experience_level TEXT,
                job_type TEXT,
                raw_text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create jobs table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_category ON jobs(category);")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);")
            .execute(&self.pool)
            .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Row Mapping =====

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: i64,
    title: String,
    category: String,
    description: String,
    skills: String,
    budget: Option<String>,
    client_location: Option<String>,
    experience_level: Option<String>,
    job_type: Option<String>,
    raw_text: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = anyhow::Error;

    fn try_from(row: JobRow) -> Result<Self> {
        let skills: Vec<String> = serde_json::from_str(&row.skills)
            .with_context(|| format!("Corrupt skills column for job {}", row.id))?;

        Ok(Job {
            id: row.id,
            title: row.title,
            category: Category::from_label(&row.category),
            description: row.description,
            skills,
            budget: row.budget,
            client_location: row.client_location,
            experience_level: row.experience_level.as_deref().and_then(ExperienceLevel::parse_loose),
            job_type: row.job_type.as_deref().and_then(JobType::parse_loose),
            raw_text: row.raw_text,
            created_at: row.created_at,
        })
    }
}

const JOB_COLUMNS: &str = "id, title, category, description, skills, budget, client_location, \
                           experience_level, job_type, raw_text, created_at";

fn into_jobs(rows: Vec<JobRow>) -> Result<Vec<Job>> {
    rows.into_iter().map(Job::try_from).collect()
}

// ===== Job Repository =====

/// CRUD over job records. Records are never updated in place.
#[derive(Clone)]
pub struct JobRepository {
    pool: SqlitePool,
}

impl JobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, job: &NewJob) -> Result<Job> {
        let now = Utc::now();
        let skills = serde_json::to_string(&job.skills).context("Failed to encode skills")?;

        let result = sqlx::query(
            r#"
            INSERT INTO jobs (title, category, description, skills, budget, client_location,
                              experience_level, job_type, raw_text, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.title)
        .bind(job.category.label())
        .bind(&job.description)
        .bind(&skills)
        .bind(&job.budget)
        .bind(&job.client_location)
        .bind(job.experience_level.map(|l| l.label()))
        .bind(job.job_type.map(|t| t.label()))
        .bind(&job.raw_text)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert job")?;

        let stored = Job {
            id: result.last_insert_rowid(),
            title: job.title.clone(),
            category: job.category,
            description: job.description.clone(),
            skills: job.skills.clone(),
            budget: job.budget.clone(),
            client_location: job.client_location.clone(),
            experience_level: job.experience_level,
            job_type: job.job_type,
            raw_text: job.raw_text.clone(),
            created_at: now,
        };

        info!("Stored job {} in category {}", stored.id, stored.category);
        Ok(stored)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Job::try_from).transpose()
    }

    /// Every job, newest first
    pub async fn list_all(&self) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_jobs(rows)
    }

    pub async fn list_by_category(&self, category: Category) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE category = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(category.label())
        .fetch_all(&self.pool)
        .await?;

        into_jobs(rows)
    }

    /// Case-insensitive substring search over title, description and each skill
    pub async fn search(&self, query: &str) -> Result<Vec<Job>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE title LIKE ? ESCAPE '\'
               OR description LIKE ? ESCAPE '\'
               OR EXISTS (
                   SELECT 1 FROM json_each(jobs.skills)
                   WHERE json_each.value LIKE ? ESCAPE '\'
               )
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        into_jobs(rows)
    }

    /// Returns true when a job with `id` existed and was removed
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete job")?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted job {}", id);
        }
        Ok(deleted)
    }

    /// Job counts per category, largest first
    pub async fn category_counts(&self) -> Result<Vec<(Category, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT category, COUNT(*) AS total
            FROM jobs
            GROUP BY category
            ORDER BY total DESC, category ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(label, total)| (Category::from_label(&label), total))
            .collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_jobs(rows)
    }
}
