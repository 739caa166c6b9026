use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{Application, ApplicationDocument, ApplicationFilter};
use crate::jobs::repository::{increment_in, InMemoryJobRepository};
use crate::object_id::ObjectId;
use crate::shared::AppError;

/// Result of attempting to submit an application
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitApplicationResult {
    /// Application stored and the job's applicant count bumped
    Submitted,
    /// The referenced job does not exist; nothing was written
    JobNotFound,
}

/// Trait for application repository operations
#[async_trait]
pub trait ApplicationRepository {
    /// Atomically stores the application and increments its job's applicant count
    async fn submit_application(
        &self,
        application: &Application,
    ) -> Result<SubmitApplicationResult, AppError>;

    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, AppError>;
}

/// In-memory implementation of ApplicationRepository for development and testing
///
/// Shares the job collection of an `InMemoryJobRepository`; submission holds
/// the job write lock for the whole insert-and-increment.
pub struct InMemoryApplicationRepository {
    applications: RwLock<Vec<Application>>,
    jobs: Arc<InMemoryJobRepository>,
}

impl InMemoryApplicationRepository {
    pub fn new(jobs: Arc<InMemoryJobRepository>) -> Self {
        Self {
            applications: RwLock::new(Vec::new()),
            jobs,
        }
    }

    pub async fn application_count(&self) -> usize {
        self.applications.read().await.len()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    #[instrument(skip(self, application), fields(application_id = %application.id, job_id = %application.document.job_id))]
    async fn submit_application(
        &self,
        application: &Application,
    ) -> Result<SubmitApplicationResult, AppError> {
        // Lock order: jobs, then applications
        let mut jobs = self.jobs.collection().write().await;
        if !jobs.iter().any(|job| job.id == application.document.job_id) {
            debug!("Referenced job not found in memory");
            return Ok(SubmitApplicationResult::JobNotFound);
        }

        let mut applications = self.applications.write().await;
        if applications.iter().any(|existing| existing.id == application.id) {
            warn!("Application already exists in memory");
            return Err(AppError::DatabaseError(
                "Application already exists".to_string(),
            ));
        }
        applications.push(application.clone());
        increment_in(&mut jobs, &application.document.job_id);

        info!("Application submitted in memory");
        Ok(SubmitApplicationResult::Submitted)
    }

    #[instrument(skip(self))]
    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, AppError> {
        let applications: Vec<Application> = self
            .applications
            .read()
            .await
            .iter()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect();

        debug!(
            application_count = applications.len(),
            "Applications listed from memory"
        );
        Ok(applications)
    }
}

/// PostgreSQL implementation of application repository
pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn application_from_row(row: &PgRow) -> Result<Application, AppError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    let Json(document): Json<ApplicationDocument> = row
        .try_get("doc")
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(Application {
        id: id
            .parse::<ObjectId>()
            .map_err(|e| AppError::DatabaseError(e.to_string()))?,
        document,
    })
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    #[instrument(skip(self, application), fields(application_id = %application.id, job_id = %application.document.job_id))]
    async fn submit_application(
        &self,
        application: &Application,
    ) -> Result<SubmitApplicationResult, AppError> {
        let map_err = |e: sqlx::Error| {
            warn!(error = %e, "Failed to submit application in database");
            AppError::DatabaseError(e.to_string())
        };

        let mut tx = self.pool.begin().await.map_err(map_err)?;
        let job_id = application.document.job_id.to_string();

        // The row lock taken here serializes concurrent submissions for one job.
        let bumped = sqlx::query("UPDATE jobs SET applicants = applicants + 1 WHERE id = $1")
            .bind(&job_id)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;

        if bumped.rows_affected() == 0 {
            debug!("Referenced job not found in database");
            // Dropping the transaction rolls it back
            return Ok(SubmitApplicationResult::JobNotFound);
        }

        sqlx::query(
            "INSERT INTO applications (id, job_id, email, job_category, doc) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(application.id.to_string())
        .bind(&job_id)
        .bind(&application.document.email)
        .bind(&application.document.job_category)
        .bind(Json(&application.document))
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        tx.commit().await.map_err(map_err)?;

        info!("Application submitted in database");
        Ok(SubmitApplicationResult::Submitted)
    }

    #[instrument(skip(self))]
    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, AppError> {
        let rows = sqlx::query(
            "SELECT id, doc FROM applications \
             WHERE ($1::text IS NULL OR job_category = $1) \
               AND ($2::text IS NULL OR email = $2) \
             ORDER BY seq",
        )
        .bind(&filter.job_category)
        .bind(&filter.email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list applications from database");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(application_from_row).collect()
    }
}
