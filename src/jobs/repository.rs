use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    types::Json,
    PgPool, Postgres, Row,
};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{Job, JobDocument};
use crate::object_id::ObjectId;
use crate::shared::{AppError, UpdateAck};

/// Outcome of a write that only the job's owner may perform
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedWrite<T> {
    Applied(T),
    /// The job belongs to someone else; nothing was written
    NotOwner,
}

/// Trait for job repository operations
#[async_trait]
pub trait JobRepository {
    async fn create_job(&self, job: &Job) -> Result<(), AppError>;
    /// All jobs in insertion order
    async fn list_jobs(&self) -> Result<Vec<Job>, AppError>;
    async fn get_job(&self, id: &ObjectId) -> Result<Option<Job>, AppError>;
    async fn list_jobs_by_owner(&self, email: &str) -> Result<Vec<Job>, AppError>;
    /// Removes `id` if `owner` posted it. Applied carries the number removed (0 or 1).
    async fn delete_job(&self, id: &ObjectId, owner: &str) -> Result<OwnedWrite<u64>, AppError>;
    /// Replaces the posting fields of `id` if `owner` posted it, creating the job
    /// when it does not exist. The applicant counter is kept.
    async fn replace_job(
        &self,
        id: &ObjectId,
        document: &JobDocument,
        owner: &str,
    ) -> Result<OwnedWrite<UpdateAck>, AppError>;
    /// Atomically adds one applicant; returns false when no job matched
    async fn increment_applicants(&self, id: &ObjectId) -> Result<bool, AppError>;
    /// Case-insensitive literal substring match on the title
    async fn search_jobs_by_title(&self, term: &str) -> Result<Vec<Job>, AppError>;
}

/// In-memory implementation of JobRepository for development and testing
///
/// Jobs are kept in insertion order. Data is lost when the application restarts.
pub struct InMemoryJobRepository {
    jobs: RwLock<Vec<Job>>,
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
        }
    }

    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: RwLock::new(jobs),
        }
    }

    /// Underlying collection, shared with the application repository so an
    /// application and its counter update happen under one write lock.
    pub(crate) fn collection(&self) -> &RwLock<Vec<Job>> {
        &self.jobs
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<Job>
    where
        F: Fn(&Job) -> bool,
    {
        self.jobs
            .read()
            .await
            .iter()
            .filter(|job| predicate(job))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create_job(&self, job: &Job) -> Result<(), AppError> {
        debug!("Creating job in memory");

        let mut jobs = self.jobs.write().await;
        if jobs.iter().any(|existing| existing.id == job.id) {
            warn!("Job already exists in memory");
            return Err(AppError::DatabaseError("Job already exists".to_string()));
        }
        jobs.push(job.clone());

        debug!("Job created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_jobs(&self) -> Result<Vec<Job>, AppError> {
        let jobs = self.filtered(|_| true).await;
        debug!(job_count = jobs.len(), "Jobs listed from memory");
        Ok(jobs)
    }

    #[instrument(skip(self))]
    async fn get_job(&self, id: &ObjectId) -> Result<Option<Job>, AppError> {
        let job = self
            .jobs
            .read()
            .await
            .iter()
            .find(|job| &job.id == id)
            .cloned();

        match &job {
            Some(_) => debug!(job_id = %id, "Job found in memory"),
            None => debug!(job_id = %id, "Job not found in memory"),
        }

        Ok(job)
    }

    #[instrument(skip(self))]
    async fn list_jobs_by_owner(&self, email: &str) -> Result<Vec<Job>, AppError> {
        let jobs = self.filtered(|job| job.is_owned_by(email)).await;
        debug!(job_count = jobs.len(), "Owner jobs listed from memory");
        Ok(jobs)
    }

    #[instrument(skip(self))]
    async fn delete_job(&self, id: &ObjectId, owner: &str) -> Result<OwnedWrite<u64>, AppError> {
        let mut jobs = self.jobs.write().await;

        match jobs.iter().position(|job| &job.id == id) {
            Some(index) if !jobs[index].is_owned_by(owner) => {
                debug!(job_id = %id, "Job delete refused in memory, owner mismatch");
                Ok(OwnedWrite::NotOwner)
            }
            Some(index) => {
                jobs.remove(index);
                debug!(job_id = %id, "Job deleted from memory");
                Ok(OwnedWrite::Applied(1))
            }
            None => {
                debug!(job_id = %id, "No job matched delete in memory");
                Ok(OwnedWrite::Applied(0))
            }
        }
    }

    #[instrument(skip(self, document))]
    async fn replace_job(
        &self,
        id: &ObjectId,
        document: &JobDocument,
        owner: &str,
    ) -> Result<OwnedWrite<UpdateAck>, AppError> {
        let mut jobs = self.jobs.write().await;
        let document = document.clone().without_reserved_fields();

        match jobs.iter_mut().find(|job| &job.id == id) {
            Some(job) if !job.is_owned_by(owner) => {
                debug!(job_id = %id, "Job replace refused in memory, owner mismatch");
                Ok(OwnedWrite::NotOwner)
            }
            Some(job) => {
                let modified = job.document != document;
                job.document = document;
                debug!(job_id = %id, modified, "Job replaced in memory");
                Ok(OwnedWrite::Applied(UpdateAck::matched(modified)))
            }
            None => {
                jobs.push(Job::with_id(*id, document));
                debug!(job_id = %id, "Job upserted in memory");
                Ok(OwnedWrite::Applied(UpdateAck::upserted(*id)))
            }
        }
    }

    #[instrument(skip(self))]
    async fn increment_applicants(&self, id: &ObjectId) -> Result<bool, AppError> {
        let mut jobs = self.jobs.write().await;
        Ok(increment_in(&mut jobs, id))
    }

    #[instrument(skip(self))]
    async fn search_jobs_by_title(&self, term: &str) -> Result<Vec<Job>, AppError> {
        let jobs = self.filtered(|job| job.document.title_contains(term)).await;
        debug!(job_count = jobs.len(), "Title search completed in memory");
        Ok(jobs)
    }
}

/// Bumps the applicant counter of `id` inside an already-locked collection
pub(crate) fn increment_in(jobs: &mut [Job], id: &ObjectId) -> bool {
    match jobs.iter_mut().find(|job| &job.id == id) {
        Some(job) => {
            job.job_applicants += 1;
            debug!(job_id = %id, job_applicants = job.job_applicants, "Applicant count incremented");
            true
        }
        None => {
            debug!(job_id = %id, "No job matched applicant increment");
            false
        }
    }
}

/// PostgreSQL implementation of job repository.
///
/// Postings live in the `jobs` table as JSONB next to the applicant counter;
/// `seq` preserves insertion order.
pub struct PostgresJobRepository {
    pool: PgPool,
}

impl PostgresJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn stored_owner(&self, id: &ObjectId) -> Result<Option<String>, AppError> {
        let owner: Option<Option<String>> =
            sqlx::query_scalar("SELECT doc -> 'buyer' ->> 'email' FROM jobs WHERE id = $1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, job_id = %id, "Failed to read job owner from database");
                    AppError::DatabaseError(e.to_string())
                })?;
        Ok(owner.flatten())
    }

    async fn fetch_jobs(&self, query: PgQuery<'_>) -> Result<Vec<Job>, AppError> {
        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            warn!(error = %e, "Failed to fetch jobs from database");
            AppError::DatabaseError(e.to_string())
        })?;
        rows.iter().map(job_from_row).collect()
    }
}

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

const JOB_COLUMNS: &str = "id, applicants, doc";

fn job_from_row(row: &PgRow) -> Result<Job, AppError> {
    let id: String = row.try_get("id").map_err(db_error)?;
    let applicants: i64 = row.try_get("applicants").map_err(db_error)?;
    let Json(document): Json<JobDocument> = row.try_get("doc").map_err(db_error)?;

    Ok(Job {
        id: id
            .parse::<ObjectId>()
            .map_err(|e| AppError::DatabaseError(e.to_string()))?,
        job_applicants: applicants,
        document,
    })
}

fn db_error(e: sqlx::Error) -> AppError {
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create_job(&self, job: &Job) -> Result<(), AppError> {
        debug!("Creating job in database");

        sqlx::query("INSERT INTO jobs (id, applicants, doc) VALUES ($1, $2, $3)")
            .bind(job.id.to_string())
            .bind(job.job_applicants)
            .bind(Json(&job.document))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create job in database");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!("Job created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_jobs(&self) -> Result<Vec<Job>, AppError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY seq");
        self.fetch_jobs(sqlx::query(&sql)).await
    }

    #[instrument(skip(self))]
    async fn get_job(&self, id: &ObjectId) -> Result<Option<Job>, AppError> {
        debug!(job_id = %id, "Fetching job from database");

        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, job_id = %id, "Failed to fetch job from database");
                AppError::DatabaseError(e.to_string())
            })?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_jobs_by_owner(&self, email: &str) -> Result<Vec<Job>, AppError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE doc -> 'buyer' ->> 'email' = $1 ORDER BY seq"
        );
        self.fetch_jobs(sqlx::query(&sql).bind(email.to_string())).await
    }

    #[instrument(skip(self))]
    async fn delete_job(&self, id: &ObjectId, owner: &str) -> Result<OwnedWrite<u64>, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND doc -> 'buyer' ->> 'email' = $2")
            .bind(id.to_string())
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, job_id = %id, "Failed to delete job from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() > 0 {
            debug!(job_id = %id, "Job deleted from database");
            return Ok(OwnedWrite::Applied(result.rows_affected()));
        }

        // Nothing removed: either no such job or another owner's job
        match self.stored_owner(id).await? {
            Some(_) => {
                debug!(job_id = %id, "Job delete refused in database, owner mismatch");
                Ok(OwnedWrite::NotOwner)
            }
            None => Ok(OwnedWrite::Applied(0)),
        }
    }

    #[instrument(skip(self, document))]
    async fn replace_job(
        &self,
        id: &ObjectId,
        document: &JobDocument,
        owner: &str,
    ) -> Result<OwnedWrite<UpdateAck>, AppError> {
        let document = document.clone().without_reserved_fields();

        // The conflict branch only fires for the owner's own, changed document.
        let inserted: Option<bool> = sqlx::query_scalar(
            "INSERT INTO jobs (id, applicants, doc) VALUES ($1, 0, $2) \
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc \
             WHERE jobs.doc -> 'buyer' ->> 'email' = $3 \
               AND jobs.doc IS DISTINCT FROM EXCLUDED.doc \
             RETURNING (xmax = 0)",
        )
        .bind(id.to_string())
        .bind(Json(&document))
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, job_id = %id, "Failed to replace job in database");
            AppError::DatabaseError(e.to_string())
        })?;

        let outcome = match inserted {
            Some(true) => OwnedWrite::Applied(UpdateAck::upserted(*id)),
            Some(false) => OwnedWrite::Applied(UpdateAck::matched(true)),
            // No row back: unchanged document, or someone else's job
            None => match self.stored_owner(id).await? {
                Some(current) if current != owner => OwnedWrite::NotOwner,
                _ => OwnedWrite::Applied(UpdateAck::matched(false)),
            },
        };
        debug!(job_id = %id, ?outcome, "Job replace applied in database");
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn increment_applicants(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE jobs SET applicants = applicants + 1 WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, job_id = %id, "Failed to increment applicants");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn search_jobs_by_title(&self, term: &str) -> Result<Vec<Job>, AppError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE strpos(lower(doc ->> 'job_title'), lower($1)) > 0 ORDER BY seq"
        );
        self.fetch_jobs(sqlx::query(&sql).bind(term.to_string())).await
    }
}
