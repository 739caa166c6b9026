use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{Job, JobDocument},
    repository::{JobRepository, OwnedWrite},
};
use crate::object_id::ObjectId;
use crate::shared::{AppError, DeleteAck, InsertAck, UpdateAck};

pub const INVALID_SEARCH_MESSAGE: &str = "Search parameter is missing or invalid.";

fn forbidden() -> AppError {
    AppError::Forbidden("Forbidden access denied".to_string())
}

/// Service for handling job posting business logic
pub struct JobService {
    repository: Arc<dyn JobRepository + Send + Sync>,
}

impl JobService {
    pub fn new(repository: Arc<dyn JobRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Stores a new posting under a fresh identifier
    #[instrument(skip(self, document))]
    pub async fn create_job(&self, document: JobDocument) -> Result<InsertAck, AppError> {
        let job = Job::new(document);
        self.repository.create_job(&job).await?;

        info!(job_id = %job.id, owner = %job.document.owner_email(), "Job created");
        Ok(InsertAck::new(job.id))
    }

    #[instrument(skip(self))]
    pub async fn list_jobs(&self) -> Result<Vec<Job>, AppError> {
        self.repository.list_jobs().await
    }

    /// Looks up one job; a malformed id is a bad request, an unknown one is not found
    #[instrument(skip(self))]
    pub async fn get_job(&self, raw_id: &str) -> Result<Job, AppError> {
        let id: ObjectId = raw_id.parse()?;
        self.repository
            .get_job(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list_jobs_by_owner(&self, email: &str) -> Result<Vec<Job>, AppError> {
        self.repository.list_jobs_by_owner(email).await
    }

    /// Deletes a job owned by `owner`. Deleting a missing job succeeds with a zero count.
    #[instrument(skip(self))]
    pub async fn delete_owned_job(&self, raw_id: &str, owner: &str) -> Result<DeleteAck, AppError> {
        let id: ObjectId = raw_id.parse()?;

        match self.repository.delete_job(&id, owner).await? {
            OwnedWrite::Applied(deleted) => {
                info!(job_id = %id, deleted, "Job delete processed");
                Ok(DeleteAck::new(deleted))
            }
            OwnedWrite::NotOwner => {
                warn!(job_id = %id, "Refusing to delete a job owned by someone else");
                Err(forbidden())
            }
        }
    }

    /// Replaces (or creates) a job owned by `owner`. The posting may not name another owner.
    #[instrument(skip(self, document))]
    pub async fn replace_owned_job(
        &self,
        raw_id: &str,
        document: JobDocument,
        owner: &str,
    ) -> Result<UpdateAck, AppError> {
        let id: ObjectId = raw_id.parse()?;

        if document.owner_email() != owner {
            warn!(job_id = %id, "Replacement names a different owner");
            return Err(forbidden());
        }

        match self.repository.replace_job(&id, &document, owner).await? {
            OwnedWrite::Applied(ack) => {
                info!(job_id = %id, upserted = ack.upserted_count, "Job replace processed");
                Ok(ack)
            }
            OwnedWrite::NotOwner => {
                warn!(job_id = %id, "Refusing to replace a job owned by someone else");
                Err(forbidden())
            }
        }
    }

    /// Case-insensitive title search; the term is required
    #[instrument(skip(self))]
    pub async fn search_jobs(&self, term: Option<&str>) -> Result<Vec<Job>, AppError> {
        let term = term.ok_or_else(|| {
            debug!("Search term missing");
            AppError::BadRequest(INVALID_SEARCH_MESSAGE.to_string())
        })?;
        self.repository.search_jobs_by_title(term).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::repository::InMemoryJobRepository;
    use serde_json::json;

    fn document(title: &str, owner: &str) -> JobDocument {
        serde_json::from_value(json!({
            "job_title": title,
            "buyer": { "email": owner },
        }))
        .unwrap()
    }

    fn service() -> JobService {
        JobService::new(Arc::new(InMemoryJobRepository::new()))
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();

        let ack = service
            .create_job(document("Backend Engineer", "a@x.com"))
            .await
            .unwrap();
        assert!(ack.acknowledged);

        let job = service.get_job(&ack.inserted_id.to_string()).await.unwrap();
        assert_eq!(job.id, ack.inserted_id);
        assert_eq!(job.document.job_title, "Backend Engineer");
    }

    #[tokio::test]
    async fn test_get_job_distinguishes_malformed_and_missing() {
        let service = service();

        assert!(matches!(
            service.get_job("not-an-id").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.get_job(&ObjectId::new().to_string()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_owned_job() {
        let service = service();
        let ack = service
            .create_job(document("Backend Engineer", "a@x.com"))
            .await
            .unwrap();
        let id = ack.inserted_id.to_string();

        assert!(matches!(
            service.delete_owned_job(&id, "b@y.com").await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(
            service.delete_owned_job(&id, "a@x.com").await.unwrap(),
            DeleteAck::new(1)
        );
        assert_eq!(
            service.delete_owned_job(&id, "a@x.com").await.unwrap(),
            DeleteAck::new(0)
        );
    }

    #[tokio::test]
    async fn test_replace_owned_job() {
        let service = service();
        let ack = service
            .create_job(document("Backend Engineer", "a@x.com"))
            .await
            .unwrap();
        let id = ack.inserted_id.to_string();

        // Someone else cannot overwrite it, nor can the owner hand it away
        assert!(matches!(
            service
                .replace_owned_job(&id, document("Hijacked", "b@y.com"), "b@y.com")
                .await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service
                .replace_owned_job(&id, document("Moved", "b@y.com"), "a@x.com")
                .await,
            Err(AppError::Forbidden(_))
        ));

        let ack = service
            .replace_owned_job(&id, document("Platform Engineer", "a@x.com"), "a@x.com")
            .await
            .unwrap();
        assert_eq!(ack, UpdateAck::matched(true));
        assert_eq!(
            service.get_job(&id).await.unwrap().document.job_title,
            "Platform Engineer"
        );
    }

    #[tokio::test]
    async fn test_replace_with_malformed_id() {
        let result = service()
            .replace_owned_job("xyz", document("Any", "a@x.com"), "a@x.com")
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_search_requires_term() {
        let service = service();
        service
            .create_job(document("Backend Engineer", "a@x.com"))
            .await
            .unwrap();

        assert!(matches!(
            service.search_jobs(None).await,
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(service.search_jobs(Some("backend")).await.unwrap().len(), 1);
        assert!(service.search_jobs(Some("sales")).await.unwrap().is_empty());
    }
}
