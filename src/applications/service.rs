use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{Application, ApplicationDocument, ApplicationFilter},
    repository::{ApplicationRepository, SubmitApplicationResult},
};
use crate::shared::{AppError, InsertAck};

/// Service for handling job application business logic
pub struct ApplicationService {
    repository: Arc<dyn ApplicationRepository + Send + Sync>,
}

impl ApplicationService {
    pub fn new(repository: Arc<dyn ApplicationRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Stores the application and bumps the referenced job's applicant count
    #[instrument(skip(self, document), fields(job_id = %document.job_id))]
    pub async fn submit_application(
        &self,
        document: ApplicationDocument,
    ) -> Result<InsertAck, AppError> {
        let application = Application::new(document);

        match self.repository.submit_application(&application).await? {
            SubmitApplicationResult::Submitted => {
                info!(application_id = %application.id, "Application submitted");
                Ok(InsertAck::new(application.id))
            }
            SubmitApplicationResult::JobNotFound => {
                warn!("Application references an unknown job");
                Err(AppError::NotFound("Job not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, AppError> {
        self.repository.list_applications(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::repository::InMemoryApplicationRepository;
    use crate::jobs::repository::{InMemoryJobRepository, JobRepository};
    use crate::jobs::{Job, JobDocument};
    use crate::object_id::ObjectId;
    use serde_json::{json, Map};

    async fn setup() -> (Arc<InMemoryJobRepository>, ApplicationService, ObjectId) {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let document: JobDocument = serde_json::from_value(json!({
            "job_title": "Backend Engineer",
            "buyer": { "email": "a@x.com" },
        }))
        .unwrap();
        let job = Job::new(document);
        jobs.create_job(&job).await.unwrap();

        let repository = Arc::new(InMemoryApplicationRepository::new(Arc::clone(&jobs)));
        (jobs, ApplicationService::new(repository), job.id)
    }

    fn document(job_id: ObjectId) -> ApplicationDocument {
        ApplicationDocument {
            job_id,
            email: "b@y.com".to_string(),
            job_category: Some("Engineering".to_string()),
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_submit_application_returns_insert_ack() {
        let (jobs, service, job_id) = setup().await;

        let ack = service.submit_application(document(job_id)).await.unwrap();
        assert!(ack.acknowledged);

        let listed = service
            .list_applications(&ApplicationFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, ack.inserted_id);
        assert_eq!(jobs.get_job(&job_id).await.unwrap().unwrap().job_applicants, 1);
    }

    #[tokio::test]
    async fn test_submit_application_unknown_job() {
        let (_jobs, service, _job_id) = setup().await;

        let result = service.submit_application(document(ObjectId::new())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
