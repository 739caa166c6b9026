use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::object_id::ObjectId;

/// Keys the store owns; stripped from client-supplied extra fields.
const RESERVED_FIELDS: [&str; 2] = ["_id", "job_applicants"];

/// The person who posted a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Buyer {
    #[validate(email(message = "buyer.email must be a valid address"))]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Job posting as supplied by a client. Unknown fields are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JobDocument {
    #[validate(length(min = 1, message = "job_title cannot be empty"))]
    pub job_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_category: Option<String>,
    #[validate(nested)]
    pub buyer: Buyer,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobDocument {
    pub fn owner_email(&self) -> &str {
        &self.buyer.email
    }

    /// Drops store-owned keys a client may have echoed back.
    pub fn without_reserved_fields(mut self) -> Self {
        for field in RESERVED_FIELDS {
            self.extra.remove(field);
        }
        self
    }

    pub fn title_contains(&self, term: &str) -> bool {
        self.job_title
            .to_lowercase()
            .contains(&term.to_lowercase())
    }
}

/// Stored job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub job_applicants: i64,
    #[serde(flatten)]
    pub document: JobDocument,
}

impl Job {
    /// Creates a job with a fresh identifier and no applicants
    pub fn new(document: JobDocument) -> Self {
        Self::with_id(ObjectId::new(), document)
    }

    pub fn with_id(id: ObjectId, document: JobDocument) -> Self {
        Self {
            id,
            job_applicants: 0,
            document: document.without_reserved_fields(),
        }
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.document.owner_email() == email
    }
}
