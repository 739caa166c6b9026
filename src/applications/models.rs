use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::object_id::ObjectId;

/// Application as submitted by a client. Unknown fields are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApplicationDocument {
    #[serde(rename = "JobId")]
    pub job_id: ObjectId,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub document: ApplicationDocument,
}

impl Application {
    pub fn new(mut document: ApplicationDocument) -> Self {
        document.extra.remove("_id");
        Self {
            id: ObjectId::new(),
            document,
        }
    }
}

/// Optional listing constraints, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationFilter {
    pub job_category: Option<String>,
    pub email: Option<String>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        let document = &application.document;
        let category_ok = self
            .job_category
            .as_ref()
            .map_or(true, |category| document.job_category.as_ref() == Some(category));
        let email_ok = self
            .email
            .as_ref()
            .map_or(true, |email| &document.email == email);
        category_ok && email_ok
    }
}
