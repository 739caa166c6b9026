use serde::Deserialize;

use super::models::ApplicationFilter;

/// Query string for `GET /AppliedJobs`
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationQuery {
    /// Exact job category
    pub filter: Option<String>,
    /// Applicant email
    pub user: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ApplicationQuery {
    /// Empty parameters count as absent
    pub fn into_filter(self) -> ApplicationFilter {
        ApplicationFilter {
            job_category: non_empty(self.filter),
            email: non_empty(self.user),
        }
    }
}
