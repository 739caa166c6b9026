use serde::Deserialize;

/// Query string for `GET /SearchJobs`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}
