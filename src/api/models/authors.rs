use serde::Deserialize;

/// Request body for adding an author (JSON or form-encoded)
///
/// Dates are `YYYY-MM-DD`; blank values mean "unknown".
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthorRequest {
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub date_of_death: Option<String>,
}
