use serde::Deserialize;

/// Request body for create and full-record update. Everything is optional
/// at the serde layer so that a missing field surfaces as a 400 validation
/// error instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub hours: Option<f64>,
    pub status: Option<String>,
    pub priority: Option<i32>,
}
