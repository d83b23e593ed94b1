use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::games::error::GameError;

/// Completion status of a backlog entry. Wire form uses the display
/// strings ("Not Started", ...); anything else is rejected at parse time
/// rather than allowed to poison the score with a non-numeric weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Status {
    /// Multiplier applied to the priority component of the play score.
    pub fn weight(self) -> f64 {
        match self {
            Status::InProgress => 1.3,
            Status::NotStarted => 1.0,
            Status::Completed => 0.7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Started" => Ok(Status::NotStarted),
            "In Progress" => Ok(Status::InProgress),
            "Completed" => Ok(Status::Completed),
            other => Err(GameError::Validation(format!("unknown status {:?}", other))),
        }
    }
}

// Lets sqlx decode the TEXT column straight into the enum.
impl TryFrom<String> for Status {
    type Error = GameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Derived ranking of a backlog entry: priority weighted by status, plus an
/// inverse-logarithmic hours term that rewards short games (positive below
/// 90 hours, negative above).
///
/// Pure and deterministic; the stored `play_score` must always equal this
/// function applied to the record's current fields.
pub fn play_score(status: Status, hours: f64, priority: i32) -> i32 {
    let priority_score = f64::from(priority) * 15.0;
    // Base-2 exactly; natural log does not reproduce the reference values.
    let hours_modifier = (100.0 / (hours + 10.0)).log2() * 5.0;
    // f64::round ties away from zero, matching the reference rounding.
    (priority_score * status.weight() + hours_modifier).round() as i32
}
