use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Entity;

/// Description and running time of one radio program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDetails {
    pub id: i64,
    pub description: String,
    pub duration: Duration,
    /// Id of the program these details belong to, if any
    pub radio_program: Option<i64>,
}

impl Entity for ProgramDetails {
    const NAME: &'static str = "program details";

    fn id(&self) -> i64 {
        self.id
    }
}

impl ProgramDetails {
    /// End of a program starting at `start` with these details.
    ///
    /// `None` when the result does not fit in a `DateTime<Utc>`.
    pub fn end_time_from(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let duration = chrono::Duration::from_std(self.duration).ok()?;
        start.checked_add_signed(duration)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDetailsCreateRequest {
    pub description: String,
    #[serde(with = "crate::utils::duration_serde")]
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDetailsView {
    pub id: i64,
    pub description: String,
    #[serde(with = "crate::utils::duration_serde")]
    pub duration: Duration,
}

impl From<&ProgramDetails> for ProgramDetailsView {
    fn from(details: &ProgramDetails) -> Self {
        Self {
            id: details.id,
            description: details.description.clone(),
            duration: details.duration,
        }
    }
}
