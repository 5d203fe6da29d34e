use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, Host, HostView, Music, MusicView, ProgramDetails, ProgramDetailsView};
use crate::utils::datetime::DateTimeParser;

/// End time for a program, if both ends fit the stored year range
fn schedulable_end(start_time: DateTime<Utc>, details: &ProgramDetails) -> Option<DateTime<Utc>> {
    let end_time = details.end_time_from(start_time)?;
    (DateTimeParser::is_storable(&start_time) && DateTimeParser::is_storable(&end_time))
        .then_some(end_time)
}

/// A scheduled program together with its host, details and musics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioProgram {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Always `start_time + program_details.duration`
    pub end_time: DateTime<Utc>,
    pub host_id: i64,
    pub host: Host,
    pub program_details_id: i64,
    pub program_details: ProgramDetails,
    pub musics: Vec<Music>,
    /// Optimistic concurrency token, bumped by every persisted update
    pub version: i64,
}

impl Entity for RadioProgram {
    const NAME: &'static str = "radio program";

    fn id(&self) -> i64 {
        self.id
    }
}

impl RadioProgram {
    /// Whether `instant` falls within `[start_time, end_time]`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_time <= instant && instant <= self.end_time
    }

    pub fn has_music(&self, music_id: i64) -> bool {
        self.musics.iter().any(|m| m.id == music_id)
    }

    /// Recompute `end_time` from the current start time and details.
    ///
    /// Returns `false` and leaves the program untouched when the end time
    /// would overflow or either end falls outside years 0 to 9999.
    pub fn refresh_end_time(&mut self) -> bool {
        match schedulable_end(self.start_time, &self.program_details) {
            Some(end_time) => {
                self.end_time = end_time;
                true
            }
            None => false,
        }
    }
}

/// A program ready to be inserted, with its references already resolved
#[derive(Debug, Clone)]
pub struct NewRadioProgram {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub host: Host,
    pub program_details: ProgramDetails,
    pub musics: Vec<Music>,
}

impl NewRadioProgram {
    /// Build a program, deriving its end time from the details' duration.
    ///
    /// The start time is truncated to the microsecond precision of the store.
    /// `None` when the end time would overflow or either end falls outside
    /// years 0 to 9999.
    pub fn new(
        name: String,
        start_time: DateTime<Utc>,
        host: Host,
        program_details: ProgramDetails,
        musics: Vec<Music>,
    ) -> Option<Self> {
        let start_time = start_time.trunc_subsecs(6);
        let end_time = schedulable_end(start_time, &program_details)?;
        Some(Self {
            name,
            start_time,
            end_time,
            host,
            program_details,
            musics,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioProgramCreateRequest {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub host_id: i64,
    pub program_details_id: i64,
    #[serde(default)]
    pub music_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioProgramUpdateRequest {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub host_id: i64,
    pub program_details_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMusicRequest {
    pub music_id: i64,
}

/// Outward shape of a program: forward references only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioProgramView {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub host_id: i64,
    pub host: HostView,
    pub program_details_id: i64,
    pub program_details: ProgramDetailsView,
    pub musics: Vec<MusicView>,
}

impl From<&RadioProgram> for RadioProgramView {
    fn from(program: &RadioProgram) -> Self {
        Self {
            id: program.id,
            name: program.name.clone(),
            start_time: program.start_time,
            end_time: program.end_time,
            host_id: program.host_id,
            host: HostView::from(&program.host),
            program_details_id: program.program_details_id,
            program_details: ProgramDetailsView::from(&program.program_details),
            musics: program.musics.iter().map(MusicView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn sample_program() -> RadioProgram {
        let start_time = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        RadioProgram {
            id: 1,
            name: "Breakfast".to_string(),
            start_time,
            end_time: start_time + chrono::Duration::hours(1),
            host_id: 3,
            host: Host {
                id: 3,
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
                programs: vec![1],
            },
            program_details_id: 4,
            program_details: ProgramDetails {
                id: 4,
                description: "Morning news".to_string(),
                duration: Duration::from_secs(3600),
                radio_program: Some(1),
            },
            musics: vec![Music {
                id: 5,
                title: "Song".to_string(),
                artist: "Band".to_string(),
                radio_programs: vec![1, 2],
            }],
            version: 1,
        }
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let program = sample_program();
        assert!(program.contains(program.start_time));
        assert!(program.contains(program.end_time));
        assert!(!program.contains(program.end_time + chrono::Duration::seconds(1)));
        assert!(!program.contains(program.start_time - chrono::Duration::seconds(1)));
    }

    #[test]
    fn view_drops_back_references() {
        let program = sample_program();
        let json = serde_json::to_value(RadioProgramView::from(&program)).unwrap();

        assert_eq!(json["host"]["name"], "Ann");
        assert!(json["host"].get("programs").is_none());
        assert!(json["program_details"].get("radio_program").is_none());
        assert!(json["musics"][0].get("radio_programs").is_none());
        assert_eq!(json["program_details"]["duration"], "1h");
    }

    #[test]
    fn refresh_end_time_follows_start_and_duration() {
        let mut program = sample_program();
        program.start_time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        program.program_details.duration = Duration::from_secs(1800);

        assert!(program.refresh_end_time());
        assert_eq!(
            program.end_time,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn create_request_defaults_music_ids() {
        let request: RadioProgramCreateRequest = serde_json::from_str(
            r#"{"name":"Late","start_time":"2024-03-01T22:00:00Z","host_id":1,"program_details_id":2}"#,
        )
        .unwrap();
        assert!(request.music_ids.is_empty());
    }

    #[test]
    fn programs_past_year_9999_are_not_schedulable() {
        let program = sample_program();
        let last_second = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();

        let one_second = ProgramDetails {
            duration: Duration::from_secs(1),
            ..program.program_details.clone()
        };
        assert!(NewRadioProgram::new(
            "Millennium".to_string(),
            last_second,
            program.host.clone(),
            one_second.clone(),
            Vec::new(),
        )
        .is_none());

        let mut moved = program.clone();
        moved.start_time = last_second;
        assert!(!moved.refresh_end_time());
        assert_eq!(moved.end_time, program.end_time);

        moved.program_details.duration = Duration::ZERO;
        assert!(moved.refresh_end_time());
        assert_eq!(moved.end_time, last_second);
    }
}
