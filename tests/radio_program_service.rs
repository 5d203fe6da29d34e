use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

use radio_scheduler::{
    database::Database,
    errors::{AppError, RepositoryResult},
    models::{
        Host, HostCreateRequest, Music, MusicCreateRequest, NewRadioProgram, ProgramDetails,
        ProgramDetailsCreateRequest, RadioProgram, RadioProgramCreateRequest,
        RadioProgramUpdateRequest,
    },
    repositories::{
        HostRepository, MusicRepository, ProgramDetailsRepository, RadioProgramRepository,
        RadioProgramStore, Repository,
    },
    services::{EntityService, HostService, MusicService, ProgramDetailsService, RadioProgramService,
        SqliteRadioProgramService},
};

struct Fixture {
    database: Database,
    service: SqliteRadioProgramService,
    hosts: HostService,
    musics: MusicService,
    program_details: ProgramDetailsService,
}

impl Fixture {
    async fn new() -> Self {
        let database = Database::in_memory().await.unwrap();
        Self {
            service: SqliteRadioProgramService::from_database(&database),
            hosts: EntityService::new(HostRepository::new(database.pool())),
            musics: EntityService::new(MusicRepository::new(database.pool())),
            program_details: EntityService::new(ProgramDetailsRepository::new(database.pool())),
            database,
        }
    }

    async fn host(&self, name: &str) -> Host {
        self.hosts
            .add(HostCreateRequest {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            })
            .await
            .unwrap()
    }

    async fn details(&self, seconds: u64) -> ProgramDetails {
        self.program_details
            .add(ProgramDetailsCreateRequest {
                description: format!("{seconds} second show"),
                duration: Duration::from_secs(seconds),
            })
            .await
            .unwrap()
    }

    async fn music(&self, title: &str) -> Music {
        self.musics
            .add(MusicCreateRequest {
                title: title.to_string(),
                artist: "The Testers".to_string(),
            })
            .await
            .unwrap()
    }

    async fn program(&self, start_time: DateTime<Utc>, seconds: u64) -> RadioProgram {
        let host = self.host("Ann").await;
        let details = self.details(seconds).await;
        self.service
            .add_program(RadioProgramCreateRequest {
                name: "Breakfast".to_string(),
                start_time,
                host_id: host.id,
                program_details_id: details.id,
                music_ids: Vec::new(),
            })
            .await
            .unwrap()
    }

    async fn program_count(&self) -> u64 {
        RadioProgramRepository::new(self.database.pool())
            .count()
            .await
            .unwrap()
    }
}

fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, second).unwrap()
}

fn music_ids(program: &RadioProgram) -> Vec<i64> {
    let mut ids: Vec<i64> = program.musics.iter().map(|m| m.id).collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn add_program_derives_end_time_from_duration() {
    let fixture = Fixture::new().await;
    let host = fixture.host("Ann").await;
    let details = fixture.details(5400).await;

    let program = fixture
        .service
        .add_program(RadioProgramCreateRequest {
            name: "Jazz".to_string(),
            start_time: at(20, 0, 0),
            host_id: host.id,
            program_details_id: details.id,
            music_ids: Vec::new(),
        })
        .await
        .unwrap();

    assert_eq!(program.end_time, at(21, 30, 0));
    assert_eq!(program.host.id, host.id);
    assert_eq!(program.program_details.id, details.id);

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert_eq!(stored.start_time, at(20, 0, 0));
    assert_eq!(stored.end_time, at(21, 30, 0));
    assert_eq!(stored.host.name, "Ann");
    assert_eq!(stored.program_details.duration, Duration::from_secs(5400));
}

#[tokio::test]
async fn add_program_rejects_unknown_host_or_details() {
    let fixture = Fixture::new().await;
    let host = fixture.host("Ann").await;
    let details = fixture.details(3600).await;

    for (host_id, program_details_id) in [(host.id + 100, details.id), (host.id, details.id + 100)] {
        let error = fixture
            .service
            .add_program(RadioProgramCreateRequest {
                name: "Ghost".to_string(),
                start_time: at(10, 0, 0),
                host_id,
                program_details_id,
                music_ids: Vec::new(),
            })
            .await
            .unwrap_err();

        match error {
            AppError::Validation { message } => {
                assert_eq!(message, "Invalid Host or ProgramDetails ID")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    assert_eq!(fixture.program_count().await, 0);
}

#[tokio::test]
async fn add_program_keeps_only_resolvable_musics() {
    let fixture = Fixture::new().await;
    let host = fixture.host("Ann").await;
    let details = fixture.details(3600).await;
    let first = fixture.music("First").await;
    let second = fixture.music("Second").await;

    let program = fixture
        .service
        .add_program(RadioProgramCreateRequest {
            name: "Mix".to_string(),
            start_time: at(10, 0, 0),
            host_id: host.id,
            program_details_id: details.id,
            music_ids: vec![second.id, 9_999, first.id, second.id],
        })
        .await
        .unwrap();

    let mut expected = vec![first.id, second.id];
    expected.sort_unstable();
    assert_eq!(music_ids(&program), expected);

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert_eq!(music_ids(&stored), expected);
}

#[tokio::test]
async fn add_music_twice_is_a_conflict() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;
    let music = fixture.music("M5").await;
    assert!(program.musics.is_empty());

    let updated = fixture
        .service
        .add_music_to_program(program.id, music.id)
        .await
        .unwrap();
    assert_eq!(music_ids(&updated), vec![music.id]);

    let error = fixture
        .service
        .add_music_to_program(program.id, music.id)
        .await
        .unwrap_err();
    match error {
        AppError::Conflict { message } => assert_eq!(message, "Music already added to Program"),
        other => panic!("expected conflict, got {other:?}"),
    }

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert_eq!(music_ids(&stored), vec![music.id]);
}

#[tokio::test]
async fn add_music_checks_program_then_music() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;
    let music = fixture.music("Known").await;

    let missing_program = fixture
        .service
        .add_music_to_program(program.id + 1, music.id)
        .await
        .unwrap_err();
    assert!(matches!(missing_program, AppError::NotFound { .. }));

    let missing_music = fixture
        .service
        .add_music_to_program(program.id, music.id + 1)
        .await
        .unwrap_err();
    match missing_music {
        AppError::Validation { message } => assert_eq!(message, "Invalid Music ID"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert!(stored.musics.is_empty());
}

#[tokio::test]
async fn update_with_same_references_moves_end_time_with_start() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;

    let updated = fixture
        .service
        .update_program(
            program.id,
            RadioProgramUpdateRequest {
                name: "Brunch".to_string(),
                start_time: at(11, 0, 0),
                host_id: program.host_id,
                program_details_id: program.program_details_id,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Brunch");
    assert_eq!(updated.host_id, program.host_id);
    assert_eq!(updated.program_details_id, program.program_details_id);
    assert_eq!(updated.end_time, at(12, 0, 0));

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Brunch");
    assert_eq!(stored.start_time, at(11, 0, 0));
    assert_eq!(stored.end_time, at(12, 0, 0));
    assert_eq!(stored.version, updated.version);
}

#[tokio::test]
async fn update_to_new_details_uses_new_duration_and_start() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;
    let longer = fixture.details(2 * 3600).await;
    let other_host = fixture.host("Bob").await;

    let updated = fixture
        .service
        .update_program(
            program.id,
            RadioProgramUpdateRequest {
                name: "Long Lunch".to_string(),
                start_time: at(12, 0, 0),
                host_id: other_host.id,
                program_details_id: longer.id,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.end_time, at(14, 0, 0));
    assert_eq!(updated.host.name, "Bob");

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert_eq!(stored.program_details_id, longer.id);
    assert_eq!(stored.host_id, other_host.id);
    assert_eq!(stored.end_time, at(14, 0, 0));
}

#[tokio::test]
async fn rejected_update_changes_nothing() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;

    let bad_host = fixture
        .service
        .update_program(
            program.id,
            RadioProgramUpdateRequest {
                name: "Renamed".to_string(),
                start_time: at(15, 0, 0),
                host_id: program.host_id + 50,
                program_details_id: program.program_details_id,
            },
        )
        .await
        .unwrap_err();
    match bad_host {
        AppError::Validation { message } => assert_eq!(message, "Invalid Host ID"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let bad_details = fixture
        .service
        .update_program(
            program.id,
            RadioProgramUpdateRequest {
                name: "Renamed".to_string(),
                start_time: at(15, 0, 0),
                host_id: program.host_id,
                program_details_id: program.program_details_id + 50,
            },
        )
        .await
        .unwrap_err();
    match bad_details {
        AppError::Validation { message } => assert_eq!(message, "Invalid ProgramDetails ID"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Breakfast");
    assert_eq!(stored.start_time, at(10, 0, 0));
    assert_eq!(stored.end_time, at(11, 0, 0));
    assert_eq!(stored.version, program.version);
}

#[tokio::test]
async fn update_of_unknown_program_is_not_found() {
    let fixture = Fixture::new().await;
    let host = fixture.host("Ann").await;
    let details = fixture.details(60).await;

    let error = fixture
        .service
        .update_program(
            42,
            RadioProgramUpdateRequest {
                name: "Nobody".to_string(),
                start_time: at(10, 0, 0),
                host_id: host.id,
                program_details_id: details.id,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::NotFound { .. }));
}

#[tokio::test]
async fn get_all_programs_has_no_back_references() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;
    let music = fixture.music("Shared").await;
    fixture
        .service
        .add_music_to_program(program.id, music.id)
        .await
        .unwrap();

    let views = fixture.service.get_all_programs().await.unwrap();
    assert_eq!(views.len(), 1);

    let json = serde_json::to_value(&views).unwrap();
    let item = &json[0];
    assert_eq!(item["host"]["name"], "Ann");
    assert!(item["host"].get("programs").is_none());
    assert!(item["program_details"].get("radio_program").is_none());
    assert_eq!(item["musics"][0]["title"], "Shared");
    assert!(item["musics"][0].get("radio_programs").is_none());

    // The stored back-references are untouched by the projection.
    let host = fixture.hosts.get_by_id(program.host_id).await.unwrap().unwrap();
    assert_eq!(host.programs, vec![program.id]);
    let music = fixture.musics.get_by_id(music.id).await.unwrap().unwrap();
    assert_eq!(music.radio_programs, vec![program.id]);
}

#[tokio::test]
async fn programs_by_time_include_both_boundaries() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;
    assert_eq!(program.end_time, at(11, 0, 0));

    let ids_at = |programs: Vec<RadioProgram>| programs.into_iter().map(|p| p.id).collect::<Vec<_>>();

    for instant in [at(10, 0, 0), at(10, 30, 0), at(11, 0, 0)] {
        let found = fixture.service.get_programs_by_time(instant).await.unwrap();
        assert_eq!(ids_at(found), vec![program.id], "expected program on air at {instant}");
    }

    for instant in [at(9, 59, 59), at(11, 0, 1)] {
        let found = fixture.service.get_programs_by_time(instant).await.unwrap();
        assert!(found.is_empty(), "expected nothing on air at {instant}");
    }
}

#[tokio::test]
async fn overlapping_programs_are_all_returned() {
    let fixture = Fixture::new().await;
    let early = fixture.program(at(9, 0, 0), 2 * 3600).await;
    let late = fixture.program(at(10, 0, 0), 3600).await;
    let music = fixture.music("Overlap").await;
    fixture.service.add_music_to_program(late.id, music.id).await.unwrap();

    let found = fixture.service.get_programs_by_time(at(10, 30, 0)).await.unwrap();

    assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![early.id, late.id]);
    assert!(found[0].musics.is_empty());
    assert_eq!(found[1].musics[0].title, "Overlap");
}

#[tokio::test]
async fn programs_by_time_respect_sub_microsecond_offsets() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;
    let half_micro = chrono::Duration::nanoseconds(500);

    for instant in [program.start_time - half_micro, program.end_time + half_micro] {
        assert!(!program.contains(instant));
        let found = fixture.service.get_programs_by_time(instant).await.unwrap();
        assert!(found.is_empty(), "expected nothing on air at {instant:?}");
    }

    for instant in [program.start_time + half_micro, program.end_time - half_micro] {
        assert!(program.contains(instant));
        let found = fixture.service.get_programs_by_time(instant).await.unwrap();
        assert_eq!(found.len(), 1, "expected the program on air at {instant:?}");
    }
}

fn assert_out_of_range(error: AppError) {
    match error {
        AppError::Validation { message } => assert_eq!(message, "Program end time is out of range"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn add_program_rejects_end_times_past_year_9999() {
    let fixture = Fixture::new().await;
    let existing = fixture.program(at(10, 0, 0), 3600).await;
    let host = fixture.host("Bob").await;
    let last_second = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();

    for (start_time, seconds) in [
        (last_second, 1),
        (DateTime::<Utc>::MAX_UTC - chrono::Duration::seconds(10), 60),
    ] {
        let details = fixture.details(seconds).await;
        let error = fixture
            .service
            .add_program(RadioProgramCreateRequest {
                name: "Millennium".to_string(),
                start_time,
                host_id: host.id,
                program_details_id: details.id,
                music_ids: Vec::new(),
            })
            .await
            .unwrap_err();
        assert_out_of_range(error);
    }

    assert_eq!(fixture.program_count().await, 1);
    let all = fixture.service.get_all_programs().await.unwrap();
    assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![existing.id]);

    let zero = fixture.details(0).await;
    let last = fixture
        .service
        .add_program(RadioProgramCreateRequest {
            name: "Last second".to_string(),
            start_time: last_second,
            host_id: host.id,
            program_details_id: zero.id,
            music_ids: Vec::new(),
        })
        .await
        .unwrap();
    assert_eq!(last.end_time, last_second);
    assert_eq!(fixture.service.get_all_programs().await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_program_rejects_end_times_past_year_9999() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;

    for start_time in [
        Utc.with_ymd_and_hms(9999, 12, 31, 23, 30, 0).unwrap(),
        DateTime::<Utc>::MAX_UTC - chrono::Duration::seconds(10),
    ] {
        let error = fixture
            .service
            .update_program(
                program.id,
                RadioProgramUpdateRequest {
                    name: "Far future".to_string(),
                    start_time,
                    host_id: program.host_id,
                    program_details_id: program.program_details_id,
                },
            )
            .await
            .unwrap_err();
        assert_out_of_range(error);
    }

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Breakfast");
    assert_eq!(stored.end_time, at(11, 0, 0));
    assert_eq!(stored.version, program.version);
    assert_eq!(fixture.service.get_all_programs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_program_removes_details_and_ignores_unknown_ids() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;

    fixture.service.delete_program(program.id).await.unwrap();

    assert!(fixture.service.get_program_by_id(program.id).await.unwrap().is_none());
    assert!(fixture
        .program_details
        .get_by_id(program.program_details_id)
        .await
        .unwrap()
        .is_none());
    assert!(fixture.hosts.get_by_id(program.host_id).await.unwrap().is_some());

    fixture.service.delete_program(program.id).await.unwrap();
    fixture.service.delete_program(9_999).await.unwrap();
}

#[tokio::test]
async fn store_failures_are_wrapped_per_operation() {
    let fixture = Fixture::new().await;
    let host = fixture.host("Ann").await;
    let details = fixture.details(3600).await;
    fixture.database.pool().close().await;

    let error = fixture
        .service
        .add_program(RadioProgramCreateRequest {
            name: "Offline".to_string(),
            start_time: at(10, 0, 0),
            host_id: host.id,
            program_details_id: details.id,
            music_ids: Vec::new(),
        })
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Store { .. }));
    assert_eq!(error.to_string(), "Unable to add radio program");
    assert!(!error.is_client_error());

    let error = fixture.service.get_all_programs().await.unwrap_err();
    assert_eq!(error.to_string(), "Unable to list radio programs");
}

/// Hands out programs one version behind the stored row, as if another
/// writer got there first.
struct StaleReads(RadioProgramRepository);

#[async_trait]
impl Repository<RadioProgram, i64> for StaleReads {
    type CreateRequest = NewRadioProgram;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<RadioProgram>> {
        Ok(self.0.find_by_id(id).await?.map(|mut program| {
            program.version -= 1;
            program
        }))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<RadioProgram>> {
        self.0.find_all().await
    }

    async fn create(&self, request: NewRadioProgram) -> RepositoryResult<RadioProgram> {
        self.0.create(request).await
    }

    async fn update(&self, program: &RadioProgram) -> RepositoryResult<()> {
        self.0.update(program).await
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.0.delete(id).await
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.0.count().await
    }
}

#[async_trait]
impl RadioProgramStore for StaleReads {
    async fn find_by_time(&self, instant: DateTime<Utc>) -> RepositoryResult<Vec<RadioProgram>> {
        self.0.find_by_time(instant).await
    }
}

#[tokio::test]
async fn concurrent_modification_is_a_conflict() {
    let fixture = Fixture::new().await;
    let program = fixture.program(at(10, 0, 0), 3600).await;
    let music = fixture.music("Late").await;

    let pool = fixture.database.pool();
    let stale = RadioProgramService::new(
        StaleReads(RadioProgramRepository::new(pool.clone())),
        HostRepository::new(pool.clone()),
        ProgramDetailsRepository::new(pool.clone()),
        MusicRepository::new(pool),
    );

    let error = stale.add_music_to_program(program.id, music.id).await.unwrap_err();
    assert!(matches!(error, AppError::Conflict { .. }));

    let error = stale
        .update_program(
            program.id,
            RadioProgramUpdateRequest {
                name: "Lost update".to_string(),
                start_time: at(12, 0, 0),
                host_id: program.host_id,
                program_details_id: program.program_details_id,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::Conflict { .. }));

    let stored = fixture.service.get_program_by_id(program.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Breakfast");
    assert!(stored.musics.is_empty());
}
