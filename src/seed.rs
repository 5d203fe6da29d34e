//! Development sample data
//!
//! Fills an empty database with random hosts, musics, program details and
//! radio programs. Programs are created through
//! [`RadioProgramService`](crate::services::RadioProgramService) so the
//! seeded rows obey the same rules as API-created ones.

use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tracing::info;

use crate::{
    config::SeedConfig,
    database::Database,
    errors::AppResult,
    models::{HostCreateRequest, MusicCreateRequest, ProgramDetailsCreateRequest, RadioProgramCreateRequest},
    repositories::{HostRepository, MusicRepository, ProgramDetailsRepository},
    services::{
        EntityService, HostService, MusicService, ProgramDetailsService, SqliteRadioProgramService,
    },
};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Celia", "Dmitri", "Elena", "Farid", "Greta", "Hugo", "Ines", "Jonas", "Kira",
    "Luca", "Maya", "Nils", "Olga", "Pavel",
];
const LAST_NAMES: &[&str] = &[
    "Adler", "Brandt", "Costa", "Duval", "Eriksen", "Fischer", "Gallo", "Horvat", "Ivanova",
    "Jansen", "Kowalski", "Lindqvist",
];
const TITLE_ADJECTIVES: &[&str] = &[
    "Electric", "Silent", "Golden", "Midnight", "Broken", "Velvet", "Neon", "Distant", "Wild",
    "Paper",
];
const TITLE_NOUNS: &[&str] = &[
    "Highway", "Garden", "Signal", "Harbor", "Echo", "Horizon", "River", "Mirror", "Lantern",
    "Satellite",
];
const PROGRAM_THEMES: &[&str] = &[
    "Morning Drive", "Night Shift", "Weekend Mix", "Jazz Corner", "Indie Hour", "Talk Back",
    "Retro Replay", "Classical Notes", "Chart Watch", "Open Mic",
];
const DESCRIPTION_WORDS: &[&str] = &[
    "music", "guests", "stories", "news", "interviews", "requests", "classics", "live", "local",
    "new", "releases", "weather", "sessions",
];

/// What a seeding run inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub hosts: usize,
    pub musics: usize,
    pub program_details: usize,
    pub radio_programs: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn pick<'a>(rng: &mut fastrand::Rng, items: &[&'a str]) -> &'a str {
    items[rng.usize(..items.len())]
}

fn person_name(rng: &mut fastrand::Rng) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

fn sentence(rng: &mut fastrand::Rng) -> String {
    let words: Vec<&str> = (0..rng.usize(4..9)).map(|_| pick(rng, DESCRIPTION_WORDS)).collect();
    let mut text = words.join(" ");
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    text.push('.');
    text
}

/// Insert random sample data unless the database already has radio programs.
///
/// Returns an empty summary when seeding was skipped.
pub async fn seed_sample_data(database: &Database, config: &SeedConfig) -> AppResult<SeedSummary> {
    let programs = SqliteRadioProgramService::from_database(database);
    if !programs.get_all_programs().await?.is_empty() {
        info!("Radio programs already present, skipping sample data");
        return Ok(SeedSummary::default());
    }

    let mut rng = match config.rng_seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let hosts: HostService = EntityService::new(HostRepository::new(database.pool()));
    let musics: MusicService = EntityService::new(MusicRepository::new(database.pool()));
    let program_details: ProgramDetailsService =
        EntityService::new(ProgramDetailsRepository::new(database.pool()));

    let mut music_ids = Vec::new();
    for _ in 0..rng.usize(50..135) {
        let music = musics
            .add(MusicCreateRequest {
                title: format!("{} {}", pick(&mut rng, TITLE_ADJECTIVES), pick(&mut rng, TITLE_NOUNS)),
                artist: person_name(&mut rng),
            })
            .await?;
        music_ids.push(music.id);
    }

    let mut host_ids = Vec::new();
    for _ in 0..rng.usize(5..15) {
        let name = person_name(&mut rng);
        let email = format!(
            "{}{}@example.com",
            name.to_ascii_lowercase().replace(' ', "."),
            rng.u16(1..1000)
        );
        let host = hosts.add(HostCreateRequest { name, email }).await?;
        host_ids.push(host.id);
    }

    // Each program takes its own details row, so only that many programs can be made.
    let mut details_ids = Vec::new();
    for _ in 0..rng.usize(15..35) {
        let duration = Duration::from_secs(
            rng.u64(0..4) * 3600 + rng.u64(0..61) * 60 + rng.u64(0..60),
        );
        let details = program_details
            .add(ProgramDetailsCreateRequest {
                description: sentence(&mut rng),
                duration,
            })
            .await?;
        details_ids.push(details.id);
    }

    let program_count = rng.usize(5..20).min(details_ids.len());
    let now = Utc::now();
    for _ in 0..program_count {
        let details_id = details_ids.swap_remove(rng.usize(..details_ids.len()));
        let chosen_musics = rng.usize(1..=5).min(music_ids.len());
        let mut program_music_ids = music_ids.clone();
        rng.shuffle(&mut program_music_ids);
        program_music_ids.truncate(chosen_musics);

        programs
            .add_program(RadioProgramCreateRequest {
                name: pick(&mut rng, PROGRAM_THEMES).to_string(),
                start_time: now + ChronoDuration::minutes(15 * rng.i64(0..96)),
                host_id: host_ids[rng.usize(..host_ids.len())],
                program_details_id: details_id,
                music_ids: program_music_ids,
            })
            .await?;
    }

    let summary = SeedSummary {
        hosts: host_ids.len(),
        musics: music_ids.len(),
        program_details: details_ids.len() + program_count,
        radio_programs: program_count,
    };
    info!(
        "Seeded {} hosts, {} musics, {} program details and {} radio programs",
        summary.hosts, summary.musics, summary.program_details, summary.radio_programs
    );
    Ok(summary)
}
