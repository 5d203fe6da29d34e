//! Radio Program Service
//!
//! Owns the program aggregate. Every referenced host, program details and
//! music id is resolved through its own store before anything is written,
//! `end_time` is re-derived on every write, and bulk reads are handed out as
//! [`RadioProgramView`]s so back-references never leave the service.

use chrono::{DateTime, SubsecRound, Utc};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use crate::{
    database::Database,
    errors::{AppError, AppResult, RepositoryError},
    models::{
        Entity, Host, Music, NewRadioProgram, ProgramDetails, RadioProgram,
        RadioProgramCreateRequest, RadioProgramUpdateRequest, RadioProgramView,
    },
    repositories::{
        HostRepository, MusicRepository, ProgramDetailsRepository, RadioProgramRepository,
        RadioProgramStore, Repository,
    },
};

pub type SqliteRadioProgramService = RadioProgramService<
    RadioProgramRepository,
    HostRepository,
    ProgramDetailsRepository,
    MusicRepository,
>;

const END_TIME_OUT_OF_RANGE: &str = "Program end time is out of range";

/// Log a failed store call and wrap it as an operation-scoped error
fn store_failure(operation: &'static str) -> impl FnOnce(RepositoryError) -> AppError {
    move |source| {
        error!("Unable to {}: {}", operation, source);
        AppError::store(operation, source)
    }
}

#[derive(Clone)]
pub struct RadioProgramService<P, H, D, M> {
    programs: P,
    hosts: H,
    program_details: D,
    musics: M,
}

impl SqliteRadioProgramService {
    pub fn from_database(database: &Database) -> Self {
        Self::new(
            RadioProgramRepository::new(database.pool()),
            HostRepository::new(database.pool()),
            ProgramDetailsRepository::new(database.pool()),
            MusicRepository::new(database.pool()),
        )
    }
}

impl<P, H, D, M> RadioProgramService<P, H, D, M>
where
    P: RadioProgramStore,
    H: Repository<Host, i64>,
    D: Repository<ProgramDetails, i64>,
    M: Repository<Music, i64>,
{
    pub fn new(programs: P, hosts: H, program_details: D, musics: M) -> Self {
        Self {
            programs,
            hosts,
            program_details,
            musics,
        }
    }

    /// Every program, projected without back-references
    pub async fn get_all_programs(&self) -> AppResult<Vec<RadioProgramView>> {
        let programs = self
            .programs
            .find_all()
            .await
            .map_err(store_failure("list radio programs"))?;
        debug!("Loaded {} radio programs", programs.len());

        Ok(programs.iter().map(RadioProgramView::from).collect())
    }

    pub async fn get_program_by_id(&self, id: i64) -> AppResult<Option<RadioProgram>> {
        self.programs
            .find_by_id(id)
            .await
            .map_err(store_failure("get radio program"))
    }

    /// Programs on air at `instant`, both interval ends included
    pub async fn get_programs_by_time(&self, instant: DateTime<Utc>) -> AppResult<Vec<RadioProgram>> {
        self.programs
            .find_by_time(instant)
            .await
            .map_err(store_failure("get radio programs by time"))
    }

    /// Create a program from resolved references.
    ///
    /// Unknown music ids are skipped; an unknown host or program details id
    /// rejects the whole request.
    pub async fn add_program(&self, request: RadioProgramCreateRequest) -> AppResult<RadioProgram> {
        const OPERATION: &str = "add radio program";

        let host = self
            .hosts
            .find_by_id(request.host_id)
            .await
            .map_err(store_failure(OPERATION))?;
        let details = self
            .program_details
            .find_by_id(request.program_details_id)
            .await
            .map_err(store_failure(OPERATION))?;

        let (Some(host), Some(details)) = (host, details) else {
            warn!(
                "Rejected radio program '{}': host {} or program details {} not found",
                request.name, request.host_id, request.program_details_id
            );
            return Err(AppError::validation("Invalid Host or ProgramDetails ID"));
        };

        let musics = self.resolve_musics(&request.music_ids, OPERATION).await?;

        let program = NewRadioProgram::new(request.name, request.start_time, host, details, musics)
            .ok_or_else(|| AppError::validation(END_TIME_OUT_OF_RANGE))?;

        let created = self
            .programs
            .create(program)
            .await
            .map_err(store_failure(OPERATION))?;

        info!(
            "Created radio program '{}' ({}) with {} musics",
            created.name,
            created.id,
            created.musics.len()
        );
        Ok(created)
    }

    /// Overwrite name, start time, host and program details of a program.
    ///
    /// Every reference is validated before the program is touched, so a
    /// rejected update changes nothing.
    pub async fn update_program(
        &self,
        id: i64,
        request: RadioProgramUpdateRequest,
    ) -> AppResult<RadioProgram> {
        const OPERATION: &str = "update radio program";

        let mut program = self
            .programs
            .find_by_id(id)
            .await
            .map_err(store_failure(OPERATION))?
            .ok_or_else(|| AppError::not_found(RadioProgram::NAME, id))?;

        let new_host = if request.host_id != program.host_id {
            let host = self
                .hosts
                .find_by_id(request.host_id)
                .await
                .map_err(store_failure(OPERATION))?;
            match host {
                Some(host) => Some(host),
                None => {
                    warn!("Rejected update of radio program {}: host {} not found", id, request.host_id);
                    return Err(AppError::validation("Invalid Host ID"));
                }
            }
        } else {
            None
        };

        let new_details = if request.program_details_id != program.program_details_id {
            let details = self
                .program_details
                .find_by_id(request.program_details_id)
                .await
                .map_err(store_failure(OPERATION))?;
            match details {
                Some(details) => Some(details),
                None => {
                    warn!(
                        "Rejected update of radio program {}: program details {} not found",
                        id, request.program_details_id
                    );
                    return Err(AppError::validation("Invalid ProgramDetails ID"));
                }
            }
        } else {
            None
        };

        program.name = request.name;
        program.start_time = request.start_time.trunc_subsecs(6);
        if let Some(host) = new_host {
            program.host_id = host.id;
            program.host = Host {
                programs: Vec::new(),
                ..host
            };
        }
        if let Some(details) = new_details {
            program.program_details_id = details.id;
            program.program_details = ProgramDetails {
                radio_program: None,
                ..details
            };
        }
        if !program.refresh_end_time() {
            return Err(AppError::validation(END_TIME_OUT_OF_RANGE));
        }

        self.persist(&mut program, OPERATION).await?;
        info!("Updated radio program '{}' ({})", program.name, program.id);
        Ok(program)
    }

    pub async fn add_music_to_program(&self, program_id: i64, music_id: i64) -> AppResult<RadioProgram> {
        const OPERATION: &str = "add music to radio program";

        let mut program = self
            .programs
            .find_by_id(program_id)
            .await
            .map_err(store_failure(OPERATION))?
            .ok_or_else(|| AppError::not_found(RadioProgram::NAME, program_id))?;

        if program.has_music(music_id) {
            warn!("Music {} is already on radio program {}", music_id, program_id);
            return Err(AppError::conflict("Music already added to Program"));
        }

        let music = self
            .musics
            .find_by_id(music_id)
            .await
            .map_err(store_failure(OPERATION))?
            .ok_or_else(|| {
                warn!("Rejected music {} for radio program {}: not found", music_id, program_id);
                AppError::validation("Invalid Music ID")
            })?;

        program.musics.push(Music {
            radio_programs: Vec::new(),
            ..music
        });

        self.persist(&mut program, OPERATION).await?;
        info!("Added music {} to radio program {}", music_id, program_id);
        Ok(program)
    }

    /// Delete a program together with its program details; unknown ids are ignored
    pub async fn delete_program(&self, id: i64) -> AppResult<()> {
        self.programs
            .delete(id)
            .await
            .map_err(store_failure("delete radio program"))?;
        info!("Deleted radio program {}", id);
        Ok(())
    }

    async fn resolve_musics(&self, music_ids: &[i64], operation: &'static str) -> AppResult<Vec<Music>> {
        let mut seen = HashSet::new();
        let mut musics = Vec::new();

        for &music_id in music_ids {
            if !seen.insert(music_id) {
                continue;
            }
            match self
                .musics
                .find_by_id(music_id)
                .await
                .map_err(store_failure(operation))?
            {
                Some(music) => musics.push(music),
                None => debug!("Skipping unknown music {}", music_id),
            }
        }

        Ok(musics)
    }

    /// Full update guarded by the program version
    async fn persist(&self, program: &mut RadioProgram, operation: &'static str) -> AppResult<()> {
        match self.programs.update(program).await {
            Ok(()) => {
                program.version += 1;
                Ok(())
            }
            Err(RepositoryError::VersionConflict { .. }) => {
                warn!("Radio program {} changed during {}", program.id, operation);
                Err(AppError::conflict(format!(
                    "Radio program {} was modified concurrently",
                    program.id
                )))
            }
            Err(RepositoryError::RecordNotFound { .. }) => {
                Err(AppError::not_found(RadioProgram::NAME, program.id))
            }
            Err(e) => Err(store_failure(operation)(e)),
        }
    }
}
