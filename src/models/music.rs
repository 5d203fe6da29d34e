use serde::{Deserialize, Serialize};

use super::Entity;

/// A music track that can be played on any number of programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Music {
    pub id: i64,
    pub title: String,
    pub artist: String,
    /// Ids of the programs playing this track
    pub radio_programs: Vec<i64>,
}

impl Entity for Music {
    const NAME: &'static str = "music";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicCreateRequest {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicView {
    pub id: i64,
    pub title: String,
    pub artist: String,
}

impl From<&Music> for MusicView {
    fn from(music: &Music) -> Self {
        Self {
            id: music.id,
            title: music.title.clone(),
            artist: music.artist.clone(),
        }
    }
}
