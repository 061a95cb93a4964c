//! Sound library
//!
//! Resolves sound ids to files. User sounds override bundled ones with the
//! same id; the first matching extension wins.

use std::path::{Path, PathBuf};

use runecall_core::{PlaybackError, TrackLoader};

use crate::players::SoundTrack;

const EXTENSIONS: [&str; 3] = ["ogg", "mp3", "wav"];

#[derive(Debug, Clone)]
pub struct SoundLibrary {
    /// Path to user custom sounds directory (overrides bundled)
    user_dir: PathBuf,
    /// Path to bundled sounds directory (fallback)
    bundled_dir: PathBuf,
}

impl SoundLibrary {
    pub fn new(user_dir: PathBuf, bundled_dir: PathBuf) -> Self {
        Self {
            user_dir,
            bundled_dir,
        }
    }

    /// Bundled sounds live in `sounds/` next to the executable, falling back
    /// to `./sounds`
    pub fn default_bundled_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("sounds")))
            .filter(|dir| dir.is_dir())
            .unwrap_or_else(|| PathBuf::from("sounds"))
    }

    pub fn resolve(&self, sound_id: &str) -> Option<PathBuf> {
        if !is_valid_id(sound_id) {
            return None;
        }

        [&self.user_dir, &self.bundled_dir]
            .into_iter()
            .flat_map(|dir| EXTENSIONS.iter().map(move |ext| dir.join(format!("{sound_id}.{ext}"))))
            .find(|path| path.is_file())
    }

    /// Ids of every sound available, sorted and deduplicated
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = [&self.user_dir, &self.bundled_dir]
            .into_iter()
            .filter_map(|dir| std::fs::read_dir(dir).ok())
            .flatten()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| has_known_extension(path))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

impl TrackLoader for SoundLibrary {
    type Track = SoundTrack;

    fn load(&self, sound_id: &str) -> Result<SoundTrack, PlaybackError> {
        let path = self.resolve(sound_id).ok_or_else(|| PlaybackError::SoundNotFound {
            sound_id: sound_id.to_string(),
        })?;
        Ok(SoundTrack {
            id: sound_id.to_string(),
            path,
        })
    }
}

/// Ids are bare file stems; anything that could walk out of the directory is refused
fn is_valid_id(sound_id: &str) -> bool {
    !sound_id.is_empty()
        && !sound_id.contains(['/', '\\'])
        && !sound_id.contains("..")
        && !sound_id.starts_with('.')
}

fn has_known_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}
