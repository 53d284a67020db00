//! Read-only music library
//!
//! Loaded once at startup and shared by reference. Playlists may carry
//! duplicate or dangling track ids; resolution is the queue's job.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    pub duration_secs: u32,
    /// 0..=5
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub track_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub tracks: Vec<Track>,
    pub playlists: Vec<Playlist>,
}

impl Library {
    pub fn new(tracks: Vec<Track>, playlists: Vec<Playlist>) -> Self {
        Self { tracks, playlists }
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn playlist(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    /// Playlist by exact id, then by case-insensitive name containment
    pub fn find_playlist(&self, query: &str) -> Option<&Playlist> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.playlists
            .iter()
            .find(|p| p.id.to_lowercase() == query || p.name.to_lowercase() == query)
            .or_else(|| {
                self.playlists
                    .iter()
                    .find(|p| p.name.to_lowercase().contains(&query))
            })
    }

    /// Track by exact id, then title, then artist, then tag
    ///
    /// Among several matches in a tier the highest-rated wins.
    pub fn find_track(&self, query: &str) -> Option<&Track> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        if let Some(track) = self.tracks.iter().find(|t| t.id.to_lowercase() == query) {
            return Some(track);
        }

        let tiers: [&dyn Fn(&Track) -> bool; 3] = [
            &|t: &Track| t.title.to_lowercase().contains(&query),
            &|t: &Track| t.artist.to_lowercase().contains(&query),
            &|t: &Track| t.tags.iter().any(|tag| tag.to_lowercase() == query),
        ];
        tiers.iter().find_map(|pred| {
            self.tracks
                .iter()
                .filter(|t| pred(t))
                .max_by(|a, b| a.rating.total_cmp(&b.rating))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str, artist: &str, rating: f32, tags: &[&str]) -> Track {
        Track {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: None,
            duration_secs: 200,
            rating,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn library() -> Library {
        Library::new(
            vec![
                track("t1", "Night Drive", "Neon Coast", 4.0, &["synthwave"]),
                track("t2", "Morning Light", "Harbor", 3.5, &["acoustic"]),
                track("t3", "Drive Home", "Neon Coast", 4.8, &["synthwave"]),
            ],
            vec![Playlist {
                id: "pl-commute".to_string(),
                name: "Morning Commute".to_string(),
                track_ids: vec!["t2".into(), "t1".into()],
            }],
        )
    }

    #[test]
    fn test_find_track_by_id_first() {
        assert_eq!(library().find_track("T2").unwrap().id, "t2");
    }

    #[test]
    fn test_find_track_prefers_highest_rated_title_match() {
        assert_eq!(library().find_track("drive").unwrap().id, "t3");
    }

    #[test]
    fn test_find_track_by_artist_and_tag() {
        assert_eq!(library().find_track("harbor").unwrap().id, "t2");
        assert_eq!(library().find_track("acoustic").unwrap().id, "t2");
        assert!(library().find_track("polka").is_none());
        assert!(library().find_track("  ").is_none());
    }

    #[test]
    fn test_find_playlist() {
        let lib = library();
        assert_eq!(lib.find_playlist("pl-commute").unwrap().name, "Morning Commute");
        assert_eq!(lib.find_playlist("commute").unwrap().id, "pl-commute");
        assert!(lib.find_playlist("gym").is_none());
    }
}
