//! Domain-level track and playlist types built from [`crate::http`]'s wire
//! representations, plus caller-attached user data.

use crate::http::{LoadResultData, LoadResultType, LoadTracksResponse, Track as WireTrack};
use std::{
    any::Any,
    fmt::{Debug, Formatter, Result as FmtResult},
    ops::Index,
    sync::Arc,
};

/// A loaded, playable track.
///
/// Cloning an `AudioTrack` is cheap: the encoded blob and metadata are plain
/// owned data, and `user_data` is reference counted.
#[derive(Clone)]
#[non_exhaustive]
pub struct AudioTrack {
    /// The base64 encoded track, as accepted by
    /// [`Play`](crate::model::outgoing::Play).
    pub encoded_track: String,
    /// The track's source URI, if known.
    pub uri: Option<String>,
    /// The track's title.
    pub title: String,
    /// The track's author.
    pub author: String,
    /// The track's source-specific identifier.
    pub identifier: String,
    /// Whether the track supports seeking.
    pub seekable: bool,
    /// Whether the track is a live stream rather than a bounded recording.
    pub is_stream: bool,
    /// The track's duration in milliseconds.
    pub duration: u64,
    /// The name of the source that resolved this track, e.g. `youtube`.
    pub source_name: String,
    /// The track's ISRC, if known.
    pub isrc: Option<String>,
    /// A URL to artwork for the track, if known.
    pub artwork_url: Option<String>,
    /// Arbitrary data attached by the caller, carried alongside the track
    /// through queues and player events.
    pub user_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl Debug for AudioTrack {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AudioTrack")
            .field("encoded_track", &self.encoded_track)
            .field("uri", &self.uri)
            .field("title", &self.title)
            .field("author", &self.author)
            .field("identifier", &self.identifier)
            .field("seekable", &self.seekable)
            .field("is_stream", &self.is_stream)
            .field("duration", &self.duration)
            .field("source_name", &self.source_name)
            .field("isrc", &self.isrc)
            .field("artwork_url", &self.artwork_url)
            .finish_non_exhaustive()
    }
}

impl PartialEq for AudioTrack {
    fn eq(&self, other: &Self) -> bool {
        self.encoded_track == other.encoded_track
    }
}

impl From<WireTrack> for AudioTrack {
    fn from(track: WireTrack) -> Self {
        Self {
            encoded_track: track.encoded,
            uri: track.info.uri,
            title: track.info.title,
            author: track.info.author,
            identifier: track.info.identifier,
            seekable: track.info.is_seekable,
            is_stream: track.info.is_stream,
            duration: track.info.length,
            source_name: track.info.source_name,
            isrc: track.info.isrc,
            artwork_url: track.info.artwork_url,
            user_data: None,
        }
    }
}

/// The outcome of resolving an identifier against a node's `loadtracks`
/// endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum LoadType {
    /// No matches were found.
    NoMatches,
    /// Loading the identifier failed.
    LoadFailed,
    /// A single track was loaded.
    TrackLoaded,
    /// A playlist was loaded.
    PlaylistLoaded,
    /// One or more search results were loaded.
    SearchResult,
    /// The node reported a `loadType` this client doesn't recognize.
    Unknown,
}

impl LoadType {
    /// Mirrors the original implementation's integer ordinal for this
    /// variant: negative for the two failure cases, non-negative otherwise.
    /// Only used to decide [`AudioTrackPlaylist::is_empty`].
    const fn ordinal(self) -> i8 {
        match self {
            Self::NoMatches => -2,
            Self::LoadFailed => -1,
            Self::Unknown => 0,
            Self::TrackLoaded => 1,
            Self::PlaylistLoaded => 2,
            Self::SearchResult => 3,
        }
    }
}

/// A set of tracks resolved from a single identifier: either a single track,
/// a playlist, or a list of search results.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct AudioTrackPlaylist {
    /// What kind of result this is.
    pub load_type: LoadType,
    /// The playlist's name, if this is a playlist result.
    pub playlist_name: Option<String>,
    /// The index of the track selected by the source, if this is a playlist
    /// result that designates one.
    pub selected_track: Option<usize>,
    /// The tracks contained in the result, in order.
    pub tracks: Vec<AudioTrack>,
}

impl AudioTrackPlaylist {
    /// Build a playlist from a raw `loadtracks` response.
    pub fn from_response(response: LoadTracksResponse) -> Self {
        match response.data {
            LoadResultData::Empty {} => Self {
                load_type: LoadType::NoMatches,
                playlist_name: None,
                selected_track: None,
                tracks: Vec::new(),
            },
            LoadResultData::Error(exception) => {
                tracing::debug!("loadtracks failed: {}", exception.cause);

                Self {
                    load_type: LoadType::LoadFailed,
                    playlist_name: None,
                    selected_track: None,
                    tracks: Vec::new(),
                }
            }
            LoadResultData::Track(track) => Self {
                load_type: LoadType::TrackLoaded,
                playlist_name: None,
                selected_track: Some(0),
                tracks: vec![AudioTrack::from(*track)],
            },
            LoadResultData::Search(tracks) => Self {
                load_type: LoadType::SearchResult,
                playlist_name: None,
                selected_track: None,
                tracks: tracks.into_iter().map(AudioTrack::from).collect(),
            },
            LoadResultData::Playlist(playlist) => {
                let selected_track = usize::try_from(playlist.info.selected_track).ok();

                Self {
                    load_type: LoadType::PlaylistLoaded,
                    playlist_name: Some(playlist.info.name),
                    selected_track,
                    tracks: playlist.tracks.into_iter().map(AudioTrack::from).collect(),
                }
            }
        }
    }

    /// Whether this result represents a playlist with more than one track
    /// (as opposed to a single track or a list of search results).
    pub fn is_playlist(&self) -> bool {
        matches!(self.load_type, LoadType::PlaylistLoaded) && self.tracks.len() > 1
    }

    /// Whether the load failed outright (a negative load type) or resolved
    /// no tracks.
    pub fn is_empty(&self) -> bool {
        self.load_type.ordinal() < 0 || self.tracks.is_empty()
    }

    /// The number of tracks in this result.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// An iterator over the tracks in this result.
    pub fn iter(&self) -> std::slice::Iter<'_, AudioTrack> {
        self.tracks.iter()
    }
}

impl Index<usize> for AudioTrackPlaylist {
    type Output = AudioTrack;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tracks[index]
    }
}

impl IntoIterator for AudioTrackPlaylist {
    type Item = AudioTrack;
    type IntoIter = std::vec::IntoIter<AudioTrack>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.into_iter()
    }
}

impl<'a> IntoIterator for &'a AudioTrackPlaylist {
    type Item = &'a AudioTrack;
    type IntoIter = std::slice::Iter<'a, AudioTrack>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

impl From<LoadResultType> for LoadType {
    fn from(value: LoadResultType) -> Self {
        match value {
            LoadResultType::Empty => Self::NoMatches,
            LoadResultType::Error => Self::LoadFailed,
            LoadResultType::Track => Self::TrackLoaded,
            LoadResultType::Playlist => Self::PlaylistLoaded,
            LoadResultType::Search => Self::SearchResult,
            LoadResultType::Unknown => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioTrack, AudioTrackPlaylist, LoadType};
    use crate::http::{LoadResultData, LoadResultType, LoadTracksResponse, Track, TrackInfo};
    use static_assertions::assert_impl_all;
    use std::fmt::Debug;

    assert_impl_all!(AudioTrack: Clone, Debug, Send, Sync);
    assert_impl_all!(AudioTrackPlaylist: Clone, Debug, Send, Sync);

    fn track(title: &str) -> Track {
        Track {
            encoded: "QAAA".to_owned(),
            info: TrackInfo {
                identifier: "id".to_owned(),
                is_seekable: true,
                author: "author".to_owned(),
                length: 1000,
                is_stream: false,
                position: 0,
                title: title.to_owned(),
                uri: None,
                artwork_url: None,
                isrc: None,
                source_name: "youtube".to_owned(),
            },
        }
    }

    #[test]
    fn empty_result() {
        let response = LoadTracksResponse {
            load_type: LoadResultType::Empty,
            data: LoadResultData::Empty {},
        };
        let playlist = AudioTrackPlaylist::from_response(response);

        assert_eq!(playlist.load_type, LoadType::NoMatches);
        assert!(playlist.is_empty());
        assert!(!playlist.is_playlist());
    }

    #[test]
    fn single_track_result() {
        let response = LoadTracksResponse {
            load_type: LoadResultType::Track,
            data: LoadResultData::Track(Box::new(track("a track"))),
        };
        let playlist = AudioTrackPlaylist::from_response(response);

        assert_eq!(playlist.load_type, LoadType::TrackLoaded);
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist[0].title, "a track");
        assert_eq!(playlist.selected_track, Some(0));
    }

    #[test]
    fn search_result() {
        let response = LoadTracksResponse {
            load_type: LoadResultType::Search,
            data: LoadResultData::Search(vec![track("one"), track("two")]),
        };
        let playlist = AudioTrackPlaylist::from_response(response);

        assert_eq!(playlist.len(), 2);
        assert!(!playlist.is_playlist());
        assert_eq!(playlist.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn playlist_result_with_multiple_tracks_is_a_playlist() {
        use crate::http::{PlaylistInfo, PlaylistResult};

        let response = LoadTracksResponse {
            load_type: LoadResultType::Playlist,
            data: LoadResultData::Playlist(Box::new(PlaylistResult {
                info: PlaylistInfo {
                    name: "a mix".to_owned(),
                    selected_track: 1,
                },
                tracks: vec![track("one"), track("two")],
            })),
        };
        let playlist = AudioTrackPlaylist::from_response(response);

        assert!(playlist.is_playlist());
        assert!(!playlist.is_empty());
        assert_eq!(playlist.playlist_name.as_deref(), Some("a mix"));
        assert_eq!(playlist.selected_track, Some(1));
    }

    #[test]
    fn playlist_result_with_one_track_is_not_a_playlist() {
        use crate::http::{PlaylistInfo, PlaylistResult};

        let response = LoadTracksResponse {
            load_type: LoadResultType::Playlist,
            data: LoadResultData::Playlist(Box::new(PlaylistResult {
                info: PlaylistInfo {
                    name: "a mix".to_owned(),
                    selected_track: 0,
                },
                tracks: vec![track("one")],
            })),
        };
        let playlist = AudioTrackPlaylist::from_response(response);

        assert!(!playlist.is_playlist());
    }

    #[test]
    fn load_failed_is_empty_even_conceptually() {
        let response = LoadTracksResponse {
            load_type: LoadResultType::Error,
            data: LoadResultData::Error(Box::new(crate::http::Exception {
                message: Some("bad url".to_owned()),
                severity: crate::http::Severity::Common,
                cause: "bad url".to_owned(),
            })),
        };
        let playlist = AudioTrackPlaylist::from_response(response);

        assert_eq!(playlist.load_type, LoadType::LoadFailed);
        assert!(playlist.is_empty());
    }
}
