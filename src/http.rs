//! Models and a REST client for a node's HTTP surface: `/v4/loadtracks` and
//! the track/exception payloads shared with the websocket protocol.

use crate::error::{RestError, RestErrorType};
use http_body_util::{BodyExt, Empty};
use hyper::{body::Bytes, header::AUTHORIZATION, Request};
use hyper_util::{client::legacy::Client as HyperClient, rt::TokioExecutor};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Severity of an [`Exception`] thrown by a node.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// The cause is known and expected; nothing is wrong with the library
    /// itself.
    Common,
    /// The probable cause is a bug, or there's no way to tell what the cause
    /// might be.
    Fault,
    /// The cause might not be exactly known, but is possibly caused by
    /// outside factors, e.g. a service responding unexpectedly.
    Suspicious,
}

/// Details of an error that occurred while loading or playing a track.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "camelCase")]
pub struct Exception {
    /// The cause of the exception.
    pub message: Option<String>,
    /// The severity of the exception.
    pub severity: Severity,
    /// The full stack trace of the cause.
    pub cause: String,
}

/// Metadata about an [`AudioTrack`](crate::track::AudioTrack)'s underlying
/// track, as reported by the node.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// The track identifier.
    pub identifier: String,
    /// Whether the track is seekable.
    pub is_seekable: bool,
    /// The track author.
    pub author: String,
    /// The track length in milliseconds.
    pub length: u64,
    /// Whether the track is a stream.
    pub is_stream: bool,
    /// The track position in milliseconds.
    pub position: u64,
    /// The track title.
    pub title: String,
    /// The track uri, absent for some sources (e.g. local files).
    pub uri: Option<String>,
    /// The track artwork url.
    #[serde(default)]
    pub artwork_url: Option<String>,
    /// The track [ISRC](https://en.wikipedia.org/wiki/International_Standard_Recording_Code).
    #[serde(default)]
    pub isrc: Option<String>,
    /// The track source name, e.g. `youtube` or `soundcloud`.
    pub source_name: String,
}

/// A track as returned by a node, ready to hand to
/// [`Play`](crate::model::outgoing::Play).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// The base64 encoded track, opaque to the client.
    pub encoded: String,
    /// Information about the track.
    pub info: TrackInfo,
}

/// The outcome of a `/v4/loadtracks` request.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "camelCase")]
pub enum LoadResultType {
    /// No matches were found for the given identifier.
    Empty,
    /// A single track was loaded.
    Track,
    /// A playlist was loaded.
    Playlist,
    /// A list of search results was loaded.
    Search,
    /// Loading the identifier failed.
    Error,
    /// A `loadType` this client doesn't recognize yet.
    #[serde(other)]
    Unknown,
}

/// Playlist metadata attached to a [`LoadResultData::Playlist`] response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    /// The name of the playlist.
    pub name: String,
    /// The selected track in the playlist, or `-1` if none is selected.
    #[serde(rename = "selectedTrack")]
    pub selected_track: i64,
}

/// A loaded playlist: its metadata plus the tracks it contains.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResult {
    /// Metadata about the playlist.
    pub info: PlaylistInfo,
    /// The tracks contained in the playlist.
    pub tracks: Vec<Track>,
}

/// The `data` field of a [`LoadTracksResponse`], shaped according to the
/// response's `loadType`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(untagged)]
pub enum LoadResultData {
    /// A single loaded track (`loadType: track`).
    Track(Box<Track>),
    /// A loaded playlist (`loadType: playlist`).
    Playlist(Box<PlaylistResult>),
    /// Search results (`loadType: search`).
    Search(Vec<Track>),
    /// Details of a load failure (`loadType: error`).
    Error(Box<Exception>),
    /// No data (`loadType: empty`).
    Empty {},
}

/// The full response body of a `/v4/loadtracks` request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "camelCase")]
pub struct LoadTracksResponse {
    /// The type of the result.
    pub load_type: LoadResultType,
    /// The data associated with the result.
    pub data: LoadResultData,
}

/// A lightweight REST client for a single node's HTTP surface.
///
/// Holds a keep-alive capable `hyper` client and the node's address and
/// authorization, and exposes `loadtracks` with bounded retries. Separate
/// from the websocket connection managed by [`crate::node::Node`], since
/// Lavalink's REST and websocket transports are independent.
#[derive(Clone, Debug)]
pub struct RestClient {
    authorization: Box<str>,
    http: HyperClient<hyper_util::client::legacy::connect::HttpConnector, Empty<Bytes>>,
    rest_address: Box<str>,
}

impl RestClient {
    /// Create a new REST client for a node reachable at `rest_address` (e.g.
    /// `http://localhost:2333`), authorizing requests with `authorization`.
    pub fn new(rest_address: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            authorization: authorization.into().into_boxed_str(),
            http: HyperClient::builder(TokioExecutor::new()).build_http(),
            rest_address: rest_address.into().into_boxed_str(),
        }
    }

    /// Load tracks for the given identifier (search term, URL, or local file
    /// reference), retrying transient failures with backoff.
    ///
    /// Retries up to `attempts` times (default 5), with a 1 second base delay
    /// doubling each attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RestErrorType::BuildingRequest`] if the request couldn't be
    /// constructed, [`RestErrorType::Sending`] if every attempt failed at the
    /// transport level, [`RestErrorType::Response`] if every attempt returned
    /// a non-success status, and [`RestErrorType::Deserializing`] if the
    /// final response body didn't match the expected shape.
    pub async fn load_tracks(&self, identifier: &str) -> Result<LoadTracksResponse, RestError> {
        const ATTEMPTS: u32 = 5;

        let uri = format!(
            "{}/v4/loadtracks?identifier={}",
            self.rest_address,
            percent_encoding::utf8_percent_encode(
                identifier,
                percent_encoding::NON_ALPHANUMERIC,
            ),
        );

        let mut last_status = None;
        let mut last_err = None;

        for attempt in 0..ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_secs(1 << (attempt - 1))).await;
            }

            let request = Request::builder()
                .uri(&uri)
                .header(AUTHORIZATION, self.authorization.as_ref())
                .body(Empty::new())
                .map_err(|source| RestError::new(RestErrorType::BuildingRequest, Box::new(source)))?;

            let response = match self.http.request(request).await {
                Ok(response) => response,
                Err(source) => {
                    tracing::warn!("loadtracks attempt {attempt} failed: {source}");
                    last_err = Some(source);
                    continue;
                }
            };

            let status = response.status();

            if !status.is_success() {
                tracing::warn!("node responded to loadtracks with status {status}");
                last_status = Some(status.as_u16());
                continue;
            }

            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|source| RestError::new(RestErrorType::Sending, Box::new(source)))?
                .to_bytes();

            return serde_json::from_slice(&body)
                .map_err(|source| RestError::new(RestErrorType::Deserializing, Box::new(source)));
        }

        if let Some(status) = last_status {
            return Err(RestError::new(
                RestErrorType::Response { status },
                None,
            ));
        }

        Err(RestError::new(
            RestErrorType::Sending,
            last_err.map(|source| Box::new(source) as _),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadResultData, LoadResultType, LoadTracksResponse, RestClient, Track, TrackInfo};
    use static_assertions::{assert_fields, assert_impl_all};
    use std::fmt::Debug;

    assert_impl_all!(RestClient: Clone, Debug, Send, Sync);
    assert_fields!(Track: encoded, info);

    #[test]
    fn deserialize_empty_result() {
        let json = r#"{"loadType":"empty","data":{}}"#;
        let response: LoadTracksResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.load_type, LoadResultType::Empty);
        assert!(matches!(response.data, LoadResultData::Empty {}));
    }

    #[test]
    fn deserialize_track_result() {
        let json = r#"{
            "loadType": "track",
            "data": {
                "encoded": "QAAA",
                "info": {
                    "identifier": "abc123",
                    "isSeekable": true,
                    "author": "someone",
                    "length": 10000,
                    "isStream": false,
                    "position": 0,
                    "title": "a track",
                    "uri": "https://example.com",
                    "sourceName": "youtube"
                }
            }
        }"#;
        let response: LoadTracksResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.load_type, LoadResultType::Track);
        match response.data {
            LoadResultData::Track(track) => {
                assert_eq!(track.encoded, "QAAA");
                assert_eq!(track.info.title, "a track");
            }
            other => panic!("expected a track result, got {other:?}"),
        }
    }

    #[test]
    fn track_info_roundtrip() {
        let info = TrackInfo {
            identifier: "abc".to_owned(),
            is_seekable: true,
            author: "author".to_owned(),
            length: 1000,
            is_stream: false,
            position: 0,
            title: "title".to_owned(),
            uri: None,
            artwork_url: None,
            isrc: None,
            source_name: "youtube".to_owned(),
        };

        let serialized = serde_json::to_string(&info).unwrap();
        let deserialized: TrackInfo = serde_json::from_str(&serialized).unwrap();
        assert_eq!(info, deserialized);
    }
}
