//! Error types surfaced at the boundary of the crate.
//!
//! Each error follows the `{Error, ErrorType, source}` shape used throughout
//! the Twilight ecosystem: a public struct hides its discriminant behind a
//! `kind()` accessor and implements [`std::error::Error`] by forwarding to an
//! optional boxed source.

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};
use twilight_model::id::{marker::GuildMarker, Id};

/// A caller violated a state precondition of a [`Link`] or [`Player`].
///
/// [`Link`]: crate::link::Link
/// [`Player`]: crate::player::Player
#[derive(Debug)]
pub struct IllegalAction {
    pub(crate) kind: IllegalActionType,
}

impl IllegalAction {
    /// Immutable reference to the type of illegal action that occurred.
    pub const fn kind(&self) -> &IllegalActionType {
        &self.kind
    }

    pub(crate) const fn new(kind: IllegalActionType) -> Self {
        Self { kind }
    }
}

impl Display for IllegalAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            IllegalActionType::UnknownGuild { guild_id } => {
                write!(f, "guild {guild_id} has no link and was never observed")
            }
            IllegalActionType::IllegalStateTransition { from, to } => {
                write!(f, "cannot change link state from {from:?} to {to:?}")
            }
            IllegalActionType::MismatchedGuild { expected, got } => {
                write!(
                    f,
                    "channel belongs to guild {got} but link is for guild {expected}"
                )
            }
            IllegalActionType::GuildUnavailable { guild_id } => {
                write!(f, "guild {guild_id} is unavailable")
            }
            IllegalActionType::MissingPermissions => {
                f.write_str("bot lacks `CONNECT` and `MOVE_MEMBERS` permission, or the channel is full")
            }
            IllegalActionType::ConnectTimedOut { guild_id } => {
                write!(
                    f,
                    "timed out waiting for guild {guild_id} to reflect the bot's voice state"
                )
            }
            IllegalActionType::NotPlaying => f.write_str("player has no current track"),
            IllegalActionType::NotSeekable => f.write_str("current track cannot be seeked"),
            IllegalActionType::InvalidVolume { volume } => {
                write!(f, "volume {volume} is outside the 0-150 range")
            }
            IllegalActionType::InvalidTracksResponse => {
                f.write_str("loadtracks response was missing required fields")
            }
        }
    }
}

impl StdError for IllegalAction {}

/// Type of [`IllegalAction`] that occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum IllegalActionType {
    /// `update_voice` was called for a guild that has no [`Link`] yet.
    ///
    /// [`Link`]: crate::link::Link
    UnknownGuild {
        /// Guild the caller attempted to act on.
        guild_id: Id<GuildMarker>,
    },
    /// `set_state` attempted to move out of a terminal state.
    IllegalStateTransition {
        /// Textual form of the state being left.
        from: &'static str,
        /// Textual form of the attempted destination state.
        to: &'static str,
    },
    /// `connect` was called with a channel belonging to a different guild.
    MismatchedGuild {
        /// The link's guild.
        expected: Id<GuildMarker>,
        /// The channel's guild.
        got: Id<GuildMarker>,
    },
    /// `connect` was called for an unavailable guild.
    GuildUnavailable {
        /// The guild that is unavailable.
        guild_id: Id<GuildMarker>,
    },
    /// The bot lacks permission to join the requested channel.
    MissingPermissions,
    /// `connect` did not observe the bot's own voice state within the
    /// allotted time.
    ConnectTimedOut {
        /// The guild the connection attempt was for.
        guild_id: Id<GuildMarker>,
    },
    /// A player command that requires a current track was issued with none
    /// playing.
    NotPlaying,
    /// `seek_to` was called on a track that isn't seekable.
    NotSeekable,
    /// `set_volume` was called with a value outside `0..=150`.
    InvalidVolume {
        /// The rejected volume.
        volume: i64,
    },
    /// A `loadtracks` REST response was missing fields the client depends on.
    InvalidTracksResponse,
}

/// Sending to, or receiving from, a node's websocket connection failed.
#[derive(Debug)]
pub struct NodeError {
    pub(crate) kind: NodeErrorType,
    pub(crate) source: Option<Box<dyn StdError + Send + Sync>>,
}

impl NodeError {
    /// Immutable reference to the type of error that occurred.
    pub const fn kind(&self) -> &NodeErrorType {
        &self.kind
    }

    pub(crate) fn new(
        kind: NodeErrorType,
        source: impl Into<Option<Box<dyn StdError + Send + Sync>>>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

impl Display for NodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            NodeErrorType::Unavailable => f.write_str("node's websocket connection isn't open"),
            NodeErrorType::Serializing => f.write_str("failed to serialize outgoing message"),
            NodeErrorType::BuildingConnection => f.write_str("failed to build websocket request"),
            NodeErrorType::Connecting => f.write_str("failed to dial node's websocket endpoint"),
            NodeErrorType::Unauthorized => {
                f.write_str("node rejected the configured authorization")
            }
            NodeErrorType::Sending => f.write_str("failed to write to the node's connection"),
        }
    }
}

impl StdError for NodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}

/// Type of [`NodeError`] that occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum NodeErrorType {
    /// The node isn't connected, so the message can't be sent.
    Unavailable,
    /// The outgoing message couldn't be serialized to JSON.
    Serializing,
    /// The websocket request couldn't be built, e.g. due to an invalid URI or
    /// header value.
    BuildingConnection,
    /// Dialing the websocket endpoint failed at the transport level.
    Connecting,
    /// The node rejected the handshake's `Authorization` header.
    Unauthorized,
    /// Writing a message to the open connection failed.
    Sending,
}

/// No node was available to service a request.
#[derive(Debug)]
pub struct NoNodesAvailable;

impl Display for NoNodesAvailable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("no nodes are registered, or none of the registered nodes are available")
    }
}

impl StdError for NoNodesAvailable {}

/// A `loadtracks` REST request to a node failed.
#[derive(Debug)]
pub struct RestError {
    pub(crate) kind: RestErrorType,
    pub(crate) source: Option<Box<dyn StdError + Send + Sync>>,
}

impl RestError {
    /// Immutable reference to the type of error that occurred.
    pub const fn kind(&self) -> &RestErrorType {
        &self.kind
    }

    pub(crate) fn new(
        kind: RestErrorType,
        source: impl Into<Option<Box<dyn StdError + Send + Sync>>>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

impl Display for RestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            RestErrorType::BuildingRequest => f.write_str("failed to build the HTTP request"),
            RestErrorType::Sending => f.write_str("failed to send the HTTP request"),
            RestErrorType::Response { status } => {
                write!(f, "node responded with non-success status {status}")
            }
            RestErrorType::Deserializing => f.write_str("failed to deserialize the response body"),
        }
    }
}

impl StdError for RestError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}

/// Type of [`RestError`] that occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum RestErrorType {
    /// The HTTP request couldn't be constructed.
    BuildingRequest,
    /// The HTTP request failed to complete.
    Sending,
    /// The node responded with a non-2xx status after exhausting retries.
    Response {
        /// The last observed HTTP status code.
        status: u16,
    },
    /// The response body couldn't be deserialized into the expected shape.
    Deserializing,
}

/// A command issued to a [`Player`] couldn't be delivered.
///
/// [`Player`]: crate::player::Player
#[derive(Debug)]
#[non_exhaustive]
pub enum PlayerCommandError {
    /// The command violated a domain precondition, e.g. seeking with nothing
    /// playing.
    IllegalAction(IllegalAction),
    /// No node was available to receive the command.
    NoNode(NoNodesAvailable),
    /// The assigned node was reachable but rejected or failed to receive the
    /// command.
    Node(NodeError),
}

impl Display for PlayerCommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::IllegalAction(source) => Display::fmt(source, f),
            Self::NoNode(source) => Display::fmt(source, f),
            Self::Node(source) => Display::fmt(source, f),
        }
    }
}

impl StdError for PlayerCommandError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::IllegalAction(source) => Some(source),
            Self::NoNode(source) => Some(source),
            Self::Node(source) => Some(source),
        }
    }
}

impl From<IllegalAction> for PlayerCommandError {
    fn from(source: IllegalAction) -> Self {
        Self::IllegalAction(source)
    }
}

impl From<NoNodesAvailable> for PlayerCommandError {
    fn from(source: NoNodesAvailable) -> Self {
        Self::NoNode(source)
    }
}

impl From<NodeError> for PlayerCommandError {
    fn from(source: NodeError) -> Self {
        Self::Node(source)
    }
}

/// A [`Link::get_tracks`] call couldn't be completed.
///
/// [`Link::get_tracks`]: crate::link::Link::get_tracks
#[derive(Debug)]
#[non_exhaustive]
pub enum TrackLookupError {
    /// No node was available to query.
    NoNode(NoNodesAvailable),
    /// The node that was queried failed the REST request.
    Rest(RestError),
}

impl Display for TrackLookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NoNode(source) => Display::fmt(source, f),
            Self::Rest(source) => Display::fmt(source, f),
        }
    }
}

impl StdError for TrackLookupError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::NoNode(source) => Some(source),
            Self::Rest(source) => Some(source),
        }
    }
}

impl From<NoNodesAvailable> for TrackLookupError {
    fn from(source: NoNodesAvailable) -> Self {
        Self::NoNode(source)
    }
}

impl From<RestError> for TrackLookupError {
    fn from(source: RestError) -> Self {
        Self::Rest(source)
    }
}

/// Handing a voice-state payload to the embedder's [`GatewaySender`] failed.
///
/// [`GatewaySender`]: crate::client::GatewaySender
#[derive(Debug)]
pub struct GatewaySendError {
    source: Box<dyn StdError + Send + Sync>,
}

impl GatewaySendError {
    pub(crate) fn new(source: Box<dyn StdError + Send + Sync>) -> Self {
        Self { source }
    }
}

impl Display for GatewaySendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("failed to send a gateway payload through the embedder's sender")
    }
}

impl StdError for GatewaySendError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GatewaySendError, IllegalAction, NodeError, NoNodesAvailable, PlayerCommandError,
        RestError, TrackLookupError,
    };
    use static_assertions::assert_impl_all;
    use std::{error::Error, fmt::Debug};

    assert_impl_all!(IllegalAction: Debug, Error, Send, Sync);
    assert_impl_all!(NodeError: Debug, Error, Send, Sync);
    assert_impl_all!(NoNodesAvailable: Debug, Error, Send, Sync);
    assert_impl_all!(RestError: Debug, Error, Send, Sync);
    assert_impl_all!(PlayerCommandError: Debug, Error, Send, Sync);
    assert_impl_all!(TrackLookupError: Debug, Error, Send, Sync);
    assert_impl_all!(GatewaySendError: Debug, Error, Send, Sync);
}
