//! Models to (de)serialize incoming/outgoing websocket events.
//!
//! Track payloads embedded in these events (`Track`, `TrackInfo`,
//! `Exception`) live in [`crate::http`], since they're shared with the
//! `loadtracks` REST response.

pub use self::{incoming::IncomingEvent, outgoing::OutgoingEvent};

pub mod outgoing {
    //! Events that clients send to Lavalink.
    use serde::{Deserialize, Serialize};
    use twilight_model::id::{marker::GuildMarker, Id};

    /// An outgoing event to send to Lavalink.
    ///
    /// Every variant serializes with an `op` field naming itself (e.g.
    /// `{"op":"play",...}`), matching the websocket protocol's op-tagged
    /// frames.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(tag = "op", rename_all = "camelCase")]
    pub enum OutgoingEvent {
        /// Destroy a player for a guild.
        Destroy(Destroy),
        /// Equalize a player.
        Equalizer(Equalizer),
        /// Pause or unpause a player.
        Pause(Pause),
        /// Play a track.
        Play(Play),
        /// Seek a player's active track to a new position.
        Seek(Seek),
        /// Stop a player.
        Stop(Stop),
        /// A combined voice server and voice state update.
        VoiceUpdate(VoiceUpdate),
        /// Set the volume of a player.
        Volume(Volume),
    }

    impl From<Destroy> for OutgoingEvent {
        fn from(event: Destroy) -> OutgoingEvent {
            Self::Destroy(event)
        }
    }

    impl From<Equalizer> for OutgoingEvent {
        fn from(event: Equalizer) -> OutgoingEvent {
            Self::Equalizer(event)
        }
    }

    impl From<Pause> for OutgoingEvent {
        fn from(event: Pause) -> OutgoingEvent {
            Self::Pause(event)
        }
    }

    impl From<Play> for OutgoingEvent {
        fn from(event: Play) -> OutgoingEvent {
            Self::Play(event)
        }
    }

    impl From<Seek> for OutgoingEvent {
        fn from(event: Seek) -> OutgoingEvent {
            Self::Seek(event)
        }
    }

    impl From<Stop> for OutgoingEvent {
        fn from(event: Stop) -> OutgoingEvent {
            Self::Stop(event)
        }
    }

    impl From<VoiceUpdate> for OutgoingEvent {
        fn from(event: VoiceUpdate) -> OutgoingEvent {
            Self::VoiceUpdate(event)
        }
    }

    impl From<Volume> for OutgoingEvent {
        fn from(event: Volume) -> OutgoingEvent {
            Self::Volume(event)
        }
    }

    /// Destroy a player on a node, releasing its worker-side voice session.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Destroy {
        /// The guild ID of the player.
        pub guild_id: Id<GuildMarker>,
    }

    impl Destroy {
        /// Create a new destroy event.
        pub const fn new(guild_id: Id<GuildMarker>) -> Self {
            Self { guild_id }
        }
    }

    impl From<Id<GuildMarker>> for Destroy {
        fn from(guild_id: Id<GuildMarker>) -> Self {
            Self { guild_id }
        }
    }

    /// Equalize a player.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Equalizer {
        /// The guild ID of the player.
        pub guild_id: Id<GuildMarker>,
        /// The bands to use as part of the equalizer.
        pub bands: Vec<EqualizerBand>,
    }

    impl Equalizer {
        /// Create a new equalizer event.
        pub fn new(guild_id: Id<GuildMarker>, bands: Vec<EqualizerBand>) -> Self {
            Self::from((guild_id, bands))
        }
    }

    impl From<(Id<GuildMarker>, Vec<EqualizerBand>)> for Equalizer {
        fn from((guild_id, bands): (Id<GuildMarker>, Vec<EqualizerBand>)) -> Self {
            Self { guild_id, bands }
        }
    }

    /// A band of the equalizer event.
    ///
    /// `band` is restricted to `0..=14`, `gain` to `-0.25..=1.0`; see
    /// [`crate::player::Player::set_eq`] for the clamping performed before a
    /// frame is ever constructed.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct EqualizerBand {
        /// The band, `0..=14`.
        pub band: i64,
        /// The gain, `-0.25..=1.0`.
        pub gain: f64,
    }

    impl EqualizerBand {
        /// Create a new equalizer band.
        pub fn new(band: i64, gain: f64) -> Self {
            Self::from((band, gain))
        }
    }

    impl From<(i64, f64)> for EqualizerBand {
        fn from((band, gain): (i64, f64)) -> Self {
            Self { band, gain }
        }
    }

    /// Pause or unpause a player.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Pause {
        /// The guild ID of the player.
        pub guild_id: Id<GuildMarker>,
        /// Whether to pause the player.
        ///
        /// Set to `true` to pause or `false` to resume.
        pub pause: bool,
    }

    impl Pause {
        /// Create a new pause event.
        ///
        /// Set to `true` to pause the player or `false` to resume it.
        pub fn new(guild_id: Id<GuildMarker>, pause: bool) -> Self {
            Self::from((guild_id, pause))
        }
    }

    impl From<(Id<GuildMarker>, bool)> for Pause {
        fn from((guild_id, pause): (Id<GuildMarker>, bool)) -> Self {
            Self { guild_id, pause }
        }
    }

    /// Play a track, optionally starting at a given position and without
    /// replacing a currently-playing track.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Play {
        /// The guild ID of the player.
        pub guild_id: Id<GuildMarker>,
        /// The base64 encoded track to play, exactly as returned by
        /// `loadtracks`.
        pub track: String,
        /// The position in milliseconds to start the track from.
        pub start_time: u64,
        /// Whether to keep playing the current track rather than replace it
        /// with this one.
        pub no_replace: bool,
    }

    impl Play {
        /// Create a new play event.
        pub fn new(
            guild_id: Id<GuildMarker>,
            track: impl Into<String>,
            start_time: u64,
            no_replace: bool,
        ) -> Self {
            Self::from((guild_id, track, start_time, no_replace))
        }
    }

    impl<T: Into<String>> From<(Id<GuildMarker>, T, u64, bool)> for Play {
        fn from((guild_id, track, start_time, no_replace): (Id<GuildMarker>, T, u64, bool)) -> Self {
            Self {
                guild_id,
                track: track.into(),
                start_time,
                no_replace,
            }
        }
    }

    /// Seek a player's active track to a new position.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Seek {
        /// The guild ID of the player.
        pub guild_id: Id<GuildMarker>,
        /// The position in milliseconds to seek to.
        pub position: i64,
    }

    impl Seek {
        /// Create a new seek event.
        pub fn new(guild_id: Id<GuildMarker>, position: i64) -> Self {
            Self::from((guild_id, position))
        }
    }

    impl From<(Id<GuildMarker>, i64)> for Seek {
        fn from((guild_id, position): (Id<GuildMarker>, i64)) -> Self {
            Self { guild_id, position }
        }
    }

    /// Stop a player.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Stop {
        /// The guild ID of the player.
        pub guild_id: Id<GuildMarker>,
    }

    impl Stop {
        /// Create a new stop event.
        pub const fn new(guild_id: Id<GuildMarker>) -> Self {
            Self { guild_id }
        }
    }

    impl From<Id<GuildMarker>> for Stop {
        fn from(guild_id: Id<GuildMarker>) -> Self {
            Self { guild_id }
        }
    }

    /// A combined voice server and voice state update.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct VoiceUpdate {
        /// The guild ID of the player.
        pub guild_id: Id<GuildMarker>,
        /// The Discord voice session id.
        pub session_id: String,
        /// The Discord voice event, carrying the token and endpoint.
        pub event: VoiceServerEvent,
    }

    /// The embedded voice-server-update half of a [`VoiceUpdate`].
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct VoiceServerEvent {
        /// The Discord voice token to authenticate with.
        pub token: String,
        /// The Discord voice endpoint to connect to.
        pub endpoint: String,
        /// The guild ID this event is for.
        #[serde(rename = "guild_id")]
        pub guild_id: Id<GuildMarker>,
    }

    impl VoiceUpdate {
        /// Create a new voice update event.
        pub fn new(
            guild_id: Id<GuildMarker>,
            session_id: impl Into<String>,
            token: impl Into<String>,
            endpoint: impl Into<String>,
        ) -> Self {
            Self {
                guild_id,
                session_id: session_id.into(),
                event: VoiceServerEvent {
                    token: token.into(),
                    endpoint: endpoint.into(),
                    guild_id,
                },
            }
        }
    }

    /// Set the volume of a player.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Volume {
        /// The guild ID of the player.
        pub guild_id: Id<GuildMarker>,
        /// The volume of the player from 0 to 150. 100 is the default.
        pub volume: i64,
    }

    impl Volume {
        /// Create a new volume event.
        pub fn new(guild_id: Id<GuildMarker>, volume: i64) -> Self {
            Self::from((guild_id, volume))
        }
    }

    impl From<(Id<GuildMarker>, i64)> for Volume {
        fn from((guild_id, volume): (Id<GuildMarker>, i64)) -> Self {
            Self { guild_id, volume }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::{
            Destroy, Equalizer, EqualizerBand, OutgoingEvent, Pause, Play, Seek, Stop, VoiceUpdate,
            Volume,
        };
        use serde_test::Token;
        use twilight_model::id::Id;

        #[test]
        fn destroy() {
            let event = OutgoingEvent::from(Destroy::new(Id::new(1)));

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "OutgoingEvent",
                        len: 2,
                    },
                    Token::Str("op"),
                    Token::Str("destroy"),
                    Token::Str("guildId"),
                    Token::Str("1"),
                    Token::StructEnd,
                ],
            );
        }

        #[test]
        fn play() {
            let event = OutgoingEvent::from(Play::new(Id::new(1), "aaaaaaa", 0, false));

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "OutgoingEvent",
                        len: 5,
                    },
                    Token::Str("op"),
                    Token::Str("play"),
                    Token::Str("guildId"),
                    Token::Str("1"),
                    Token::Str("track"),
                    Token::Str("aaaaaaa"),
                    Token::Str("startTime"),
                    Token::U64(0),
                    Token::Str("noReplace"),
                    Token::Bool(false),
                    Token::StructEnd,
                ],
            );
        }

        #[test]
        fn pause() {
            let event = OutgoingEvent::from(Pause::new(Id::new(2), true));

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "OutgoingEvent",
                        len: 3,
                    },
                    Token::Str("op"),
                    Token::Str("pause"),
                    Token::Str("guildId"),
                    Token::Str("2"),
                    Token::Str("pause"),
                    Token::Bool(true),
                    Token::StructEnd,
                ],
            );
        }

        #[test]
        fn stop() {
            let event = OutgoingEvent::from(Stop::new(Id::new(3)));

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "OutgoingEvent",
                        len: 2,
                    },
                    Token::Str("op"),
                    Token::Str("stop"),
                    Token::Str("guildId"),
                    Token::Str("3"),
                    Token::StructEnd,
                ],
            );
        }

        #[test]
        fn seek() {
            let event = OutgoingEvent::from(Seek::new(Id::new(4), 1000));

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "OutgoingEvent",
                        len: 3,
                    },
                    Token::Str("op"),
                    Token::Str("seek"),
                    Token::Str("guildId"),
                    Token::Str("4"),
                    Token::Str("position"),
                    Token::I64(1000),
                    Token::StructEnd,
                ],
            );
        }

        #[test]
        fn volume() {
            let event = OutgoingEvent::from(Volume::new(Id::new(5), 80));

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "OutgoingEvent",
                        len: 3,
                    },
                    Token::Str("op"),
                    Token::Str("volume"),
                    Token::Str("guildId"),
                    Token::Str("5"),
                    Token::Str("volume"),
                    Token::I64(80),
                    Token::StructEnd,
                ],
            );
        }

        #[test]
        fn equalizer() {
            let event = OutgoingEvent::from(Equalizer::new(
                Id::new(6),
                vec![EqualizerBand::new(0, 0.25)],
            ));

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "OutgoingEvent",
                        len: 3,
                    },
                    Token::Str("op"),
                    Token::Str("equalizer"),
                    Token::Str("guildId"),
                    Token::Str("6"),
                    Token::Str("bands"),
                    Token::Seq { len: Some(1) },
                    Token::Struct {
                        name: "EqualizerBand",
                        len: 2,
                    },
                    Token::Str("band"),
                    Token::I64(0),
                    Token::Str("gain"),
                    Token::F64(0.25),
                    Token::StructEnd,
                    Token::SeqEnd,
                    Token::StructEnd,
                ],
            );
        }

        #[test]
        fn voice_update() {
            let event = OutgoingEvent::from(VoiceUpdate::new(Id::new(7), "session", "token", "wss://host"));

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "OutgoingEvent",
                        len: 4,
                    },
                    Token::Str("op"),
                    Token::Str("voiceUpdate"),
                    Token::Str("guildId"),
                    Token::Str("7"),
                    Token::Str("sessionId"),
                    Token::Str("session"),
                    Token::Str("event"),
                    Token::Struct {
                        name: "VoiceServerEvent",
                        len: 3,
                    },
                    Token::Str("token"),
                    Token::Str("token"),
                    Token::Str("endpoint"),
                    Token::Str("wss://host"),
                    Token::Str("guild_id"),
                    Token::Str("7"),
                    Token::StructEnd,
                    Token::StructEnd,
                ],
            );
        }
    }
}

pub mod incoming {
    //! Events that Lavalink sends to clients.

    use crate::http::{Exception, Track};
    use serde::{Deserialize, Serialize};
    use twilight_model::id::{marker::GuildMarker, Id};

    /// An incoming event from a Lavalink node.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(tag = "op", rename_all = "camelCase")]
    pub enum IncomingEvent {
        /// Dispatched when you successfully connect to the Lavalink node.
        Ready(Ready),
        /// An update about the information of a player.
        PlayerUpdate(PlayerUpdate),
        /// New statistics about a node and its host.
        Stats(Stats),
        /// Dispatched when player or voice events occur.
        Event(Event),
    }

    impl From<Ready> for IncomingEvent {
        fn from(event: Ready) -> IncomingEvent {
            Self::Ready(event)
        }
    }

    impl From<Event> for IncomingEvent {
        fn from(event: Event) -> IncomingEvent {
            Self::Event(event)
        }
    }

    impl From<PlayerUpdate> for IncomingEvent {
        fn from(event: PlayerUpdate) -> IncomingEvent {
            Self::PlayerUpdate(event)
        }
    }

    impl From<Stats> for IncomingEvent {
        fn from(event: Stats) -> IncomingEvent {
            Self::Stats(event)
        }
    }

    /// Dispatched by Lavalink upon successful connection and authorization.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Ready {
        /// Whether this session was resumed.
        pub resumed: bool,
        /// The Lavalink session id of this connection. Not to be confused
        /// with a Discord voice session id.
        pub session_id: String,
    }

    /// An update about the information of a player.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct PlayerUpdate {
        /// The guild ID of the player.
        #[serde(rename = "guildId")]
        pub guild_id: Id<GuildMarker>,
        /// The new state of the player.
        pub state: PlayerUpdateState,
    }

    /// The state carried by a [`PlayerUpdate`].
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct PlayerUpdateState {
        /// Unix timestamp of the update in milliseconds.
        pub time: i64,
        /// Track position in milliseconds. Absent when nothing is playing.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub position: Option<i64>,
    }

    /// Statistics about a node and its host.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub struct Stats {
        /// The current number of total players (active and not active)
        /// within the node.
        pub players: u64,
        /// The current number of active players within the node.
        pub playing_players: u64,
        /// The uptime of the Lavalink server in milliseconds.
        pub uptime: u64,
        /// Memory information about the node's host.
        pub memory: StatsMemory,
        /// CPU information about the node's host.
        pub cpu: StatsCpu,
        /// Statistics about audio frames, present only when the node has
        /// been playing audio.
        #[serde(default, rename = "frameStats", skip_serializing_if = "Option::is_none")]
        pub frame_stats: Option<StatsFrames>,
    }

    /// Memory information about a node and its host.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct StatsMemory {
        /// The number of bytes free.
        pub free: u64,
        /// The number of bytes used.
        pub used: u64,
        /// The number of bytes allocated.
        pub allocated: u64,
        /// The number of bytes reservable.
        pub reservable: u64,
    }

    /// CPU information about a node and its host.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct StatsCpu {
        /// The number of CPU cores.
        pub cores: u32,
        /// The load of the system as a whole, `0.0..=1.0`.
        #[serde(rename = "systemLoad")]
        pub system_load: f64,
        /// The load attributable to the Lavalink server, `0.0..=1.0`.
        #[serde(rename = "lavalinkLoad")]
        pub lavalink_load: f64,
    }

    /// Per-minute audio frame statistics about a node.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct StatsFrames {
        /// Average frames sent per minute.
        pub sent: i64,
        /// Average frames nulled (silence inserted) per minute.
        pub nulled: i64,
        /// Average frames short of the expected per-minute count.
        pub deficit: i64,
    }

    /// Server dispatched an event. See the variants of [`EventData`] for more
    /// information.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct Event {
        /// The guild id that this was received from.
        #[serde(rename = "guildId")]
        pub guild_id: String,
        /// The type of event and its accompanying data.
        #[serde(flatten)]
        pub data: EventData,
    }

    /// The data carried by a dispatched [`Event`], tagged by its `type`
    /// field.
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(tag = "type")]
    pub enum EventData {
        /// Dispatched when a track starts playing.
        TrackStartEvent(TrackStart),
        /// Dispatched when a track ends.
        TrackEndEvent(TrackEnd),
        /// Dispatched when a track throws an exception.
        TrackExceptionEvent(TrackException),
        /// Dispatched when a track gets stuck while playing.
        TrackStuckEvent(TrackStuck),
        /// Dispatched when the websocket connection to Discord voice servers
        /// is closed.
        WebSocketClosedEvent(WebSocketClosed),
    }

    /// The reason for the track ending.
    #[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    pub enum TrackEndReason {
        /// The track finished playing.
        Finished,
        /// The track failed to load.
        LoadFailed,
        /// The track was stopped.
        Stopped,
        /// The track was replaced.
        Replaced,
        /// The track was cleaned up.
        Cleanup,
    }

    /// A track started.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct TrackStart {
        /// The track that started playing.
        pub track: Track,
    }

    /// A track ended event from Lavalink.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct TrackEnd {
        /// The track that ended playing.
        pub track: Track,
        /// The reason that the track ended.
        pub reason: TrackEndReason,
    }

    /// Dispatched when a track throws an exception.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct TrackException {
        /// The track that threw the exception.
        pub track: Track,
        /// The occurred exception.
        pub exception: Exception,
    }

    /// Dispatched when a track gets stuck while playing.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct TrackStuck {
        /// The track that got stuck.
        pub track: Track,
        /// The threshold in milliseconds that was exceeded.
        #[serde(rename = "thresholdMs")]
        pub threshold_ms: u64,
    }

    /// The voice websocket connection to Discord has been closed.
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[non_exhaustive]
    pub struct WebSocketClosed {
        /// [Discord websocket opcode] that closed the connection.
        ///
        /// [Discord websocket opcode]: https://discord.com/developers/docs/topics/opcodes-and-status-codes#voice-voice-close-event-codes
        pub code: u32,
        /// Reason the connection was closed.
        pub reason: String,
        /// True if Discord closed the connection, false if Lavalink closed
        /// it.
        #[serde(rename = "byRemote")]
        pub by_remote: bool,
    }

    #[cfg(test)]
    mod tests {
        use super::{IncomingEvent, Ready};
        use serde_test::Token;

        #[test]
        fn ready() {
            let event = IncomingEvent::from(Ready {
                resumed: false,
                session_id: "abc123".to_owned(),
            });

            serde_test::assert_tokens(
                &event,
                &[
                    Token::Struct {
                        name: "IncomingEvent",
                        len: 3,
                    },
                    Token::Str("op"),
                    Token::Str("ready"),
                    Token::Str("resumed"),
                    Token::Bool(false),
                    Token::Str("sessionId"),
                    Token::Str("abc123"),
                    Token::StructEnd,
                ],
            );
        }
    }
}

pub use self::{
    incoming::{
        Event, EventData, IncomingEvent, PlayerUpdate, PlayerUpdateState, Ready, Stats, StatsCpu,
        StatsFrames, StatsMemory, TrackEnd, TrackEndReason, TrackException, TrackStart,
        TrackStuck, WebSocketClosed,
    },
    outgoing::{
        Destroy, Equalizer, EqualizerBand, OutgoingEvent, Pause, Play, Seek, Stop, VoiceServerEvent,
        VoiceUpdate, Volume,
    },
};
