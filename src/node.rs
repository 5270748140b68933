//! A single node's websocket session: handshake, receive loop, keep-alive,
//! reconnect, and outbound sends.

pub mod stats {
    //! Parsed `stats` frames and the fields penalty scoring reads.

    use crate::model::incoming::Stats as StatsFrame;

    /// A snapshot of a node and its host, parsed from the periodic `stats`
    /// frame.
    ///
    /// The three `avg_frame_*` fields are `-1` when the node hasn't sent
    /// frame statistics yet (it only does so once it has players).
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    #[non_exhaustive]
    pub struct NodeStats {
        /// Total number of players, active or not.
        pub players: u64,
        /// Number of actively playing players.
        pub playing_players: u64,
        /// Node uptime in milliseconds.
        pub uptime: u64,
        /// Free memory in bytes.
        pub memory_free: u64,
        /// Used memory in bytes.
        pub memory_used: u64,
        /// Allocated memory in bytes.
        pub memory_allocated: u64,
        /// Reservable memory in bytes.
        pub memory_reservable: u64,
        /// Number of CPU cores.
        pub cpu_cores: u32,
        /// System-wide load, `0.0..=1.0`.
        pub system_load: f64,
        /// Load attributable to the node itself, `0.0..=1.0`.
        pub lavalink_load: f64,
        /// Average frames sent per minute, or `-1` if unknown.
        pub avg_frame_sent: i64,
        /// Average frames nulled per minute, or `-1` if unknown.
        pub avg_frame_nulled: i64,
        /// Average frames short of expected per minute, or `-1` if unknown.
        pub avg_frame_deficit: i64,
    }

    impl From<StatsFrame> for NodeStats {
        fn from(stats: StatsFrame) -> Self {
            let (avg_frame_sent, avg_frame_nulled, avg_frame_deficit) = stats
                .frame_stats
                .map(|frames| (frames.sent, frames.nulled, frames.deficit))
                .unwrap_or((-1, -1, -1));

            Self {
                players: stats.players,
                playing_players: stats.playing_players,
                uptime: stats.uptime,
                memory_free: stats.memory.free,
                memory_used: stats.memory.used,
                memory_allocated: stats.memory.allocated,
                memory_reservable: stats.memory.reservable,
                cpu_cores: stats.cpu.cores,
                system_load: stats.cpu.system_load,
                lavalink_load: stats.cpu.lavalink_load,
                avg_frame_sent,
                avg_frame_nulled,
                avg_frame_deficit,
            }
        }
    }
}

use self::stats::NodeStats;
use crate::{
    balancer,
    client::{Client, ClientRef},
    error::{NodeError, NodeErrorType, RestError},
    http::RestClient,
    model::{incoming::EventData, IncomingEvent, OutgoingEvent},
    track::AudioTrackPlaylist,
};
use dashmap::DashSet;
use futures_util::{SinkExt, StreamExt};
use http::{
    header::{HeaderName, HeaderValue},
    Request,
};
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex as StdMutex, Weak,
    },
    time::Duration,
};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_websockets::{ClientBuilder, Message};
use twilight_model::id::{
    marker::{GuildMarker, UserMarker},
    Id,
};

/// Configuration for dialing and authenticating with a node.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct NodeConfig {
    /// The node's websocket URI, e.g. `ws://localhost:2333`.
    pub address: String,
    /// The node's REST base URI, e.g. `http://localhost:2333`.
    pub rest_address: String,
    /// The shared secret configured on the node.
    pub authorization: String,
    /// The bot's user ID, sent as the `User-Id` handshake header.
    pub user_id: Id<UserMarker>,
    /// The bot's total shard count, sent as the `Num-Shards` handshake
    /// header.
    pub shard_count: u64,
}

/// A command handed to the writer task: either an outgoing frame to
/// serialize and send, or a raw websocket ping for the keep-alive task.
#[derive(Debug)]
enum WriterCommand {
    Event(OutgoingEvent),
    Ping,
}

#[derive(Default)]
struct NodeState {
    sender: Option<UnboundedSender<WriterCommand>>,
    stats: Option<NodeStats>,
}

pub(crate) struct NodeRef {
    name: Box<str>,
    config: NodeConfig,
    client: Weak<ClientRef>,
    rest: RestClient,
    guild_ids: DashSet<Id<GuildMarker>>,
    available: AtomicBool,
    closing: AtomicBool,
    state: StdMutex<NodeState>,
}

/// A cheap-clone handle to a node's connection and metadata.
///
/// Cloning shares the underlying session; dropping the last clone does not
/// close the connection, only removing it from a [`Client`] does.
#[derive(Clone)]
pub struct Node(pub(crate) Arc<NodeRef>);

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Node")
            .field("name", &self.0.name)
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}

impl Node {
    /// Dial and authenticate with a node, retrying transport failures with
    /// unbounded exponential backoff but failing immediately if the node
    /// rejects the configured authorization.
    pub(crate) async fn connect(
        name: impl Into<Box<str>>,
        config: NodeConfig,
        client: Weak<ClientRef>,
    ) -> Result<Self, NodeError> {
        let name = name.into();
        let rest = RestClient::new(config.rest_address.clone(), config.authorization.clone());

        let node = Self(Arc::new(NodeRef {
            name,
            config,
            client,
            rest,
            guild_ids: DashSet::new(),
            available: AtomicBool::new(false),
            closing: AtomicBool::new(false),
            state: StdMutex::new(NodeState::default()),
        }));

        node.dial_with_backoff().await?;

        Ok(node)
    }

    async fn dial_with_backoff(&self) -> Result<(), NodeError> {
        let mut backoff = backoff::ExponentialBackoff {
            current_interval: Duration::from_secs(5),
            initial_interval: Duration::from_secs(5),
            multiplier: 2.0,
            max_interval: Duration::from_secs(5 * 60),
            max_elapsed_time: None,
            ..Default::default()
        };

        loop {
            match self.dial_once().await {
                Ok(()) => return Ok(()),
                Err(err) if matches!(err.kind(), NodeErrorType::Unauthorized) => {
                    tracing::error!("node `{}` rejected its credentials: {err}", self.0.name);
                    return Err(err);
                }
                Err(err) => {
                    let delay = backoff::backoff::Backoff::next_backoff(&mut backoff)
                        .unwrap_or(Duration::from_secs(300));
                    tracing::warn!(
                        "failed to connect to node `{}`, retrying in {delay:?}: {err}",
                        self.0.name
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn dial_once(&self) -> Result<(), NodeError> {
        let request = Request::builder()
            .uri(self.0.config.address.as_str())
            .header(
                HeaderName::from_static("authorization"),
                HeaderValue::from_str(&self.0.config.authorization)
                    .map_err(|source| NodeError::new(NodeErrorType::BuildingConnection, Box::new(source)))?,
            )
            .header(
                HeaderName::from_static("num-shards"),
                HeaderValue::from_str(&self.0.config.shard_count.to_string()).expect("ascii digits"),
            )
            .header(
                HeaderName::from_static("user-id"),
                HeaderValue::from_str(&self.0.config.user_id.to_string()).expect("ascii digits"),
            )
            .body(())
            .map_err(|source| NodeError::new(NodeErrorType::BuildingConnection, Box::new(source)))?;

        let (stream, response) = ClientBuilder::from_request(request)
            .connect()
            .await
            .map_err(|source| NodeError::new(NodeErrorType::Connecting, Box::new(source)))?;

        if response.status() == http::StatusCode::UNAUTHORIZED
            || response.status() == http::StatusCode::FORBIDDEN
        {
            return Err(NodeError::new(NodeErrorType::Unauthorized, None));
        }

        let (mut write, mut read) = stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<WriterCommand>();

        {
            let mut state = self.0.state.lock().expect("node state poisoned");
            state.sender = Some(tx);
        }

        self.0.available.store(true, Ordering::SeqCst);
        self.0.closing.store(false, Ordering::SeqCst);

        let writer_node = self.clone();
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                let message = match command {
                    WriterCommand::Event(event) => match serde_json::to_string(&event) {
                        Ok(payload) => Message::text(payload),
                        Err(source) => {
                            tracing::error!("failed to serialize outgoing event: {source}");
                            continue;
                        }
                    },
                    WriterCommand::Ping => Message::ping(Vec::new()),
                };

                if let Err(source) = write.send(message).await {
                    tracing::warn!("failed to write to node `{}`: {source}", writer_node.0.name);
                    break;
                }
            }
        });

        let keepalive_node = self.clone();
        tokio::spawn(async move {
            keepalive_node.keep_alive().await;
        });

        let receive_node = self.clone();
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(message) if message.is_text() => {
                        if let Some(text) = message.as_text() {
                            receive_node.handle_message(text).await;
                        }
                    }
                    Ok(_) => {}
                    Err(source) => {
                        tracing::warn!("node `{}` connection error: {source}", receive_node.0.name);
                        break;
                    }
                }
            }

            receive_node.on_close().await;
        });

        if let Some(client) = self.client() {
            balancer::on_node_connect(&client, self).await;
        }

        Ok(())
    }

    /// Sends a websocket ping every 3 seconds, independent of whatever ping
    /// interval the websocket library defaults to: the worker drops idle
    /// clients despite a nominal ping interval, so this keeps the connection
    /// alive on a tighter, known cadence. Returns (ending the task) once the
    /// connection closes, locally or otherwise.
    async fn keep_alive(&self) {
        let mut interval = tokio::time::interval(Duration::from_secs(3));

        loop {
            interval.tick().await;

            if self.0.closing.load(Ordering::SeqCst) {
                return;
            }

            if !self.is_available() {
                return;
            }

            let sender = self.0.state.lock().expect("node state poisoned").sender.clone();

            let Some(sender) = sender else {
                return;
            };

            if sender.send(WriterCommand::Ping).is_err() {
                tracing::warn!("failed to send keep-alive ping to node `{}`", self.0.name);
                return;
            }
        }
    }

    async fn handle_message(&self, text: &str) {
        tracing::trace!("received message from node `{}`: {text}", self.0.name);

        let event: IncomingEvent = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(source) => {
                tracing::warn!("failed to deserialize message from `{}`: {source}", self.0.name);
                return;
            }
        };

        let Some(client) = self.client() else { return };

        match event {
            IncomingEvent::Ready(ready) => {
                tracing::info!(
                    "node `{}` is ready (session {}, resumed: {})",
                    self.0.name,
                    ready.session_id,
                    ready.resumed
                );
            }
            IncomingEvent::Stats(stats) => {
                self.0
                    .state
                    .lock()
                    .expect("node state poisoned")
                    .stats = Some(NodeStats::from(stats));
            }
            IncomingEvent::PlayerUpdate(update) => {
                let guild_id = update.guild_id;

                if let Some(link) = client.0.links.get(&guild_id).map(|kv| kv.value().clone()) {
                    link.provide_state(update.state).await;
                }
            }
            IncomingEvent::Event(event) => {
                let Ok(guild_id) = event.guild_id.parse::<u64>() else { return };
                let guild_id = Id::new(guild_id);

                let Some(link) = client.0.links.get(&guild_id).map(|kv| kv.value().clone()) else {
                    return;
                };

                match event.data {
                    EventData::TrackStartEvent(_) => link.player_sync().handle_track_start().await,
                    EventData::TrackEndEvent(e) => link.player_sync().handle_track_end(e.reason).await,
                    EventData::TrackExceptionEvent(e) => {
                        link.player_sync().handle_track_exception(e.exception.cause).await;
                    }
                    EventData::TrackStuckEvent(e) => {
                        link.player_sync().handle_track_stuck(e.threshold_ms).await;
                    }
                    EventData::WebSocketClosedEvent(e) => {
                        tracing::warn!(
                            "voice websocket closed for guild {guild_id}: {} (code {}, by remote: {})",
                            e.reason,
                            e.code,
                            e.by_remote
                        );

                        if e.code == 4006 && e.by_remote {
                            link.destroy().await;
                        }
                    }
                }
            }
        }
    }

    async fn on_close(&self) {
        self.0.available.store(false, Ordering::SeqCst);
        self.0.state.lock().expect("node state poisoned").sender = None;

        let closing = self.0.closing.swap(false, Ordering::SeqCst);

        if closing {
            tracing::info!("connection to node `{}` closed gracefully", self.0.name);
        } else {
            tracing::warn!("connection to node `{}` closed unexpectedly", self.0.name);
        }

        if let Some(client) = self.client() {
            balancer::on_node_disconnect(&client, self).await;
        }

        if !closing {
            tracing::info!("attempting to reconnect to node `{}`", self.0.name);

            if let Err(source) = self.dial_with_backoff().await {
                tracing::error!("gave up reconnecting to node `{}`: {source}", self.0.name);
            }
        }
    }

    /// Gracefully close the node's connection.
    pub async fn disconnect(&self) {
        self.0.closing.store(true, Ordering::SeqCst);

        let sender = self.0.state.lock().expect("node state poisoned").sender.take();
        drop(sender);
    }

    /// Queue an outbound event to be sent on this node's connection, in
    /// submission order relative to other calls.
    pub fn send(&self, event: impl Into<OutgoingEvent>) -> Result<(), NodeError> {
        let state = self.0.state.lock().expect("node state poisoned");

        let Some(sender) = &state.sender else {
            return Err(NodeError::new(NodeErrorType::Unavailable, None));
        };

        sender
            .send(WriterCommand::Event(event.into()))
            .map_err(|source| NodeError::new(NodeErrorType::Sending, Box::new(source)))
    }

    /// Resolve tracks for a query against this node's `/v4/loadtracks`
    /// endpoint.
    pub async fn get_tracks(&self, query: impl Into<String>) -> Result<AudioTrackPlaylist, RestError> {
        let query = query.into();
        let response = self.0.rest.load_tracks(&query).await?;
        Ok(AudioTrackPlaylist::from_response(response))
    }

    /// The node's configured name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Whether the node's websocket connection is currently open.
    pub fn is_available(&self) -> bool {
        self.0.available.load(Ordering::SeqCst)
    }

    /// The node's most recently received stats snapshot, if any.
    pub fn stats(&self) -> Option<NodeStats> {
        self.0.state.lock().expect("node state poisoned").stats
    }

    /// The node's current penalty score; lower is preferred. Unavailable or
    /// stats-less nodes score `+∞`.
    pub fn penalty(&self) -> f64 {
        balancer::penalty::calculate(self.stats().as_ref(), self.is_available())
    }

    pub(crate) fn add_guild(&self, guild_id: Id<GuildMarker>) {
        self.0.guild_ids.insert(guild_id);
    }

    pub(crate) fn remove_guild(&self, guild_id: Id<GuildMarker>) {
        self.0.guild_ids.remove(&guild_id);
    }

    pub(crate) fn guild_ids(&self) -> Vec<Id<GuildMarker>> {
        self.0.guild_ids.iter().map(|entry| *entry).collect()
    }

    pub(crate) fn clear_guild_ids(&self) {
        self.0.guild_ids.clear();
    }

    fn client(&self) -> Option<Client> {
        self.0.client.upgrade().map(Client::from_arc)
    }
}

#[cfg(test)]
mod tests {
    use super::Node;
    use static_assertions::assert_impl_all;
    use std::fmt::Debug;

    assert_impl_all!(Node: Clone, Debug, Send, Sync);
}
