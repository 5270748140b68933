//! A client for managing Lavalink nodes, voice-gateway choreography, and
//! players, for the Twilight ecosystem.
//!
//! The embedding bot never talks to a Lavalink node directly. It asks a
//! [`Client`] for the [`Link`] belonging to a guild, forwards every raw
//! voice-gateway event it receives to [`Client::on_socket_response`], and
//! issues player commands (play, pause, seek, volume, equalizer) through
//! [`Link::player`]. The client opaquely picks which node services each
//! guild, re-homing guilds onto a surviving node if their node disconnects.
//!
//! The three subsystems doing the real work:
//!
//! - [`node`]: a node's websocket session — handshake, receive loop,
//!   keep-alive, reconnect with backoff, REST track lookup.
//! - [`link`]: the per-guild state machine that correlates a voice-server
//!   credentials message with a voice-state session message into a single
//!   combined message forwarded to the assigned node.
//! - [`balancer`]: penalty-weighted node selection and the migration
//!   protocol run when a node disconnects.
//!
//! # Example
//!
//! ```no_run
//! use lavalink_client::{client::GatewaySender, Client};
//! use std::sync::Arc;
//! use twilight_model::id::Id;
//!
//! # #[derive(Debug)]
//! # struct MySender;
//! # impl GatewaySender for MySender {
//! #     fn send(
//! #         &self,
//! #         _guild_id: twilight_model::id::Id<twilight_model::id::marker::GuildMarker>,
//! #         _payload: twilight_model::gateway::payload::outgoing::update_voice_state::UpdateVoiceState,
//! #     ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! #         Ok(())
//! #     }
//! # }
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(Id::new(1), 1, Arc::new(MySender));
//! client.add_node("primary", "ws://localhost:2333", "http://localhost:2333", "youshallnotpass").await?;
//!
//! let link = client.get_link(Id::new(2));
//! let tracks = link.search_youtube("never gonna give you up").await?;
//! if let Some(track) = tracks.into_iter().next() {
//!     link.player().play(track, 0, true).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod balancer;
pub mod client;
pub mod error;
pub mod http;
pub mod link;
pub mod model;
pub mod node;
pub mod player;
pub mod track;

pub use self::{
    client::Client,
    error::{IllegalAction, NoNodesAvailable, NodeError, PlayerCommandError, RestError, TrackLookupError},
    link::{Link, LinkState},
    node::Node,
    player::{BassMode, Player, PlayerEvent, PlayerEventAdapter},
    track::{AudioTrack, AudioTrackPlaylist, LoadType},
};
