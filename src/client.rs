//! The registry of nodes and links the embedding bot talks to.

use crate::{
    balancer,
    error::{GatewaySendError, IllegalAction, IllegalActionType, NodeError, NoNodesAvailable},
    link::Link,
    node::{Node, NodeConfig},
    player::PlayerEventAdapter,
};
use dashmap::DashMap;
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, RwLock as StdRwLock},
};
use twilight_model::{
    gateway::{event::Event, payload::outgoing::update_voice_state::UpdateVoiceState},
    id::{
        marker::{ChannelMarker, GuildMarker, UserMarker},
        Id,
    },
};

/// Sends voice-state-update payloads back to the chat platform on behalf of
/// the core.
///
/// Implemented by the embedder over whatever shard/session abstraction it
/// uses, e.g. a `twilight-gateway` `Shard`'s command sender.
pub trait GatewaySender: Debug + Send + Sync {
    /// Send a voice-state-update command for the given guild.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder's sender rejects the payload, e.g.
    /// because the gateway session is no longer connected.
    fn send(
        &self,
        guild_id: Id<GuildMarker>,
        payload: UpdateVoiceState,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub(crate) struct ClientRef {
    pub(crate) nodes: DashMap<Box<str>, Node>,
    pub(crate) links: DashMap<Id<GuildMarker>, Link>,
    user_id: Id<UserMarker>,
    shard_count: u64,
    gateway: Arc<dyn GatewaySender>,
    default_event_adapter: StdRwLock<Option<Arc<dyn PlayerEventAdapter>>>,
}

/// Entry point for the embedding bot: owns every [`Node`] and [`Link`] and
/// routes voice-gateway traffic between them.
///
/// Cloning a `Client` is cheap and shares the same underlying registry.
#[derive(Clone)]
pub struct Client(pub(crate) Arc<ClientRef>);

impl Debug for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Client")
            .field("nodes", &self.0.nodes.len())
            .field("links", &self.0.links.len())
            .field("user_id", &self.0.user_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client for a bot with the given user ID and shard count,
    /// sending gateway commands through `gateway`.
    pub fn new(user_id: Id<UserMarker>, shard_count: u64, gateway: Arc<dyn GatewaySender>) -> Self {
        Self(Arc::new(ClientRef {
            nodes: DashMap::new(),
            links: DashMap::new(),
            user_id,
            shard_count,
            gateway,
            default_event_adapter: StdRwLock::new(None),
        }))
    }

    pub(crate) fn from_arc(inner: Arc<ClientRef>) -> Self {
        Self(inner)
    }

    /// The bot's user ID, as configured at construction.
    pub const fn user_id(&self) -> Id<UserMarker> {
        self.0.user_id
    }

    /// The bot's total shard count, as configured at construction.
    pub const fn shard_count(&self) -> u64 {
        self.0.shard_count
    }

    /// Set the event adapter newly created [`Player`]s start with.
    ///
    /// Doesn't affect players that already exist; use
    /// [`Player::set_event_adapter`] for those.
    ///
    /// [`Player`]: crate::player::Player
    /// [`Player::set_event_adapter`]: crate::player::Player::set_event_adapter
    pub fn set_default_event_adapter(&self, adapter: Option<Arc<dyn PlayerEventAdapter>>) {
        *self
            .0
            .default_event_adapter
            .write()
            .expect("default event adapter lock poisoned") = adapter;
    }

    pub(crate) fn default_event_adapter(&self) -> Option<Arc<dyn PlayerEventAdapter>> {
        self.0
            .default_event_adapter
            .read()
            .expect("default event adapter lock poisoned")
            .clone()
    }

    /// Register a node and begin connecting to it.
    ///
    /// The returned future resolves once the handshake completes; dialing
    /// retries transport failures with backoff, but fails immediately if the
    /// node rejects the configured `authorization`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError`] if the node rejects the handshake's
    /// authorization.
    pub async fn add_node(
        &self,
        name: impl Into<Box<str>>,
        address: impl Into<String>,
        rest_address: impl Into<String>,
        authorization: impl Into<String>,
    ) -> Result<Node, NodeError> {
        let name = name.into();
        let config = NodeConfig {
            address: address.into(),
            rest_address: rest_address.into(),
            authorization: authorization.into(),
            user_id: self.0.user_id,
            shard_count: self.0.shard_count,
        };

        let node = Node::connect(name.clone(), config, Arc::downgrade(&self.0)).await?;
        self.0.nodes.insert(name, node.clone());
        Ok(node)
    }

    /// Unregister a node, gracefully closing its connection.
    ///
    /// Links it was servicing are migrated by the usual disconnect-handling
    /// path, as if the node had dropped on its own.
    pub async fn remove_node(&self, name: &str) -> Option<Node> {
        let (_, node) = self.0.nodes.remove(name)?;
        node.disconnect().await;
        Some(node)
    }

    /// Get the link for a guild, creating it if this is the first time it's
    /// been requested.
    pub fn get_link(&self, guild_id: Id<GuildMarker>) -> Link {
        if let Some(link) = self.0.links.get(&guild_id) {
            return link.clone();
        }

        let link = Link::new(guild_id, Arc::downgrade(&self.0));
        self.0.links.insert(guild_id, link.clone());
        link
    }

    pub(crate) fn link(&self, guild_id: Id<GuildMarker>) -> Option<Link> {
        self.0.links.get(&guild_id).map(|kv| kv.value().clone())
    }

    pub(crate) fn nodes(&self) -> Vec<Node> {
        self.0.nodes.iter().map(|kv| kv.value().clone()).collect()
    }

    pub(crate) fn links(&self) -> Vec<Link> {
        self.0.links.iter().map(|kv| kv.value().clone()).collect()
    }

    /// Ask the load balancer for the node with the lowest penalty.
    ///
    /// # Errors
    ///
    /// Returns [`NoNodesAvailable`] if no node is registered, or none of the
    /// registered nodes are available.
    pub async fn get_best_node(&self) -> Result<Node, NoNodesAvailable> {
        balancer::determine_best_node(self).await
    }

    /// Feed a raw chat-gateway event to the client.
    ///
    /// Only voice-server-update and voice-state-update events are acted on;
    /// everything else is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction`] if the event names a guild that has no
    /// link, i.e. [`Client::get_link`] was never called for it.
    pub async fn on_socket_response(&self, event: &Event) -> Result<(), IllegalAction> {
        match event {
            Event::VoiceServerUpdate(update) => {
                let link = self.link(update.guild_id).ok_or_else(|| {
                    IllegalAction::new(IllegalActionType::UnknownGuild {
                        guild_id: update.guild_id,
                    })
                })?;

                link.handle_voice_server_update(update.token.clone(), update.endpoint.clone())
                    .await
            }
            Event::VoiceStateUpdate(update) => {
                let Some(guild_id) = update.0.guild_id else {
                    return Ok(());
                };

                let Some(link) = self.link(guild_id) else {
                    return Ok(());
                };

                link.handle_voice_state_update(
                    update.0.user_id,
                    update.0.session_id.clone(),
                    update.0.channel_id,
                )
                .await
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn send_gateway(
        &self,
        guild_id: Id<GuildMarker>,
        channel_id: Option<Id<ChannelMarker>>,
    ) -> Result<(), GatewaySendError> {
        let payload = UpdateVoiceState::new(guild_id, channel_id, false, false);
        self.0
            .gateway
            .send(guild_id, payload)
            .map_err(GatewaySendError::new)
    }

    /// The number of actively playing players per node name.
    pub fn playing_guilds(&self) -> HashMap<String, u64> {
        self.0
            .nodes
            .iter()
            .map(|entry| {
                let playing = entry
                    .value()
                    .stats()
                    .map_or(0, |stats| stats.playing_players);

                (entry.key().to_string(), playing)
            })
            .collect()
    }

    /// The total number of actively playing players across every node.
    pub fn total_playing_guilds(&self) -> u64 {
        self.playing_guilds().into_values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::Client;
    use static_assertions::assert_impl_all;
    use std::fmt::Debug;

    assert_impl_all!(Client: Clone, Debug, Send, Sync);
}
