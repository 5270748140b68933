//! The per-guild state machine that correlates voice-gateway events and
//! owns a guild's [`Node`] assignment and [`Player`].

use crate::{
    balancer,
    client::{Client, ClientRef},
    error::{IllegalAction, IllegalActionType, TrackLookupError},
    model::outgoing::{Destroy, VoiceUpdate},
    node::Node,
    player::Player,
    track::AudioTrackPlaylist,
};
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Mutex as StdMutex, Weak},
    time::Duration,
};
use tokio::{sync::Mutex as AsyncMutex, time::Instant as TokioInstant};
use twilight_model::id::{
    marker::{ChannelMarker, GuildMarker, UserMarker},
    Id,
};

/// A link's position in its lifecycle.
///
/// Declaration order doubles as ordinal order for the
/// [`Link::set_state`] guard: once the current state's ordinal exceeds
/// [`Disconnecting`](LinkState::Disconnecting), the only legal destination
/// is [`Destroyed`](LinkState::Destroyed).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum LinkState {
    /// No voice session is established or being established.
    NotConnected,
    /// A gateway voice-state-update was requested and we're waiting for the
    /// combined voice update to be assembled and sent.
    Connecting,
    /// A combined voice update has been sent to a node.
    Connected,
    /// `disconnect` was called; the gateway voice session is being torn
    /// down.
    Disconnecting,
    /// `destroy` was called; cleanup is in progress.
    Destroying,
    /// Terminal. The link has been removed from its client and node.
    Destroyed,
}

impl LinkState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::NotConnected => "not connected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Destroying => "destroying",
            Self::Destroyed => "destroyed",
        }
    }
}

struct LinkInner {
    state: LinkState,
    last_voice_update: Option<VoiceUpdate>,
    session_id: Option<String>,
    channel_id: Option<Id<ChannelMarker>>,
    node: Option<Node>,
}

pub(crate) struct LinkRef {
    guild_id: Id<GuildMarker>,
    client: Weak<ClientRef>,
    inner: AsyncMutex<LinkInner>,
    player: StdMutex<Option<Player>>,
}

/// A cheap-clone handle to one guild's voice coordination state.
#[derive(Clone)]
pub struct Link(pub(crate) Arc<LinkRef>);

impl Debug for Link {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Link")
            .field("guild_id", &self.0.guild_id)
            .finish_non_exhaustive()
    }
}

impl Link {
    pub(crate) fn new(guild_id: Id<GuildMarker>, client: Weak<ClientRef>) -> Self {
        Self(Arc::new(LinkRef {
            guild_id,
            client,
            inner: AsyncMutex::new(LinkInner {
                state: LinkState::NotConnected,
                last_voice_update: None,
                session_id: None,
                channel_id: None,
                node: None,
            }),
            player: StdMutex::new(None),
        }))
    }

    /// The guild this link coordinates voice for.
    pub const fn guild_id(&self) -> Id<GuildMarker> {
        self.0.guild_id
    }

    /// The link's current lifecycle state.
    pub async fn state(&self) -> LinkState {
        self.0.inner.lock().await.state
    }

    /// The node this link is currently assigned to, without selecting one if
    /// absent.
    pub fn current_node(&self) -> Option<Node> {
        self.0
            .inner
            .try_lock()
            .ok()
            .and_then(|inner| inner.node.clone())
    }

    /// The link's player, lazily creating one on first access.
    pub fn player(&self) -> Player {
        self.player_sync()
    }

    pub(crate) fn player_sync(&self) -> Player {
        let mut guard = self.0.player.lock().expect("player lock poisoned");

        if let Some(player) = &*guard {
            return player.clone();
        }

        let default_adapter = self.client().and_then(|client| client.default_event_adapter());
        let player = Player::new(self.0.guild_id, Arc::downgrade(&self.0));
        player.set_event_adapter(default_adapter);
        *guard = Some(player.clone());
        player
    }

    fn client(&self) -> Option<Client> {
        self.0.client.upgrade().map(Client::from_arc)
    }

    fn set_state_locked(&self, inner: &mut LinkInner, new: LinkState) -> Result<(), IllegalAction> {
        if inner.state > LinkState::Disconnecting && new != LinkState::Destroyed {
            return Err(IllegalAction::new(IllegalActionType::IllegalStateTransition {
                from: inner.state.as_str(),
                to: new.as_str(),
            }));
        }

        inner.state = new;
        Ok(())
    }

    /// Route a voice-server-update's credentials to this link.
    ///
    /// Merges the endpoint and token with the most recently observed
    /// session id into a combined voice update, selects a node if one isn't
    /// already assigned, sends it, and transitions to [`LinkState::Connected`].
    pub(crate) async fn handle_voice_server_update(
        &self,
        token: String,
        endpoint: Option<String>,
    ) -> Result<(), IllegalAction> {
        let Some(endpoint) = endpoint else {
            tracing::debug!(
                "voice server update for guild {} carried no endpoint, ignoring",
                self.0.guild_id
            );
            return Ok(());
        };

        let mut inner = self.0.inner.lock().await;

        let session_id = inner.session_id.clone().unwrap_or_default();
        let update = VoiceUpdate::new(self.0.guild_id, session_id, token, endpoint);
        inner.last_voice_update = Some(update.clone());

        // If a node still needs to be selected, `ensure_node_locked` routes
        // through `change_node_locked`, which already replays
        // `last_voice_update` onto the newly chosen node. Sending it again
        // here would duplicate that frame, so only send explicitly when a
        // node was already assigned and nothing replayed it for us.
        let had_node = match &inner.node {
            Some(node) => node.is_available(),
            None => false,
        };

        match self.ensure_node_locked(&mut inner).await {
            Some(node) if had_node => {
                if let Err(source) = node.send(update) {
                    tracing::warn!(
                        "failed to send voice update for guild {}: {source}",
                        self.0.guild_id
                    );
                }
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    "no node available to send voice update for guild {}",
                    self.0.guild_id
                );
            }
        }

        self.set_state_locked(&mut inner, LinkState::Connected)
    }

    /// Route a voice-state-update to this link.
    ///
    /// Ignored unless it concerns the bot's own voice state. Records the
    /// session id unconditionally; if the channel id is null, forces
    /// [`LinkState::NotConnected`] and releases the worker-side session.
    pub(crate) async fn handle_voice_state_update(
        &self,
        user_id: Id<UserMarker>,
        session_id: String,
        channel_id: Option<Id<ChannelMarker>>,
    ) -> Result<(), IllegalAction> {
        let Some(client) = self.client() else {
            return Ok(());
        };

        if user_id != client.user_id() {
            return Ok(());
        }

        let mut inner = self.0.inner.lock().await;
        inner.session_id = Some(session_id);
        inner.channel_id = channel_id;

        if channel_id.is_none() && inner.state != LinkState::Destroyed {
            self.set_state_locked(&mut inner, LinkState::NotConnected)?;

            if let Some(node) = inner.node.clone() {
                if let Err(source) = node.send(Destroy::new(self.0.guild_id)) {
                    tracing::warn!(
                        "failed to send destroy for guild {} while leaving: {source}",
                        self.0.guild_id
                    );
                }
            }
        }

        Ok(())
    }

    /// Open a voice session in `channel_id`, belonging to `guild_id`.
    ///
    /// Sends a gateway voice-state-update requesting the join and waits up
    /// to 10 seconds for the chat platform to reflect the bot's own voice
    /// state in that channel.
    ///
    /// This only checks that `channel_id` belongs to `guild_id` and that the
    /// link's lifecycle state allows connecting. It does **not** check that
    /// the guild is marked available, or that the bot holds `CONNECT`
    /// permission (and the channel is under its user limit) or
    /// `MOVE_MEMBERS` — this crate has no guild/channel/permission cache to
    /// check them against, so the embedder must validate those before
    /// calling `connect`; an unauthorized join attempt will simply time out.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction`] if `guild_id` doesn't match this link's
    /// guild, if the link is destroyed or being destroyed, or if the wait
    /// times out.
    pub async fn connect(
        &self,
        guild_id: Id<GuildMarker>,
        channel_id: Id<ChannelMarker>,
    ) -> Result<(), IllegalAction> {
        if guild_id != self.0.guild_id {
            return Err(IllegalAction::new(IllegalActionType::MismatchedGuild {
                expected: self.0.guild_id,
                got: guild_id,
            }));
        }

        {
            let mut inner = self.0.inner.lock().await;
            self.set_state_locked(&mut inner, LinkState::Connecting)?;
        }

        let Some(client) = self.client() else {
            return Err(IllegalAction::new(IllegalActionType::GuildUnavailable { guild_id }));
        };

        if let Err(source) = client.send_gateway(guild_id, Some(channel_id)) {
            tracing::warn!("failed to send voice join for guild {guild_id}: {source}");
        }

        let deadline = TokioInstant::now() + Duration::from_secs(10);

        loop {
            if self.0.inner.lock().await.channel_id == Some(channel_id) {
                return Ok(());
            }

            if TokioInstant::now() >= deadline {
                return Err(IllegalAction::new(IllegalActionType::ConnectTimedOut { guild_id }));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Leave the current voice channel.
    pub async fn disconnect(&self) -> Result<(), IllegalAction> {
        {
            let mut inner = self.0.inner.lock().await;
            self.set_state_locked(&mut inner, LinkState::Disconnecting)?;
        }

        if let Some(client) = self.client() {
            if let Err(source) = client.send_gateway(self.0.guild_id, None) {
                tracing::warn!(
                    "failed to send voice leave for guild {}: {source}",
                    self.0.guild_id
                );
            }
        }

        Ok(())
    }

    /// Tear the link down: removes it from the client's link table and its
    /// node's back-index, and destroys its player if one exists.
    pub async fn destroy(&self) {
        let mut inner = self.0.inner.lock().await;

        if inner.state == LinkState::Destroyed {
            return;
        }

        let _ = self.set_state_locked(&mut inner, LinkState::Destroying);
        let node = inner.node.take();
        drop(inner);

        if let Some(client) = self.client() {
            client.0.links.remove(&self.0.guild_id);
        }

        let player = self.0.player.lock().expect("player lock poisoned").take();

        if let Some(node) = &node {
            node.remove_guild(self.0.guild_id);

            if let Some(player) = &player {
                player.destroy(node).await;
            }
        }

        let mut inner = self.0.inner.lock().await;
        let _ = self.set_state_locked(&mut inner, LinkState::Destroyed);
    }

    /// Return the currently assigned node, selecting the load balancer's
    /// best node if one isn't assigned (or the assigned one isn't
    /// available) and `select_if_absent` is set.
    pub async fn get_node(&self, select_if_absent: bool) -> Option<Node> {
        let mut inner = self.0.inner.lock().await;

        let needs_selection = match &inner.node {
            Some(node) => !node.is_available(),
            None => true,
        };

        if needs_selection && select_if_absent {
            return self.ensure_node_locked(&mut inner).await;
        }

        inner.node.clone()
    }

    async fn ensure_node_locked(&self, inner: &mut LinkInner) -> Option<Node> {
        if let Some(node) = &inner.node {
            if node.is_available() {
                return Some(node.clone());
            }
        }

        let client = self.client()?;
        let best = balancer::determine_best_node(&client).await.ok()?;
        self.change_node_locked(inner, best.clone()).await;
        Some(best)
    }

    /// Reassign this link to a different node.
    ///
    /// Replays the last combined voice update on the new node (if there was
    /// one) before notifying the player to re-establish playback, so the
    /// new node always sees the voice update first.
    pub async fn change_node(&self, node: Node) {
        let mut inner = self.0.inner.lock().await;
        self.change_node_locked(&mut inner, node).await;
    }

    async fn change_node_locked(&self, inner: &mut LinkInner, node: Node) {
        if let Some(old) = inner.node.take() {
            if old.name() != node.name() {
                old.remove_guild(self.0.guild_id);
            }
        }

        node.add_guild(self.0.guild_id);
        inner.node = Some(node.clone());

        if let Some(update) = inner.last_voice_update.clone() {
            if let Err(source) = node.send(update) {
                tracing::warn!(
                    "failed to replay voice update for guild {} on node `{}`: {source}",
                    self.0.guild_id,
                    node.name()
                );
            }
        }

        if let Some(player) = self.0.player.lock().expect("player lock poisoned").clone() {
            player.node_changed(&node).await;
        }
    }

    /// Deliver a `playerUpdate` frame's state to this link's player.
    pub(crate) async fn provide_state(&self, state: crate::model::incoming::PlayerUpdateState) {
        self.player_sync().provide_state(state).await;
    }

    /// Resolve tracks for an identifier against the link's current node.
    ///
    /// # Errors
    ///
    /// Returns [`TrackLookupError::NoNode`] if no node could be selected, or
    /// [`TrackLookupError::Rest`] if the node's `loadtracks` request failed.
    pub async fn get_tracks(&self, query: impl Into<String>) -> Result<AudioTrackPlaylist, TrackLookupError> {
        let node = self
            .get_node(true)
            .await
            .ok_or(TrackLookupError::NoNode(crate::error::NoNodesAvailable))?;

        Ok(node.get_tracks(query).await?)
    }

    /// [`Link::get_tracks`], prefixing the query for a YouTube search.
    pub async fn search_youtube(
        &self,
        query: impl Into<String>,
    ) -> Result<AudioTrackPlaylist, TrackLookupError> {
        self.get_tracks(format!("ytsearch:{}", query.into())).await
    }

    /// [`Link::get_tracks`], prefixing the query for a SoundCloud search.
    pub async fn search_soundcloud(
        &self,
        query: impl Into<String>,
    ) -> Result<AudioTrackPlaylist, TrackLookupError> {
        self.get_tracks(format!("scsearch:{}", query.into())).await
    }
}

#[cfg(test)]
mod tests {
    use super::Link;
    use static_assertions::assert_impl_all;
    use std::fmt::Debug;

    assert_impl_all!(Link: Clone, Debug, Send, Sync);
}
