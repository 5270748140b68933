//! Command dispatch for a guild's audio session, local play-position
//! extrapolation, and event fan-out to the embedder.

use crate::{
    error::{IllegalAction, IllegalActionType, NoNodesAvailable, PlayerCommandError},
    link::LinkRef,
    model::{
        incoming::{PlayerUpdateState, TrackEndReason},
        outgoing::{Destroy, Equalizer, EqualizerBand, Pause, Play, Seek, Stop, Volume},
    },
    node::Node,
    track::AudioTrack,
};
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex as StdMutex, Weak},
    time::Instant,
};
use twilight_model::id::{marker::GuildMarker, Id};

/// A bass-boost preset, mapped to a fixed two-band equalizer adjustment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum BassMode {
    /// No bass boost.
    #[default]
    Off,
    /// A subtle boost.
    Low,
    /// A moderate boost.
    Medium,
    /// A strong boost.
    High,
    /// A very strong boost.
    Extreme,
    /// The strongest preset.
    Sicko,
}

impl BassMode {
    /// The `(band, gain)` pairs this preset applies to bands 0 and 1.
    pub const fn bands(self) -> [(i64, f64); 2] {
        match self {
            Self::Off => [(0, 0.0), (1, 0.0)],
            Self::Low => [(0, 0.1), (1, 0.07)],
            Self::Medium => [(0, 0.2), (1, 0.14)],
            Self::High => [(0, 0.35), (1, 0.25)],
            Self::Extreme => [(0, 0.5), (1, 0.35)],
            Self::Sicko => [(0, 0.75), (1, 0.5)],
        }
    }
}

/// An event dispatched from a node to its player.
#[derive(Debug)]
#[non_exhaustive]
pub enum PlayerEvent<'a> {
    /// A track started playing.
    TrackStart {
        /// The track that started.
        track: &'a AudioTrack,
    },
    /// A track stopped playing.
    TrackEnd {
        /// The track that ended.
        track: &'a AudioTrack,
        /// Why it ended.
        reason: TrackEndReason,
    },
    /// A track threw an exception while playing.
    TrackException {
        /// The track that threw.
        track: &'a AudioTrack,
        /// The exception's cause.
        error: &'a str,
    },
    /// A track stopped producing frames for longer than a threshold.
    TrackStuck {
        /// The stuck track.
        track: &'a AudioTrack,
        /// The threshold, in milliseconds, that was exceeded.
        threshold_ms: u64,
    },
    /// The player was paused.
    Paused,
    /// The player was resumed.
    Resumed,
}

/// Receives [`PlayerEvent`]s for a player.
///
/// The crate runs its own bookkeeping (resetting the current track on a
/// terminal [`PlayerEvent::TrackEnd`]) ahead of calling this, so
/// implementations only need to react to events, not maintain player state.
/// A panic from an implementation is caught and logged; it never aborts the
/// node's event pipeline.
pub trait PlayerEventAdapter: Send + Sync {
    /// Handle a dispatched event.
    fn on_event(&self, player: &Player, event: &PlayerEvent<'_>);
}

struct PlayerState {
    current: Option<AudioTrack>,
    paused: bool,
    volume: i64,
    equalizer: [f64; 15],
    bass_mode: BassMode,
    update_time: Instant,
    position: i64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current: None,
            paused: false,
            volume: 100,
            equalizer: [0.0; 15],
            bass_mode: BassMode::Off,
            update_time: Instant::now(),
            position: 0,
        }
    }
}

pub(crate) struct PlayerRef {
    guild_id: Id<GuildMarker>,
    link: Weak<LinkRef>,
    state: StdMutex<PlayerState>,
    adapter: StdMutex<Option<Arc<dyn PlayerEventAdapter>>>,
}

/// The command facade for one guild's audio session.
///
/// Owned one-to-one by a [`Link`](crate::link::Link), created lazily on
/// first access.
#[derive(Clone)]
pub struct Player(pub(crate) Arc<PlayerRef>);

impl Debug for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Player")
            .field("guild_id", &self.0.guild_id)
            .field("paused", &self.is_paused())
            .field("volume", &self.volume())
            .finish_non_exhaustive()
    }
}

impl Player {
    pub(crate) fn new(guild_id: Id<GuildMarker>, link: Weak<LinkRef>) -> Self {
        Self(Arc::new(PlayerRef {
            guild_id,
            link,
            state: StdMutex::new(PlayerState::default()),
            adapter: StdMutex::new(None),
        }))
    }

    /// Set (or clear) the adapter this player dispatches events to.
    pub fn set_event_adapter(&self, adapter: Option<Arc<dyn PlayerEventAdapter>>) {
        *self.0.adapter.lock().expect("adapter lock poisoned") = adapter;
    }

    fn link(&self) -> Option<crate::link::Link> {
        self.0.link.upgrade().map(crate::link::Link)
    }

    /// The currently playing (or most recently playing) track, if any.
    pub fn current_track(&self) -> Option<AudioTrack> {
        self.0.state.lock().expect("player state poisoned").current.clone()
    }

    /// Whether the player is paused.
    pub fn is_paused(&self) -> bool {
        self.0.state.lock().expect("player state poisoned").paused
    }

    /// The player's volume, `0..=150`.
    pub fn volume(&self) -> i64 {
        self.0.state.lock().expect("player state poisoned").volume
    }

    /// The player's 15-band equalizer gains.
    pub fn equalizer(&self) -> [f64; 15] {
        self.0.state.lock().expect("player state poisoned").equalizer
    }

    /// The last bass mode applied via [`Player::set_bass`].
    pub fn bass_mode(&self) -> BassMode {
        self.0.state.lock().expect("player state poisoned").bass_mode
    }

    /// The extrapolated playback position in milliseconds.
    ///
    /// While playing, advances with wall-clock time from the last
    /// `playerUpdate` frame; while paused, holds steady. Always bounded
    /// above by the current track's duration.
    pub fn position(&self) -> i64 {
        let state = self.0.state.lock().expect("player state poisoned");

        let Some(current) = &state.current else {
            return state.position;
        };

        let duration = current.duration as i64;

        if state.paused {
            return state.position.min(duration);
        }

        let elapsed = state.update_time.elapsed().as_millis() as i64;
        (state.position + elapsed).min(duration)
    }

    pub(crate) async fn provide_state(&self, update: PlayerUpdateState) {
        let mut state = self.0.state.lock().expect("player state poisoned");

        if let Some(position) = update.position {
            state.position = position;
        }

        state.update_time = Instant::now();
    }

    async fn dispatch(&self, event: impl Into<crate::model::outgoing::OutgoingEvent>) -> Result<(), PlayerCommandError> {
        let link = self.link().ok_or(PlayerCommandError::NoNode(NoNodesAvailable))?;
        let node = link
            .get_node(true)
            .await
            .ok_or(PlayerCommandError::NoNode(NoNodesAvailable))?;

        node.send(event).map_err(PlayerCommandError::from)
    }

    /// Play a track, optionally starting from `position` and, by default,
    /// without replacing a currently playing track.
    pub async fn play(
        &self,
        track: AudioTrack,
        position: u64,
        no_replace: bool,
    ) -> Result<(), PlayerCommandError> {
        self.dispatch(Play::new(self.0.guild_id, track.encoded_track.clone(), position, no_replace))
            .await?;

        {
            let mut state = self.0.state.lock().expect("player state poisoned");
            state.current = Some(track.clone());
            state.position = position as i64;
            state.update_time = Instant::now();
            state.paused = false;
        }

        self.emit(&PlayerEvent::TrackStart { track: &track });
        Ok(())
    }

    /// Stop the current track.
    pub async fn stop(&self) -> Result<(), PlayerCommandError> {
        self.dispatch(Stop::new(self.0.guild_id)).await
    }

    /// Seek the current track to `position_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction`] if no track is current, or the current
    /// track isn't seekable.
    pub async fn seek_to(&self, position_ms: i64) -> Result<(), PlayerCommandError> {
        let current = self.0.state.lock().expect("player state poisoned").current.clone();

        let Some(current) = current else {
            return Err(IllegalAction::new(IllegalActionType::NotPlaying).into());
        };

        if !current.seekable {
            return Err(IllegalAction::new(IllegalActionType::NotSeekable).into());
        }

        self.dispatch(Seek::new(self.0.guild_id, position_ms)).await
    }

    /// Pause or resume playback.
    pub async fn set_paused(&self, paused: bool) -> Result<(), PlayerCommandError> {
        self.dispatch(Pause::new(self.0.guild_id, paused)).await?;

        self.0.state.lock().expect("player state poisoned").paused = paused;

        self.emit(&if paused {
            PlayerEvent::Paused
        } else {
            PlayerEvent::Resumed
        });

        Ok(())
    }

    /// Set the player's volume.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction`] if `volume` is outside `0..=150`.
    pub async fn set_volume(&self, volume: i64) -> Result<(), PlayerCommandError> {
        if !(0..=150).contains(&volume) {
            return Err(IllegalAction::new(IllegalActionType::InvalidVolume { volume }).into());
        }

        self.dispatch(Volume::new(self.0.guild_id, volume)).await?;
        self.0.state.lock().expect("player state poisoned").volume = volume;
        Ok(())
    }

    /// Set equalizer bands.
    ///
    /// Gains are clamped into `-0.25..=1.0`; bands outside `0..=14` are
    /// dropped.
    pub async fn set_eq(
        &self,
        bands: impl IntoIterator<Item = (i64, f64)>,
    ) -> Result<(), PlayerCommandError> {
        let clamped: Vec<EqualizerBand> = bands
            .into_iter()
            .filter(|(band, _)| (0..=14).contains(band))
            .map(|(band, gain)| EqualizerBand::new(band, gain.clamp(-0.25, 1.0)))
            .collect();

        self.dispatch(Equalizer::new(self.0.guild_id, clamped.clone())).await?;

        let mut state = self.0.state.lock().expect("player state poisoned");

        for band in &clamped {
            if let Some(slot) = usize::try_from(band.band).ok().and_then(|i| state.equalizer.get_mut(i)) {
                *slot = band.gain;
            }
        }

        Ok(())
    }

    /// Apply a bass-boost preset via [`Player::set_eq`].
    pub async fn set_bass(&self, mode: BassMode) -> Result<(), PlayerCommandError> {
        self.set_eq(mode.bands()).await?;
        self.0.state.lock().expect("player state poisoned").bass_mode = mode;
        Ok(())
    }

    pub(crate) async fn destroy(&self, node: &Node) {
        if let Err(source) = node.send(Destroy::new(self.0.guild_id)) {
            tracing::warn!(
                "failed to send destroy for guild {}: {source}",
                self.0.guild_id
            );
        }

        self.set_event_adapter(None);
    }

    /// Called by [`Link::change_node`](crate::link::Link::change_node) after
    /// migrating to a new node: re-issues play/pause/volume so the new node
    /// picks playback back up where it left off. The equalizer is not
    /// automatically restored.
    pub(crate) async fn node_changed(&self, node: &Node) {
        let (current, position, paused, volume) = {
            let state = self.0.state.lock().expect("player state poisoned");
            (state.current.clone(), self.position(), state.paused, state.volume)
        };

        if let Some(current) = current {
            if let Err(source) = node.send(Play::new(
                self.0.guild_id,
                current.encoded_track.clone(),
                position.max(0) as u64,
                false,
            )) {
                tracing::warn!(
                    "failed to replay play for guild {} after migration: {source}",
                    self.0.guild_id
                );
            }
        }

        if paused {
            if let Err(source) = node.send(Pause::new(self.0.guild_id, true)) {
                tracing::warn!(
                    "failed to replay pause for guild {} after migration: {source}",
                    self.0.guild_id
                );
            }
        }

        if volume != 100 {
            if let Err(source) = node.send(Volume::new(self.0.guild_id, volume)) {
                tracing::warn!(
                    "failed to replay volume for guild {} after migration: {source}",
                    self.0.guild_id
                );
            }
        }
    }

    pub(crate) async fn handle_track_start(&self) {
        if let Some(track) = self.current_track() {
            self.emit(&PlayerEvent::TrackStart { track: &track });
        }
    }

    pub(crate) async fn handle_track_end(&self, reason: TrackEndReason) {
        let track = {
            let mut state = self.0.state.lock().expect("player state poisoned");
            let track = state.current.clone();
            state.current = None;
            state.position = 0;
            track
        };

        if let Some(track) = track {
            self.emit(&PlayerEvent::TrackEnd { track: &track, reason });
        }
    }

    pub(crate) async fn handle_track_exception(&self, error: String) {
        if let Some(track) = self.current_track() {
            self.emit(&PlayerEvent::TrackException { track: &track, error: &error });
        }
    }

    pub(crate) async fn handle_track_stuck(&self, threshold_ms: u64) {
        if let Some(track) = self.current_track() {
            self.emit(&PlayerEvent::TrackStuck { track: &track, threshold_ms });
        }
    }

    fn emit(&self, event: &PlayerEvent<'_>) {
        let adapter = self.0.adapter.lock().expect("adapter lock poisoned").clone();

        let Some(adapter) = adapter else { return };

        if catch_unwind(AssertUnwindSafe(|| adapter.on_event(self, event))).is_err() {
            tracing::error!(
                "player event adapter panicked handling {event:?} for guild {}",
                self.0.guild_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BassMode, Player, PlayerEvent, PlayerEventAdapter};
    use crate::{model::incoming::TrackEndReason, track::AudioTrack};
    use static_assertions::assert_impl_all;
    use std::{
        fmt::Debug,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };
    use twilight_model::id::Id;

    assert_impl_all!(Player: Clone, Debug, Send, Sync);

    fn player() -> Player {
        Player::new(Id::new(1), std::sync::Weak::new())
    }

    fn track(duration: u64, seekable: bool) -> AudioTrack {
        AudioTrack {
            encoded_track: "QAAA".to_owned(),
            uri: None,
            title: "title".to_owned(),
            author: "author".to_owned(),
            identifier: "id".to_owned(),
            seekable,
            is_stream: false,
            duration,
            source_name: "youtube".to_owned(),
            isrc: None,
            artwork_url: None,
            user_data: None,
        }
    }

    #[test]
    fn position_holds_at_zero_with_no_state() {
        let player = player();
        assert_eq!(player.position(), 0);
    }

    #[tokio::test]
    async fn position_extrapolates_while_playing() {
        let player = player();
        {
            let mut state = player.0.state.lock().unwrap();
            state.current = Some(track(60_000, true));
            state.position = 10_000;
            state.update_time = std::time::Instant::now();
        }

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let position = player.position();
        assert!(position >= 10_050, "position was {position}");
        assert!(position < 11_000, "position was {position}");
    }

    #[test]
    fn position_is_bounded_by_duration() {
        let player = player();
        {
            let mut state = player.0.state.lock().unwrap();
            state.current = Some(track(1_000, true));
            state.position = 10_000;
        }

        assert_eq!(player.position(), 1_000);
    }

    #[test]
    fn position_holds_while_paused() {
        let player = player();
        {
            let mut state = player.0.state.lock().unwrap();
            state.current = Some(track(60_000, true));
            state.position = 5_000;
            state.paused = true;
        }

        assert_eq!(player.position(), 5_000);
    }

    struct RecordingAdapter {
        starts: AtomicUsize,
        ends: AtomicUsize,
    }

    impl PlayerEventAdapter for RecordingAdapter {
        fn on_event(&self, _player: &Player, event: &PlayerEvent<'_>) {
            match event {
                PlayerEvent::TrackStart { .. } => {
                    self.starts.fetch_add(1, Ordering::SeqCst);
                }
                PlayerEvent::TrackEnd { .. } => {
                    self.ends.fetch_add(1, Ordering::SeqCst);
                }
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn track_end_resets_current_track_and_position() {
        let player = player();
        {
            let mut state = player.0.state.lock().unwrap();
            state.current = Some(track(60_000, true));
            state.position = 30_000;
        }

        player.handle_track_end(TrackEndReason::Finished).await;

        assert!(player.current_track().is_none());
        assert_eq!(player.position(), 0);
    }

    #[tokio::test]
    async fn adapter_panic_is_caught() {
        struct PanicAdapter;

        impl PlayerEventAdapter for PanicAdapter {
            fn on_event(&self, _player: &Player, _event: &PlayerEvent<'_>) {
                panic!("boom");
            }
        }

        let player = player();
        player.set_event_adapter(Some(Arc::new(PanicAdapter)));
        {
            let mut state = player.0.state.lock().unwrap();
            state.current = Some(track(1_000, true));
        }

        player.handle_track_start().await;
    }

    #[tokio::test]
    async fn adapter_observes_events() {
        let player = player();
        let adapter = Arc::new(RecordingAdapter {
            starts: AtomicUsize::new(0),
            ends: AtomicUsize::new(0),
        });
        player.set_event_adapter(Some(adapter.clone()));

        {
            let mut state = player.0.state.lock().unwrap();
            state.current = Some(track(1_000, true));
        }

        player.handle_track_start().await;
        assert_eq!(adapter.starts.load(Ordering::SeqCst), 1);

        {
            let mut state = player.0.state.lock().unwrap();
            state.current = Some(track(1_000, true));
        }

        player.handle_track_end(TrackEndReason::Finished).await;
        assert_eq!(adapter.ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bass_mode_bands_affect_only_first_two() {
        for mode in [
            BassMode::Off,
            BassMode::Low,
            BassMode::Medium,
            BassMode::High,
            BassMode::Extreme,
            BassMode::Sicko,
        ] {
            let bands = mode.bands();
            assert_eq!(bands[0].0, 0);
            assert_eq!(bands[1].0, 1);
        }
    }
}
