//! YouTube Playback - drives one iframe embed through the host lifecycle
//!
//! Coordinates:
//! - Iframe API readiness and embed construction
//! - Play/pause/seek/volume forwarding
//! - Progress and time-update polling
//! - Embed state changes mapped to playback events

use crate::{
    config::{Dimension, EmbedConfig},
    embed::{
        page_origin, EmbedApi, EmbedNotification, EmbedNotifier, EmbedOptions, EmbedPlayer,
        EmbedState, PlayerVars,
    },
    events::{EventSink, PlaybackEvent},
    loader::ScriptLoader,
    mediator::{HostNotification, Mediator},
    source::{find_video_id, find_video_quality, is_high_definition},
    surface::{embed_container_id, RenderedFragment, Surface},
    types::*,
    Result,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Name the host registers this playback under
pub const PLAYBACK_NAME: &str = "youtube_playback";

/// Collaborators a playback is wired to
#[derive(Clone)]
pub struct PlaybackContext {
    /// Iframe API used to construct the embed
    pub api: Arc<dyn EmbedApi>,
    /// Loader shared by every playback on the page
    pub loader: ScriptLoader,
    /// Receives every playback event
    pub events: Arc<dyn EventSink>,
    /// Container element
    pub surface: Arc<dyn Surface>,
    /// Page-wide resize notifications
    pub mediator: Mediator,
}

/// Which polling timers are currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerStatus {
    pub progress: bool,
    pub time_update: bool,
}

/// Tasks owned by one playback, aborted on teardown
#[derive(Default)]
struct Tasks {
    api_wait: Option<JoinHandle<()>>,
    pending_play: Option<JoinHandle<()>>,
    pending_embed: Option<JoinHandle<()>>,
    progress_timer: Option<JoinHandle<()>>,
    time_update_timer: Option<JoinHandle<()>>,
    resize_listener: Option<JoinHandle<()>>,
    notifications: Option<JoinHandle<()>>,
}

impl Tasks {
    fn abort_all(&mut self) {
        let handles = [
            &mut self.api_wait,
            &mut self.pending_play,
            &mut self.pending_embed,
            &mut self.progress_timer,
            &mut self.time_update_timer,
            &mut self.resize_listener,
            &mut self.notifications,
        ];
        for handle in handles {
            if let Some(handle) = handle.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for Tasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Host-facing side effect, applied once the state lock is released
enum Effect {
    Emit(PlaybackEvent),
    PointerEvents(PointerEvents),
}

fn is_running(handle: &Option<JoinHandle<()>>) -> bool {
    handle.as_ref().is_some_and(|h| !h.is_finished())
}

struct State {
    lifecycle: LifecycleState,
    ready: bool,
    destroyed: bool,
    /// Created at most once, never replaced
    embed: Option<Box<dyn EmbedPlayer>>,
    settings: PlaybackSettings,
    playback_type: Option<PlaybackType>,
    tasks: Tasks,
}

struct Inner {
    id: PlaybackId,
    cid: String,
    config: EmbedConfig,
    ctx: PlaybackContext,
    state: Mutex<State>,
    /// Bumped on every ready sequence
    ready_tx: watch::Sender<u64>,
}

/// Playback backed by a YouTube iframe embed
pub struct YoutubePlayback {
    inner: Arc<Inner>,
}

impl YoutubePlayback {
    /// Create a playback for `config.src`.
    ///
    /// Injects the iframe API through the shared loader if no earlier
    /// playback did, and waits for it in the background. Must be called
    /// from within a tokio runtime.
    pub fn new(config: EmbedConfig, ctx: PlaybackContext) -> Result<Self> {
        config.validate()?;

        let id = PlaybackId::new();
        let (ready_tx, _) = watch::channel(0);
        let inner = Arc::new(Inner {
            id,
            cid: id.to_string(),
            config,
            ctx,
            state: Mutex::new(State {
                lifecycle: LifecycleState::Uninitialized,
                ready: false,
                destroyed: false,
                embed: None,
                settings: PlaybackSettings::default(),
                playback_type: None,
                tasks: Tasks::default(),
            }),
            ready_tx,
        });

        info!(
            playback_id = %inner.id,
            src = %inner.config.src,
            "Creating YouTube playback"
        );
        inner.start();

        Ok(Self { inner })
    }

    /// Returns true if `source` is a YouTube URL
    pub fn can_play(source: &str) -> bool {
        crate::source::can_play(source)
    }

    pub fn name(&self) -> &'static str {
        PLAYBACK_NAME
    }

    pub fn id(&self) -> PlaybackId {
        self.inner.id
    }

    /// Container id used in the rendered markup
    pub fn cid(&self) -> &str {
        &self.inner.cid
    }

    /// Id of the element the embed is bound to
    pub fn container_id(&self) -> String {
        embed_container_id(&self.inner.cid)
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.inner.config
    }

    /// Start or resume playback
    #[instrument(skip(self), fields(cid = %self.inner.cid))]
    pub fn play(&self) {
        self.inner.play();
    }

    /// Pause playback.
    ///
    /// Stops the time-update timer only; progress keeps polling.
    #[instrument(skip(self), fields(cid = %self.inner.cid))]
    pub fn pause(&self) {
        let mut state = self.inner.state.lock();
        if let Some(timer) = state.tasks.time_update_timer.take() {
            timer.abort();
            debug!("Time-update timer stopped");
        }
        if let Some(embed) = &state.embed {
            embed.pause_video();
        }
    }

    /// Seek to an absolute position in seconds
    #[instrument(skip(self), fields(cid = %self.inner.cid))]
    pub fn seek(&self, time: f64) {
        let state = self.inner.state.lock();
        Inner::seek_to(&state, time);
    }

    /// Seek to a percentage (0..=100) of the duration
    #[instrument(skip(self), fields(cid = %self.inner.cid))]
    pub fn seek_percentage(&self, percentage: f64) {
        let state = self.inner.state.lock();
        if let Some(embed) = &state.embed {
            let time = percentage * embed.duration() / 100.0;
            Inner::seek_to(&state, time);
        }
    }

    /// Set volume, 0..=100
    pub fn volume(&self, value: f64) {
        let state = self.inner.state.lock();
        Inner::set_volume(&state, value);
    }

    /// Run the ready sequence.
    ///
    /// Invoked when the iframe API loads and when the embed reports ready;
    /// hosts may call it to re-announce readiness.
    pub fn ready(&self) {
        self.inner.ready();
    }

    /// Resize the embed to the container
    pub fn update_size(&self) {
        self.inner.update_size();
    }

    /// Render markup and styles into the surface; starts playback if
    /// `autoPlay` is configured.
    #[instrument(skip(self), fields(cid = %self.inner.cid))]
    pub fn render(&self) -> RenderedFragment {
        let fragment =
            RenderedFragment::new(&self.inner.cid, self.inner.config.base_url.as_deref());
        self.inner.ctx.surface.render(&fragment);
        if self.inner.config.auto_play {
            self.inner.play();
        }
        fragment
    }

    /// Tear down: abort timers and pending waits, release the embed
    #[instrument(skip(self), fields(cid = %self.inner.cid))]
    pub fn destroy(&self) {
        let embed = {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.tasks.abort_all();
            state.embed.take()
        };
        drop(embed);
        info!("Playback destroyed");
    }

    /// Duration in seconds, 0 without an embed
    pub fn duration(&self) -> f64 {
        let state = self.inner.state.lock();
        state.embed.as_ref().map(|e| e.duration()).unwrap_or(0.0)
    }

    pub fn is_playing(&self) -> bool {
        self.embed_state() == Some(EmbedState::Playing)
    }

    pub fn buffering(&self) -> bool {
        self.embed_state() == Some(EmbedState::Buffering)
    }

    /// Always false; the end of playback is only reported as an event
    pub fn ended(&self) -> bool {
        false
    }

    pub fn is_ready(&self) -> bool {
        self.inner.state.lock().ready
    }

    pub fn is_high_definition_in_use(&self) -> bool {
        self.inner.is_high_definition_in_use(&self.inner.state.lock())
    }

    pub fn playback_type(&self) -> PlaybackType {
        Inner::detect_playback_type()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.inner.state.lock().lifecycle
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.inner.state.lock().settings.clone()
    }

    pub fn has_embed(&self) -> bool {
        self.inner.state.lock().embed.is_some()
    }

    pub fn timers(&self) -> TimerStatus {
        let state = self.inner.state.lock();
        TimerStatus {
            progress: is_running(&state.tasks.progress_timer),
            time_update: is_running(&state.tasks.time_update_timer),
        }
    }

    fn embed_state(&self) -> Option<EmbedState> {
        let state = self.inner.state.lock();
        state.embed.as_ref().map(|e| e.player_state())
    }
}

impl std::fmt::Debug for YoutubePlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubePlayback")
            .field("id", &self.inner.id)
            .field("src", &self.inner.config.src)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

impl Inner {
    fn start(self: &Arc<Self>) {
        let mut state = self.state.lock();
        state.tasks.resize_listener = Some(self.spawn_resize_listener());

        self.ctx.loader.ensure_injected();
        self.transition(&mut state, LifecycleState::ApiLoading);

        let loader = self.ctx.loader.clone();
        let weak = Arc::downgrade(self);
        state.tasks.api_wait = Some(tokio::spawn(async move {
            loader.ready().await;
            if let Some(inner) = weak.upgrade() {
                inner.ready();
            }
        }));
    }

    fn spawn_resize_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.ctx.mediator.subscribe();
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(HostNotification::Resize) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        let Some(inner) = weak.upgrade() else { break };
                        inner.update_size();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn emit(&self, event: PlaybackEvent) {
        if !event.is_periodic() {
            debug!(cid = %self.cid, event = event.name(), "Playback event");
        }
        self.ctx.events.emit(event);
    }

    /// Must be called without the state lock held
    fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.emit(event),
                Effect::PointerEvents(mode) => self.ctx.surface.set_pointer_events(mode),
            }
        }
    }

    fn transition(&self, state: &mut State, target: LifecycleState) {
        let current = state.lifecycle;
        if current == target {
            return;
        }
        if !current.can_transition_to(target) {
            warn!(cid = %self.cid, from = %current, to = %target, "Ignoring invalid lifecycle transition");
            return;
        }
        state.lifecycle = target;
        info!(cid = %self.cid, from = %current, to = %target, "State transition");
    }

    fn ready(&self) {
        {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            state.ready = true;
            self.transition(&mut state, LifecycleState::Ready);
            if self.config.mute {
                Self::set_volume(&state, 0.0);
            }
        }
        self.emit(PlaybackEvent::Ready);
        self.ready_tx.send_modify(|generation| *generation += 1);
    }

    fn play(self: &Arc<Self>) {
        let buffering = {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            self.play_locked(&mut state)
        };
        if buffering {
            self.emit(PlaybackEvent::Buffering);
        }
    }

    /// Returns true if playback has to wait for the embed
    fn play_locked(self: &Arc<Self>, state: &mut State) -> bool {
        if state.embed.is_some() {
            self.start_timers(state);
            if let Some(embed) = &state.embed {
                embed.play_video();
            }
            false
        } else if state.ready {
            self.start_timers(state);
            self.setup_player(state);
            true
        } else {
            if is_running(&state.tasks.pending_play) {
                debug!("Play already deferred until ready");
                return true;
            }
            let mut rx = self.ready_tx.subscribe();
            let weak = Arc::downgrade(self);
            state.tasks.pending_play = Some(tokio::spawn(async move {
                if rx.changed().await.is_err() {
                    return;
                }
                if let Some(inner) = weak.upgrade() {
                    inner.play();
                }
            }));
            debug!("Play deferred until ready");
            true
        }
    }

    fn start_timers(self: &Arc<Self>, state: &mut State) {
        let period = self.config.poll_interval();
        if !is_running(&state.tasks.progress_timer) {
            state.tasks.progress_timer =
                Some(spawn_poller(Arc::downgrade(self), period, Inner::progress));
            debug!(period_ms = period.as_millis() as u64, "Progress timer started");
        }
        if !is_running(&state.tasks.time_update_timer) {
            state.tasks.time_update_timer =
                Some(spawn_poller(Arc::downgrade(self), period, Inner::time_update));
            debug!(period_ms = period.as_millis() as u64, "Time-update timer started");
        }
    }

    fn progress(&self) {
        let event = {
            let state = self.state.lock();
            let Some(embed) = &state.embed else { return };
            let total = embed.duration();
            PlaybackEvent::Progress {
                start: 0.0,
                current: total * embed.loaded_fraction(),
                total,
            }
        };
        self.emit(event);
    }

    fn time_update(&self) {
        let event = {
            let state = self.state.lock();
            let Some(embed) = &state.embed else { return };
            PlaybackEvent::TimeUpdate {
                current: embed.current_time(),
                total: embed.duration(),
            }
        };
        self.emit(event);
    }

    /// Embed now if the API is loaded, otherwise on the next ready
    fn setup_player(self: &Arc<Self>, state: &mut State) {
        if state.embed.is_some() || is_running(&state.tasks.pending_embed) {
            return;
        }
        if self.ctx.api.is_available() {
            self.embed_player(state);
            return;
        }

        debug!("Iframe API not available, embedding on next ready");
        let mut rx = self.ready_tx.subscribe();
        let weak = Arc::downgrade(self);
        state.tasks.pending_embed = Some(tokio::spawn(async move {
            if rx.changed().await.is_err() {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.lock();
                if state.destroyed {
                    return;
                }
                // Detach this task's handle so the setup can defer again
                state.tasks.pending_embed.take();
                inner.setup_player(&mut state);
            }
        }));
    }

    fn embed_player(self: &Arc<Self>, state: &mut State) {
        if state.embed.is_some() {
            return;
        }

        let container_id = embed_container_id(&self.cid);
        let options = self.embed_options();
        info!(
            container = %container_id,
            video_id = %options.video_id,
            quality = %options.player_vars.vq,
            "Embedding player"
        );

        let (notifier, rx) = EmbedNotifier::channel();
        let player = self.ctx.api.create_player(&container_id, options, notifier);
        state.embed = Some(player);
        self.transition(state, LifecycleState::PlayerEmbedding);
        state.tasks.notifications = Some(self.spawn_notification_pump(rx));
    }

    fn embed_options(&self) -> EmbedOptions {
        let config = &self.config;
        let quality = config
            .video_quality
            .clone()
            .unwrap_or_else(|| find_video_quality(&config.src).to_string());

        let mut vars = PlayerVars::new(quality);
        vars.rel = u8::from(config.youtube_show_related);
        vars.loop_playback = u8::from(config.loop_playback);
        vars.origin = config.page_url.as_ref().and_then(page_origin);
        if let Some(playlist) = &config.youtube_playlist {
            vars = vars.with_playlist(playlist.clone());
        }

        EmbedOptions {
            width: config.width.clone().unwrap_or_else(Dimension::fill),
            height: config.height.clone().unwrap_or_else(Dimension::fill),
            video_id: find_video_id(&config.src).to_string(),
            player_vars: vars,
        }
    }

    fn spawn_notification_pump(
        self: &Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<EmbedNotification>,
    ) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let Some(inner) = weak.upgrade() else { break };
                inner.handle_notification(notification);
            }
        })
    }

    fn handle_notification(&self, notification: EmbedNotification) {
        match notification {
            EmbedNotification::Ready => self.ready(),
            EmbedNotification::StateChange(code) => match EmbedState::from_code(code) {
                Some(embed_state) => self.state_change(embed_state),
                None => debug!(code, "Unknown embed state"),
            },
            EmbedNotification::QualityChange(quality) => self.quality_change(&quality),
        }
    }

    fn state_change(&self, embed_state: EmbedState) {
        let mut effects = Vec::new();
        {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            debug!(cid = %self.cid, state = ?embed_state, "Embed state change");

            match embed_state {
                EmbedState::Playing => {
                    Self::enable_media_control(&mut effects);
                    let playback_type = Self::detect_playback_type();
                    if state.playback_type != Some(playback_type) {
                        state.settings.change_count += 1;
                        state.playback_type = Some(playback_type);
                        effects.push(Effect::Emit(PlaybackEvent::SettingsUpdate));
                    }
                    effects.push(Effect::Emit(PlaybackEvent::BufferFull));
                    effects.push(Effect::Emit(PlaybackEvent::Play));
                    self.transition(&mut state, LifecycleState::Playing);
                }
                EmbedState::Paused => {
                    effects.push(Effect::Emit(PlaybackEvent::Pause));
                    self.transition(&mut state, LifecycleState::Paused);
                }
                EmbedState::Buffering => {
                    effects.push(Effect::Emit(PlaybackEvent::Buffering));
                    self.transition(&mut state, LifecycleState::Buffering);
                }
                EmbedState::Ended => {
                    if self.config.youtube_show_related {
                        // Leave the related-videos grid clickable
                        Self::disable_media_control(&mut effects);
                    } else {
                        effects.push(Effect::Emit(PlaybackEvent::Ended));
                    }
                    self.transition(&mut state, LifecycleState::Ended);
                }
                EmbedState::Unstarted | EmbedState::Cued => {}
            }
        }
        self.apply(effects);
    }

    fn quality_change(&self, quality: &str) {
        let in_use = {
            let state = self.state.lock();
            if state.destroyed {
                return;
            }
            self.is_high_definition_in_use(&state)
        };
        debug!(quality, in_use, "Playback quality changed");
        self.emit(PlaybackEvent::HighDefinitionUpdate { in_use });
    }

    fn is_high_definition_in_use(&self, state: &State) -> bool {
        state
            .embed
            .as_ref()
            .is_some_and(|e| is_high_definition(&e.playback_quality()))
    }

    fn detect_playback_type() -> PlaybackType {
        PlaybackType::Vod
    }

    fn enable_media_control(effects: &mut Vec<Effect>) {
        effects.push(Effect::PointerEvents(PointerEvents::None));
        effects.push(Effect::Emit(PlaybackEvent::MediaControlEnable));
    }

    fn disable_media_control(effects: &mut Vec<Effect>) {
        effects.push(Effect::PointerEvents(PointerEvents::Auto));
        effects.push(Effect::Emit(PlaybackEvent::MediaControlDisable));
    }

    fn update_size(&self) {
        let (width, height) = self.ctx.surface.size();
        let state = self.state.lock();
        if let Some(embed) = &state.embed {
            embed.set_size(width, height);
        }
    }

    fn seek_to(state: &State, time: f64) {
        if let Some(embed) = &state.embed {
            embed.seek_to(time);
        }
    }

    fn set_volume(state: &State, value: f64) {
        if let Some(embed) = &state.embed {
            embed.set_volume(value);
        }
    }
}

/// Fixed-period timer holding only a weak reference to the playback
fn spawn_poller(weak: Weak<Inner>, period: Duration, tick: fn(&Inner)) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(inner) = weak.upgrade() else { break };
            tick(&inner);
        }
    })
}
