//! Simulated embed example
//!
//! Drives a YouTube playback against an in-process stand-in for the iframe
//! API and prints the events a host player would receive.
//!
//! Run with: RUST_LOG=kino_youtube=debug cargo run -p kino-youtube --example simulated_embed

use kino_youtube::{
    EmbedApi, EmbedConfig, EmbedNotifier, EmbedOptions, EmbedPlayer, EmbedState, EventBus,
    EventSink, Mediator, PlaybackContext, PointerEvents, RenderedFragment, ScriptInjector,
    ScriptLoader, ScriptTag, Surface, YoutubePlayback,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Plays a 30 second video, advancing one second per call to `current_time`
struct SimulatedPlayer {
    position: Mutex<f64>,
    notifier: EmbedNotifier,
}

impl EmbedPlayer for SimulatedPlayer {
    fn play_video(&self) {
        self.notifier.state_change(EmbedState::Playing.code());
    }

    fn pause_video(&self) {
        self.notifier.state_change(EmbedState::Paused.code());
    }

    fn seek_to(&self, seconds: f64) {
        *self.position.lock() = seconds;
    }

    fn duration(&self) -> f64 {
        30.0
    }

    fn current_time(&self) -> f64 {
        let mut position = self.position.lock();
        *position = (*position + 1.0).min(30.0);
        *position
    }

    fn loaded_fraction(&self) -> f64 {
        0.75
    }

    fn player_state(&self) -> EmbedState {
        EmbedState::Playing
    }

    fn playback_quality(&self) -> String {
        "hd720".to_string()
    }

    fn set_volume(&self, volume: f64) {
        println!("  [embed] volume -> {}", volume);
    }

    fn set_size(&self, width: f64, height: f64) {
        println!("  [embed] size -> {}x{}", width, height);
    }
}

struct SimulatedApi;

impl EmbedApi for SimulatedApi {
    fn is_available(&self) -> bool {
        true
    }

    fn create_player(
        &self,
        container_id: &str,
        options: EmbedOptions,
        notifier: EmbedNotifier,
    ) -> Box<dyn EmbedPlayer> {
        match options.player_vars.to_json() {
            Ok(vars) => println!(
                "  [embed] YT.Player('{}', videoId={}, playerVars={})",
                container_id, options.video_id, vars
            ),
            Err(e) => eprintln!("  [embed] invalid playerVars: {}", e),
        }
        notifier.ready();
        notifier.quality_change("hd720");
        Box::new(SimulatedPlayer {
            position: Mutex::new(0.0),
            notifier,
        })
    }
}

struct Document;

impl ScriptInjector for Document {
    fn inject(&self, tag: &ScriptTag) {
        println!("  [document] {}", tag.to_html());
    }
}

struct Container;

impl Surface for Container {
    fn size(&self) -> (f64, f64) {
        (1280.0, 720.0)
    }

    fn set_pointer_events(&self, mode: PointerEvents) {
        println!("  [container] pointer-events: {}", mode.as_css());
    }

    fn render(&self, fragment: &RenderedFragment) {
        println!("  [container] {}", fragment.html);
    }
}

#[tokio::main]
async fn main() -> kino_youtube::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    kino_youtube::init();

    println!("Kino YouTube - Simulated Embed");
    println!("==============================\n");

    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(record) = events.recv().await {
            if !record.event.is_periodic() || record.sequence % 5 == 0 {
                println!("  #{:<3} {}", record.sequence, record.event.name());
            }
        }
    });

    let loader = ScriptLoader::new(Arc::new(Document));
    let mediator = Mediator::new();
    let ctx = PlaybackContext {
        api: Arc::new(SimulatedApi),
        loader: loader.clone(),
        events: bus.clone() as Arc<dyn EventSink>,
        surface: Arc::new(Container),
        mediator: mediator.clone(),
    };

    let mut config = EmbedConfig::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ&vq=hd720");
    config.auto_play = true;
    config.page_url = "https://kino-player.pages.dev/demo".parse().ok();

    let playback = YoutubePlayback::new(config, ctx)?;
    playback.render();

    // The page reports the API as loaded
    tokio::time::sleep(Duration::from_millis(50)).await;
    loader.mark_ready();

    tokio::time::sleep(Duration::from_millis(100)).await;
    playback.play();

    tokio::time::sleep(Duration::from_millis(500)).await;
    mediator.resize();
    playback.seek_percentage(50.0);

    tokio::time::sleep(Duration::from_millis(300)).await;
    playback.pause();

    tokio::time::sleep(Duration::from_millis(300)).await;
    println!(
        "\nduration={}s hd={} settings={:?}",
        playback.duration(),
        playback.is_high_definition_in_use(),
        playback.settings()
    );

    playback.destroy();
    drop(bus);
    printer.abort();

    Ok(())
}
