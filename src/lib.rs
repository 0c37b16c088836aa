// Module declarations for the application's core components
pub mod channels;      // Inter-component communication channels
pub mod config;        // Configuration management and device inventory
pub mod coordinator;   // Per-association listener ownership and routing
pub mod error;         // Error handling and types
pub mod event;         // Switching event notifications and event codes
pub mod handler;       // Report handlers per dataset template
pub mod iec61850;      // Report and node model, leaf decoding
pub mod listener;      // Event listeners and freshness filtering
pub mod measurement;   // Measurement results sent to the platform
pub mod mqtt;          // MQTT publisher
pub mod notifier;      // Upstream envelope and delivery
pub mod options;       // Command line options parsing
pub mod output_index;  // Relay index remapping
pub mod prelude;       // Common imports and types
pub mod registry;      // Report handler registry
pub mod replay;        // Transport capture playback
pub mod translator;    // Node to measurement translation
pub mod transport;     // Messages from the protocol client

// Get the package version from Cargo.toml
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::prelude::*;

use crate::coordinator::Coordinator;
use crate::event::EventCodeTable;
use crate::listener::ListenerFactory;
use crate::mqtt::Mqtt;
use crate::notifier::{ChannelNotifier, DeviceManagementService, LogNotifier, Notifier};
use crate::options::Options;
use crate::registry::Registries;
use crate::replay::Replay;
use crate::translator::pq::PqCommandTable;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Running components and their tasks.
pub struct Components {
    pub coordinator: Coordinator,
    pub mqtt: Mqtt,
    pub channels: Channels,
    coordinator_handle: JoinHandle<()>,
    mqtt_handle: JoinHandle<()>,
}

impl Components {
    /// Subscribes every component to its channel before spawning it, so
    /// nothing sent right after start-up is missed.
    pub fn start(config: ConfigWrapper, channels: Channels, factory: ListenerFactory) -> Self {
        info!("  Creating Coordinator...");
        let coordinator = Coordinator::new(config.clone(), channels.clone(), factory);
        let receiver = channels.from_transport.subscribe();
        let coordinator_clone = coordinator.clone();
        let coordinator_handle = tokio::spawn(async move {
            if let Err(e) = coordinator_clone.run(receiver).await {
                error!("Coordinator task failed: {}", e);
            }
        });

        info!("  Creating MQTT client...");
        let mqtt = Mqtt::new(config, channels.clone(), coordinator.stats.clone());
        let receiver = channels.to_mqtt.subscribe();
        let mqtt_clone = mqtt.clone();
        let mqtt_handle = tokio::spawn(async move {
            if let Err(e) = mqtt_clone.run(receiver).await {
                error!("MQTT task failed: {}", e);
            }
        });

        Self {
            coordinator,
            mqtt,
            channels,
            coordinator_handle,
            mqtt_handle,
        }
    }

    /// Gracefully stops all components.
    ///
    /// The coordinator goes first: closing the open associations flushes
    /// buffered events, which MQTT still has to publish.
    pub async fn stop(self) {
        info!("Stopping all components...");

        self.coordinator.stop();
        if let Err(e) = self.coordinator_handle.await {
            error!("Error waiting for coordinator task: {}", e);
        }

        let _ = self.mqtt.stop().await;
        match tokio::time::timeout(Duration::from_secs(5), self.mqtt_handle).await {
            Ok(Err(e)) => error!("Error waiting for MQTT task: {}", e),
            Err(_) => warn!("MQTT task did not stop within 5s"),
            Ok(Ok(())) => {}
        }

        info!("Shutdown complete");
    }
}

/// Sets up env_logger once, at `level` unless `RUST_LOG` says otherwise.
pub fn init_logging(level: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Never)
        .try_init();

    if let Err(e) = result {
        warn!("logger already initialized: {}", e);
    }
}

/// Builds the processing pipeline described by `config`.
pub fn listener_factory(config: &ConfigWrapper, channels: &Channels) -> Result<ListenerFactory> {
    let registries = Registries::new(&config.datasets(), PqCommandTable::default(), EventCodeTable::default())?;

    let notifier: Arc<dyn Notifier> = if config.mqtt().enabled() {
        Arc::new(ChannelNotifier::new(channels))
    } else {
        info!("mqtt disabled, platform messages are only logged");
        Arc::new(LogNotifier)
    };

    Ok(ListenerFactory::new(registries, DeviceManagementService::new(notifier)))
}

/// Main application entry point
///
/// Runs until `shutdown_rx` fires or, when a capture is replayed, until the
/// replay is done.
pub async fn app(mut shutdown_rx: broadcast::Receiver<()>, options: Options) -> Result<()> {
    // the config picks the log level, so it is read before anything is logged
    let config = match ConfigWrapper::new(options.config_file.clone()) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            return Err(e);
        }
    };
    init_logging(&config.loglevel());

    info!("iec61850-bridge {} starting with config file: {}", CARGO_PKG_VERSION, options.config_file);
    config.print_summary();
    if options.replay_file.is_some() {
        config.set_replay_file(options.replay_file.clone());
    }

    info!("Initializing channels...");
    let channels = Channels::new();

    info!("Initializing components...");
    let factory = listener_factory(&config, &channels)?;
    let components = Components::start(config.clone(), channels.clone(), factory);

    match config.replay_file() {
        Some(file) => {
            let replay = Replay::new(file, channels.clone());
            tokio::select! {
                r = replay.start() => {
                    if let Err(e) = r {
                        error!("Replay failed: {}", e);
                    }
                }
                _ = shutdown_rx.recv() => info!("Shutdown signal received during replay"),
            }
        }
        None => {
            info!("Waiting for shutdown signal...");
            let _ = shutdown_rx.recv().await;
        }
    }

    info!("Stopping components...");
    components.stop().await;

    Ok(())
}
