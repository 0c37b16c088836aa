use crate::prelude::*;

use crate::iec61850::Report;
use crate::listener::{ClientEventListener, Listener, ListenerFactory, ReportOutcome};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;

#[derive(Default, Debug, Clone)]
pub struct ReportStats {
    pub reports_received: u64,
    pub reports_forwarded: u64,
    pub reports_buffered: u64,
    pub reports_stale: u64,
    pub reports_unknown_dataset: u64,
    pub reports_empty: u64,
    pub reports_unassociated: u64,
    pub reports_after_close: u64,
    pub delivery_failures: u64,
    pub measurements_forwarded: u64,
    pub events_buffered: u64,
    pub events_flushed: u64,
    // Association stats
    pub associations_opened: u64,
    pub associations_rejected: u64,
    pub associations_closed: HashMap<String, u64>,
    // Upstream
    pub mqtt_messages_sent: u64,
    pub mqtt_errors: u64,
}

impl ReportStats {
    pub fn record(&mut self, outcome: ReportOutcome) {
        self.reports_received += 1;
        match outcome {
            ReportOutcome::Forwarded(n) => {
                self.reports_forwarded += 1;
                self.measurements_forwarded += n as u64;
            }
            ReportOutcome::Buffered(n) => {
                self.reports_buffered += 1;
                self.events_buffered += n as u64;
            }
            ReportOutcome::Stale => self.reports_stale += 1,
            ReportOutcome::UnknownDataset => self.reports_unknown_dataset += 1,
            ReportOutcome::Empty => self.reports_empty += 1,
            ReportOutcome::DeliveryFailed => self.delivery_failures += 1,
            ReportOutcome::Closed => self.reports_after_close += 1,
        }
    }

    pub fn print_summary(&self) {
        info!("Report Statistics:");
        info!("  Total reports received: {}", self.reports_received);
        info!("    Forwarded: {}", self.reports_forwarded);
        info!("    Buffered: {}", self.reports_buffered);
        info!("    Stale (below sqNum baseline): {}", self.reports_stale);
        info!("    Unknown dataset: {}", self.reports_unknown_dataset);
        info!("    Empty dataset: {}", self.reports_empty);
        info!("    Without association: {}", self.reports_unassociated);
        info!("    After close: {}", self.reports_after_close);
        info!("    Delivery failures: {}", self.delivery_failures);
        info!("  Measurements forwarded: {}", self.measurements_forwarded);
        info!("  Events buffered: {}", self.events_buffered);
        info!("  Events flushed: {}", self.events_flushed);
        info!("  MQTT:");
        info!("    Messages sent: {}", self.mqtt_messages_sent);
        info!("    Errors: {}", self.mqtt_errors);
        info!("  Associations:");
        info!("    Opened: {}", self.associations_opened);
        info!("    Rejected: {}", self.associations_rejected);
        info!("    Closed by device:");
        for (device, count) in &self.associations_closed {
            info!("      {}: {}", device, count);
        }
    }
}

/// Keeps one listener per live association and routes transport messages
/// to it.
#[derive(Clone)]
pub struct Coordinator {
    config: ConfigWrapper,
    channels: Channels,
    factory: ListenerFactory,
    listeners: Arc<Mutex<HashMap<String, Arc<Listener>>>>,
    pub stats: Arc<Mutex<ReportStats>>,
}

impl Coordinator {
    pub fn new(config: ConfigWrapper, channels: Channels, factory: ListenerFactory) -> Self {
        Self {
            config,
            channels,
            factory,
            listeners: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(ReportStats::default())),
        }
    }

    pub async fn start(&self) -> Result<()> {
        self.run(self.channels.from_transport.subscribe()).await
    }

    /// Like `start`, with a receiver subscribed before any message was sent.
    pub async fn run(&self, mut receiver: broadcast::Receiver<transport::ChannelData>) -> Result<()> {
        use transport::ChannelData;

        loop {
            let message = match receiver.recv().await {
                Ok(message) => message,
                Err(RecvError::Lagged(n)) => {
                    warn!("coordinator lagged, {} transport messages lost", n);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            match message {
                ChannelData::Associated { device, sq_num } => {
                    if let Err(e) = self.associated(&device, sq_num) {
                        error!("{}", e);
                    }
                }
                ChannelData::Report(report) => {
                    let _ = self.report(&report);
                }
                ChannelData::AssociationClosed { device, cause } => {
                    self.association_closed(&device, cause.as_deref());
                }
                ChannelData::Shutdown => {
                    info!("Received shutdown signal, closing open associations");
                    self.close_all();
                    info!("Final statistics:");
                    self.print_summary();
                    break;
                }
            }
        }

        Ok(())
    }

    pub fn stop(&self) {
        let _ = self.channels.from_transport.send(transport::ChannelData::Shutdown);
    }

    /// Sets up the listener for a new association. An existing association
    /// for the same device is closed first.
    pub fn associated(&self, device: &str, sq_num: u32) -> Result<()> {
        if self.listener(device).is_some() {
            warn!("device {}: associated again without close, closing previous association", device);
            self.association_closed(device, Some("superseded by new association"));
        }

        let listener = match self.factory.create(device, &self.config) {
            Ok(listener) => listener,
            Err(e) => {
                self.with_stats(|s| s.associations_rejected += 1);
                bail!("device {}: cannot create listener: {}", device, e);
            }
        };
        listener.set_sq_num(sq_num);

        self.lock_listeners().insert(device.to_string(), Arc::new(listener));
        self.with_stats(|s| s.associations_opened += 1);

        Ok(())
    }

    /// Routes a report to its device's listener. `None` when the device has
    /// no live association.
    pub fn report(&self, report: &Report) -> Option<ReportOutcome> {
        let listener = match self.listener(&report.device_identification) {
            Some(listener) => listener,
            None => {
                warn!(
                    "device {}: report {} without association, dropping",
                    report.device_identification, report.rpt_id
                );
                self.with_stats(|s| s.reports_unassociated += 1);
                return None;
            }
        };

        let outcome = listener.new_report(report);
        self.with_stats(|s| s.record(outcome));

        Some(outcome)
    }

    pub fn association_closed(&self, device: &str, cause: Option<&str>) {
        let listener = self.lock_listeners().remove(device);

        match listener {
            Some(listener) => {
                let flushed = listener.association_closed(cause);
                self.with_stats(|s| {
                    s.events_flushed += flushed as u64;
                    *s.associations_closed.entry(device.to_string()).or_insert(0) += 1;
                });
            }
            None => debug!("device {}: close for unknown association", device),
        }
    }

    pub fn close_all(&self) {
        let devices: Vec<String> = self.lock_listeners().keys().cloned().collect();
        for device in devices {
            self.association_closed(&device, Some("shutdown"));
        }
    }

    pub fn live_associations(&self) -> usize {
        self.lock_listeners().len()
    }

    pub fn print_summary(&self) {
        if let Ok(stats) = self.stats.lock() {
            stats.print_summary();
        }
    }

    fn listener(&self, device: &str) -> Option<Arc<Listener>> {
        self.lock_listeners().get(device).cloned()
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Listener>>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_stats<F: FnOnce(&mut ReportStats)>(&self, f: F) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }
}
