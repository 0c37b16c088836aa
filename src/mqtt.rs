use crate::prelude::*;
use crate::coordinator::ReportStats;

use rumqttc::{AsyncClient, EventLoop, LastWill, MqttOptions, QoS};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;

const PUBLISH_ATTEMPTS: u32 = 3;

// Message {{{
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Message {
    /// Topic below the namespace.
    pub topic: String,
    pub retain: bool,
    pub payload: String,
} // }}}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ChannelData {
    Message(Message),
    Shutdown,
}

pub type Sender = broadcast::Sender<ChannelData>;

/// Publishes request messages for the platform. Outbound only: the bridge
/// subscribes to nothing.
#[derive(Clone)]
pub struct Mqtt {
    config: ConfigWrapper,
    channels: Channels,
    shared_stats: Arc<Mutex<ReportStats>>,
}

impl Mqtt {
    pub fn new(config: ConfigWrapper, channels: Channels, shared_stats: Arc<Mutex<ReportStats>>) -> Self {
        Self {
            config,
            channels,
            shared_stats,
        }
    }

    pub async fn start(&self) -> Result<()> {
        self.run(self.channels.to_mqtt.subscribe()).await
    }

    /// Like `start`, with a receiver subscribed before the first message
    /// could be sent.
    pub async fn run(&self, receiver: broadcast::Receiver<ChannelData>) -> Result<()> {
        let c = self.config.mqtt();

        if !c.enabled() {
            info!("mqtt disabled, skipping");
            return Ok(());
        }

        let mut options = MqttOptions::new(c.client_id(), c.host(), c.port());

        let will = LastWill {
            topic: self.lwt_topic(),
            message: bytes::Bytes::from("offline"),
            qos: QoS::AtLeastOnce,
            retain: true,
        };
        options.set_last_will(will);

        options.set_keep_alive(c.keep_alive());
        if let (Some(u), Some(p)) = (c.username(), c.password()) {
            options.set_credentials(u, p);
        }

        info!("initializing mqtt at {}:{}", c.host(), c.port());

        let (client, eventloop) = AsyncClient::new(options, 10);

        // the event loop only needs driving, so it is left behind once the
        // sender has seen Shutdown
        tokio::select! {
            r = self.connection(eventloop) => r?,
            r = async {
                self.setup(client.clone()).await?;
                self.sender(client, receiver).await
            } => r?,
        }

        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        info!("Stopping MQTT client...");
        let _ = self.channels.to_mqtt.send(ChannelData::Shutdown);
        Ok(())
    }

    async fn setup(&self, client: AsyncClient) -> Result<()> {
        client
            .publish(self.lwt_topic(), QoS::AtLeastOnce, true, "online")
            .await?;

        Ok(())
    }

    // keeps the connection alive; rumqttc reconnects on the next poll
    async fn connection(&self, mut eventloop: EventLoop) -> Result<()> {
        loop {
            if let Err(e) = eventloop.poll().await {
                error!("{}", e);
                info!("reconnecting in 5s");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    }

    // notifier -> mqtt
    async fn sender(&self, client: AsyncClient, mut receiver: broadcast::Receiver<ChannelData>) -> Result<()> {
        use ChannelData::*;

        while let Some(data) = next_message(&mut receiver).await {
            match data {
                Shutdown => {
                    info!("MQTT sender received shutdown signal");
                    let _ = client.disconnect().await;
                    break;
                }
                Message(message) => self.publish(&client, message).await,
            }
        }

        info!("MQTT sender loop exiting");
        Ok(())
    }

    async fn publish(&self, client: &AsyncClient, message: Message) {
        let topic = format!("{}/{}", self.config.mqtt().namespace(), message.topic);
        debug!("publishing: {} = {}", topic, message.payload);

        for attempt in 1..=PUBLISH_ATTEMPTS {
            match client
                .publish(&topic, QoS::AtLeastOnce, message.retain, message.payload.as_bytes())
                .await
            {
                Ok(_) => {
                    if let Ok(mut stats) = self.shared_stats.lock() {
                        stats.mqtt_messages_sent += 1;
                    }
                    return;
                }
                Err(err) => {
                    error!(
                        "MQTT publish to {} failed: {:?} (attempt {}/{})",
                        topic, err, attempt, PUBLISH_ATTEMPTS
                    );
                    if let Ok(mut stats) = self.shared_stats.lock() {
                        stats.mqtt_errors += 1;
                    }
                    if attempt < PUBLISH_ATTEMPTS {
                        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
                    }
                }
            }
        }

        error!("giving up on {} after {} attempts", topic, PUBLISH_ATTEMPTS);
    }

    fn lwt_topic(&self) -> String {
        format!("{}/LWT", self.config.mqtt().namespace())
    }
}

/// Next message for the publisher. A lagging receiver skips what it missed
/// and carries on; None once every sender is gone.
async fn next_message(receiver: &mut broadcast::Receiver<ChannelData>) -> Option<ChannelData> {
    loop {
        match receiver.recv().await {
            Ok(data) => return Some(data),
            Err(RecvError::Lagged(n)) => warn!("mqtt sender lagged, {} messages lost", n),
            Err(RecvError::Closed) => return None,
        }
    }
}
