// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! MQTT implementation of the [`Publish`] trait.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, Incoming, MqttOptions, Outgoing, QoS};
use tokio::task::JoinHandle;

use crate::config::BrokerConfig;
use crate::error::{GeneratorError, Result};
use crate::generator::Publish;

/// Publishes readings to a single topic over one broker connection.
///
/// The connection is established in [`MqttPublisher::connect`]; after that a
/// background task drives the rumqttc event loop. That task stops on the
/// first connection error and is not restarted, so every later publish fails
/// with [`GeneratorError::ConnectionLost`].
pub struct MqttPublisher {
    client_id: String,
    topic: String,
    client: AsyncClient,
    /// Event loop driver. Yields the error that ended it, `None` after a
    /// clean disconnect.
    driver: Option<JoinHandle<Option<ConnectionError>>>,
}

impl MqttPublisher {
    /// Connects to the broker and waits for its acknowledgement.
    pub async fn connect(config: &BrokerConfig) -> Result<Self> {
        info!(
            "[{}] Connecting to MQTT broker at {}:{}",
            config.client_id, config.host, config.port
        );

        let mut mqtt_opts = MqttOptions::new(&config.client_id, &config.host, config.port);
        mqtt_opts.set_keep_alive(config.keep_alive);

        if let Some(user) = &config.username {
            mqtt_opts.set_credentials(user, config.password.as_deref().unwrap_or_default());
        }

        let (client, mut eventloop) = AsyncClient::new(mqtt_opts, 100);

        tokio::time::timeout(config.connect_timeout, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| GeneratorError::ConnectTimeout(config.connect_timeout))??;

        info!("[{}] Connected, publishing to '{}'", config.client_id, config.topic);

        let driver = tokio::spawn(drive(eventloop, config.client_id.clone()));

        Ok(Self {
            client_id: config.client_id.clone(),
            topic: config.topic.clone(),
            client,
            driver: Some(driver),
        })
    }

    /// Sends a disconnect to the broker and waits briefly for it to go out.
    pub async fn disconnect(mut self) {
        if let Err(e) = self.client.disconnect().await {
            warn!("[{}] Failed to request disconnect: {e}", self.client_id);
        }
        if let Some(driver) = self.driver.take() {
            if tokio::time::timeout(Duration::from_secs(1), driver).await.is_err() {
                debug!("[{}] Event loop did not finish after disconnect", self.client_id);
            }
        }
    }

    async fn connection_lost(&mut self) -> GeneratorError {
        let reason = match self.driver.take() {
            Some(driver) => driver.await.ok().flatten(),
            None => None,
        };
        GeneratorError::ConnectionLost(reason.unwrap_or_else(|| {
            ConnectionError::Io(std::io::Error::other("MQTT event loop stopped"))
        }))
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<()> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                debug!("Received ConnAck: {ack:?}");
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => return Err(GeneratorError::Connect(e)),
        }
    }
}

async fn drive(mut eventloop: EventLoop, client_id: String) -> Option<ConnectionError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                info!("[{client_id}] Disconnected from broker");
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                error!("[{client_id}] MQTT connection error: {e}");
                return Some(e);
            }
        }
    }
}

#[async_trait]
impl Publish for MqttPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&mut self, payload: Vec<u8>) -> Result<()> {
        let running = self
            .driver
            .as_ref()
            .is_some_and(|driver| !driver.is_finished());
        if !running {
            return Err(self.connection_lost().await);
        }

        self.client
            .publish(&self.topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|source| GeneratorError::Publish {
                topic: self.topic.clone(),
                source,
            })
    }
}
