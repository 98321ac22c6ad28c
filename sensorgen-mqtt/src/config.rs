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

//! Configuration types for the sensor generator.
//!
//! Sensor definitions and loop settings come from a JSON file, broker
//! connection settings from the environment.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GeneratorError, Result};
use crate::sensor::SensorDefinition;

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

fn default_interval_ms() -> u64 {
    500
}

/// Loop settings found under the `misc` key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MiscConfig {
    /// Pause between two publishes in milliseconds (default: 500).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Print every payload to stdout (default: false).
    #[serde(default)]
    pub verbose: bool,
}

impl Default for MiscConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            verbose: false,
        }
    }
}

/// Contents of the generator config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub misc: MiscConfig,
    /// Sensor definitions keyed by sensor id.
    #[serde(default)]
    pub sensors: BTreeMap<String, SensorDefinition>,
}

impl GeneratorConfig {
    /// Reads and validates a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| GeneratorError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses and validates config from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self> {
        // `"sensors": null` is treated like a missing key.
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            misc: Option<MiscConfig>,
            #[serde(default)]
            sensors: Option<BTreeMap<String, SensorDefinition>>,
        }

        let parsed: Raw = serde_json::from_str(raw).map_err(GeneratorError::ParseConfig)?;
        let config = Self {
            misc: parsed.misc.unwrap_or_default(),
            sensors: parsed.sensors.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every sensor range.
    pub fn validate(&self) -> Result<()> {
        self.sensors
            .iter()
            .try_for_each(|(id, sensor)| sensor.validate(id))
    }

    pub fn has_sensors(&self) -> bool {
        !self.sensors.is_empty()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.misc.interval_ms)
    }
}

/// Connection settings for the MQTT broker.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerConfig {
    /// MQTT broker hostname or IP.
    pub host: String,
    /// MQTT broker port (default: 1883).
    pub port: u16,
    /// Topic every reading is published to.
    pub topic: String,
    /// MQTT client ID. Defaults to `"sensorgen-<uuid>"`.
    pub client_id: String,
    /// Optional MQTT username for authentication.
    pub username: Option<String>,
    /// MQTT password, required when a username is set.
    pub password: Option<String>,
    pub keep_alive: Duration,
    /// How long to wait for the broker's connection acknowledgement.
    pub connect_timeout: Duration,
}

impl BrokerConfig {
    /// Start building a new config with the required fields.
    pub fn builder(host: impl Into<String>, topic: impl Into<String>) -> BrokerConfigBuilder {
        BrokerConfigBuilder {
            host: host.into(),
            topic: topic.into(),
            port: 1883,
            client_id: default_client_id(),
            username: None,
            password: None,
            keep_alive: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Reads `mqtt_host`, `mqtt_port`, `mqtt_topic`, `mqtt_username`,
    /// `mqtt_password` and `mqtt_client_id` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same rules as [`BrokerConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let required = |key: &'static str| non_empty(key).ok_or(GeneratorError::MissingEnv(key));

        let host = required("mqtt_host")?;
        let raw_port = required("mqtt_port")?;
        let port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|source| GeneratorError::InvalidPort {
                value: raw_port.clone(),
                source,
            })?;
        let topic = required("mqtt_topic")?;

        let mut builder = Self::builder(host, topic).port(port);
        if let Some(client_id) = non_empty("mqtt_client_id") {
            builder = builder.client_id(client_id);
        }
        if let Some(username) = non_empty("mqtt_username") {
            let password = lookup("mqtt_password").ok_or(GeneratorError::MissingPassword)?;
            builder = builder.username(username).password(password);
        }

        Ok(builder.build())
    }
}

fn default_client_id() -> String {
    format!("sensorgen-{}", uuid::Uuid::new_v4())
}

/// Builder for [`BrokerConfig`].
pub struct BrokerConfigBuilder {
    host: String,
    topic: String,
    port: u16,
    client_id: String,
    username: Option<String>,
    password: Option<String>,
    keep_alive: Duration,
    connect_timeout: Duration,
}

impl BrokerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build the config.
    pub fn build(self) -> BrokerConfig {
        BrokerConfig {
            host: self.host,
            port: self.port,
            topic: self.topic,
            client_id: self.client_id,
            username: self.username,
            password: self.password,
            keep_alive: self.keep_alive,
            connect_timeout: self.connect_timeout,
        }
    }
}
