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

//! Error type shared by the configuration loader, the generator loop and the
//! MQTT publisher.

use std::path::PathBuf;
use std::time::Duration;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
    /// The configuration file could not be read.
    #[error("could not read config file '{}': {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON or does not match the schema.
    #[error("invalid config: {0}")]
    ParseConfig(#[source] serde_json::Error),
    /// A sensor declares a range whose lower bound exceeds its upper bound.
    #[error("sensor '{sensor}' has an invalid range [{min}, {max}]: min must not exceed max")]
    InvalidRange { sensor: String, min: i64, max: i64 },
    /// The generator was given an empty sensor map.
    #[error("no sensors specified in config")]
    NoSensors,
    /// A required environment variable is not set.
    #[error("{0} not set")]
    MissingEnv(&'static str),
    #[error("invalid mqtt_port '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("mqtt_username is set but mqtt_password is missing")]
    MissingPassword,

    /// The broker refused or dropped the initial connection.
    #[error("error connecting to broker: {0}")]
    Connect(#[source] rumqttc::ConnectionError),
    #[error("no connection acknowledgement from broker within {0:?}")]
    ConnectTimeout(Duration),

    /// The publish request could not be handed to the MQTT client.
    #[error("failed to publish to '{topic}': {source}")]
    Publish {
        topic: String,
        #[source]
        source: rumqttc::ClientError,
    },
    /// The broker connection failed after startup.
    #[error("broker connection lost: {0}")]
    ConnectionLost(#[source] rumqttc::ConnectionError),
    #[error("failed to serialize reading: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl GeneratorError {
    /// Whether the error stems from the configuration file or the environment.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ReadConfig { .. }
                | Self::ParseConfig(_)
                | Self::InvalidRange { .. }
                | Self::NoSensors
                | Self::MissingEnv(_)
                | Self::InvalidPort { .. }
                | Self::MissingPassword
        )
    }

    /// Whether the error happened while establishing the broker connection.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::ConnectTimeout(_))
    }
}
