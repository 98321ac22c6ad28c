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

//! Synthetic sensor data generator publishing to an MQTT broker.
//!
//! Reads a set of sensor definitions, then repeatedly picks a random sensor,
//! samples an integer from its range and publishes a JSON reading such as
//! `{"id":"temp","value":22,"unit":"C"}` to a single topic.
//!
//! # Example
//!
//! ```ignore
//! use sensorgen_mqtt::{BrokerConfig, Generator, GeneratorConfig, MqttPublisher};
//!
//! let config = GeneratorConfig::from_file("config.json")?;
//! let broker = BrokerConfig::builder("broker.local", "sensors")
//!     .port(1883)
//!     .build();
//!
//! let publisher = MqttPublisher::connect(&broker).await?;
//! let mut generator = Generator::new(&config, publisher)?;
//! generator.run().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod publisher;
pub mod sensor;

pub use client::MqttPublisher;
pub use config::{BrokerConfig, BrokerConfigBuilder, GeneratorConfig, MiscConfig};
pub use error::{GeneratorError, Result};
pub use generator::{Generator, Publish};
pub use publisher::Reading;
pub use sensor::SensorDefinition;
