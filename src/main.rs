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

use std::env;

use anyhow::{Context, Result};
use log::{error, info};
use sensorgen_mqtt::config::DEFAULT_CONFIG_PATH;
use sensorgen_mqtt::{BrokerConfig, Generator, GeneratorConfig, MqttPublisher};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = GeneratorConfig::from_file(&path)
        .with_context(|| format!("Failed to load config from '{path}'"))?;

    if !config.has_sensors() {
        info!("no sensors specified in config, nothing to do");
        return Ok(());
    }

    let broker = BrokerConfig::from_env().context("Invalid broker configuration")?;

    info!("sending data to {} on port {}", broker.host, broker.port);
    let publisher = MqttPublisher::connect(&broker)
        .await
        .with_context(|| format!("Error connecting to host '{}:{}'", broker.host, broker.port))?;

    let mut generator = Generator::new(&config, publisher)?;

    let stopped = tokio::select! {
        result = generator.run() => match result {
            Err(err) => Some(err),
            Ok(never) => match never {},
        },
        signal = tokio::signal::ctrl_c() => {
            signal?;
            None
        }
    };

    match stopped {
        Some(err) => {
            error!("Generator stopped: {err}");
            Err(err.into())
        }
        None => {
            info!("Shutdown signal received");
            generator.into_publisher().disconnect().await;
            Ok(())
        }
    }
}
