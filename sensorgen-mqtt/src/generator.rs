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

//! The sample generator loop.
//!
//! Each iteration picks a sensor uniformly at random, samples a value from
//! its range, publishes the JSON payload and then sleeps for the configured
//! interval. Publish failures end the loop; there is no retry.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::publisher::{self, Reading};
use crate::sensor::SensorDefinition;

/// Sink for serialized readings, bound to a single topic.
#[async_trait]
pub trait Publish: Send {
    /// Topic every payload goes to.
    fn topic(&self) -> &str;

    /// Hands one payload to the broker.
    async fn publish(&mut self, payload: Vec<u8>) -> Result<()>;
}

pub struct Generator<P, R = StdRng> {
    sensors: BTreeMap<String, SensorDefinition>,
    ids: Vec<String>,
    interval: Duration,
    verbose: bool,
    publisher: P,
    rng: R,
}

impl<P: Publish> Generator<P, StdRng> {
    /// Create a generator seeded from the operating system.
    pub fn new(config: &GeneratorConfig, publisher: P) -> Result<Self> {
        Self::with_rng(config, publisher, StdRng::from_os_rng())
    }
}

impl<P: Publish, R: Rng> Generator<P, R> {
    /// Create a generator with an explicit random source.
    ///
    /// Fails with [`GeneratorError::NoSensors`] on an empty sensor map and
    /// with [`GeneratorError::InvalidRange`] on an inverted range.
    pub fn with_rng(config: &GeneratorConfig, publisher: P, rng: R) -> Result<Self> {
        if !config.has_sensors() {
            return Err(GeneratorError::NoSensors);
        }
        config.validate()?;

        Ok(Self {
            sensors: config.sensors.clone(),
            ids: config.sensors.keys().cloned().collect(),
            interval: config.interval(),
            verbose: config.misc.verbose,
            publisher,
            rng,
        })
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn into_publisher(self) -> P {
        self.publisher
    }

    /// Samples one reading and publishes it.
    pub async fn step(&mut self) -> Result<Reading> {
        let id = self
            .ids
            .choose(&mut self.rng)
            .ok_or(GeneratorError::NoSensors)?;
        let reading = self.sensors[id].sample(id, &mut self.rng)?;

        let payload = publisher::reading_to_payload(&reading).map_err(GeneratorError::Serialize)?;
        if self.verbose {
            println!("{}", publisher::verbose_line(self.publisher.topic(), &payload));
        }
        debug!("Publishing reading for sensor '{}'", reading.id);

        self.publisher.publish(payload).await?;
        Ok(reading)
    }

    /// Publishes readings forever, sleeping `interval` between them.
    ///
    /// Only returns when a step fails.
    pub async fn run(&mut self) -> Result<Infallible> {
        info!(
            "Generating readings for {} sensor(s) every {:?} on topic '{}'",
            self.ids.len(),
            self.interval,
            self.publisher.topic()
        );
        loop {
            self.step().await?;
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::collections::HashMap;

    /// Records payloads and fails once `limit` payloads were accepted.
    struct RecordingPublisher {
        topic: String,
        payloads: Vec<Vec<u8>>,
        limit: usize,
    }

    impl RecordingPublisher {
        fn new(limit: usize) -> Self {
            Self {
                topic: "sensors".to_string(),
                payloads: Vec::new(),
                limit,
            }
        }

        fn parsed(&self) -> Vec<Value> {
            self.payloads
                .iter()
                .map(|p| serde_json::from_slice(p).unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl Publish for RecordingPublisher {
        fn topic(&self) -> &str {
            &self.topic
        }

        async fn publish(&mut self, payload: Vec<u8>) -> Result<()> {
            if self.payloads.len() >= self.limit {
                return Err(GeneratorError::ConnectionLost(rumqttc::ConnectionError::Io(
                    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
                )));
            }
            self.payloads.push(payload);
            Ok(())
        }
    }

    fn generator(raw: &str, limit: usize) -> Generator<RecordingPublisher, StdRng> {
        let config = GeneratorConfig::from_json(raw).unwrap();
        Generator::with_rng(&config, RecordingPublisher::new(limit), StdRng::seed_from_u64(42))
            .unwrap()
    }

    #[test]
    fn test_empty_sensors_rejected() {
        let config = GeneratorConfig::from_json(r#"{"sensors": {}}"#).unwrap();
        let result = Generator::new(&config, RecordingPublisher::new(1));
        assert!(matches!(result, Err(GeneratorError::NoSensors)));
    }

    #[tokio::test]
    async fn test_constant_sensor_payload() {
        let mut gen = generator(
            r#"{"misc": {"interval_ms": 0}, "sensors": {"s1": {"range": [10, 10]}}}"#,
            50,
        );
        for _ in 0..50 {
            gen.step().await.unwrap();
        }

        let publisher = gen.into_publisher();
        assert_eq!(publisher.payloads.len(), 50);
        for payload in &publisher.payloads {
            assert_eq!(payload.as_slice(), br#"{"id":"s1","value":10}"#);
        }
    }

    #[tokio::test]
    async fn test_temperature_sensor_payload() {
        let mut gen = generator(
            r#"{"misc": {"interval_ms": 0}, "sensors": {
                "temp": {"range": [20, 25], "unit": "C", "type": "temperature"}
            }}"#,
            200,
        );
        for _ in 0..200 {
            gen.step().await.unwrap();
        }

        for record in gen.publisher().parsed() {
            let obj = record.as_object().unwrap();
            let value = obj["value"].as_i64().unwrap();
            assert!((20..=25).contains(&value));
            assert_eq!(obj["id"], "temp");
            assert_eq!(obj["unit"], "C");
            assert_eq!(obj["type"], "temperature");
            assert!(!obj.contains_key("lat"));
            assert!(!obj.contains_key("lng"));
            assert!(!obj.contains_key("description"));
        }
    }

    #[tokio::test]
    async fn test_keys_match_definition() {
        let mut gen = generator(
            r#"{"sensors": {
                "a": {"lat": 1, "lng": 2},
                "b": {"description": "door", "unit": null},
                "c": {}
            }}"#,
            300,
        );
        for _ in 0..300 {
            gen.step().await.unwrap();
        }

        for record in gen.publisher().parsed() {
            let obj = record.as_object().unwrap();
            let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            keys.sort_unstable();
            let expected: &[&str] = match obj["id"].as_str().unwrap() {
                "a" => &["id", "lat", "lng", "value"],
                "b" => &["description", "id", "value"],
                "c" => &["id", "value"],
                other => panic!("unexpected sensor {other}"),
            };
            assert_eq!(keys, expected);
            assert!(obj.values().all(|v| !v.is_null()));
        }
    }

    #[tokio::test]
    async fn test_sensor_selection_covers_all_ids() {
        let mut gen = generator(r#"{"sensors": {"a": {}, "b": {}, "c": {}}}"#, 3_000);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..3_000 {
            let reading = gen.step().await.unwrap();
            *counts.entry(reading.id).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&n| n > 800), "skewed selection: {counts:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_first_publish_error() {
        let mut gen = generator(
            r#"{"misc": {"interval_ms": 500}, "sensors": {"s1": {}}}"#,
            4,
        );
        let started = tokio::time::Instant::now();

        let err = match gen.run().await {
            Err(err) => err,
            Ok(never) => match never {},
        };

        assert!(matches!(err, GeneratorError::ConnectionLost(_)));
        assert_eq!(gen.publisher().payloads.len(), 4);
        assert!(started.elapsed() >= Duration::from_millis(4 * 500));
    }
}
