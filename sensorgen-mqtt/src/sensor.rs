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

//! Sensor definitions and value sampling.

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GeneratorError, Result};
use crate::publisher::Reading;

/// Range used when a sensor does not declare one.
pub const DEFAULT_RANGE: [i64; 2] = [0, 100];

/// Static description of one simulated sensor.
///
/// The descriptive fields are copied into every reading verbatim; a JSON
/// `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SensorDefinition {
    /// Inclusive `[min, max]` value range (default: `[0, 100]`).
    pub range: Option<[i64; 2]>,
    pub lat: Option<Value>,
    pub lng: Option<Value>,
    pub unit: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    pub description: Option<Value>,
}

impl SensorDefinition {
    /// Effective `(min, max)` bounds with the default range applied.
    pub fn bounds(&self) -> (i64, i64) {
        let [min, max] = self.range.unwrap_or(DEFAULT_RANGE);
        (min, max)
    }

    /// Rejects ranges whose lower bound exceeds the upper bound.
    pub fn validate(&self, id: &str) -> Result<()> {
        let (min, max) = self.bounds();
        if min > max {
            return Err(GeneratorError::InvalidRange {
                sensor: id.to_string(),
                min,
                max,
            });
        }
        Ok(())
    }

    /// Draws one reading for the sensor registered under `id`.
    pub fn sample<R: Rng + ?Sized>(&self, id: &str, rng: &mut R) -> Result<Reading> {
        self.validate(id)?;
        let (min, max) = self.bounds();

        Ok(Reading {
            id: id.to_string(),
            value: rng.random_range(min..=max),
            lat: self.lat.clone(),
            lng: self.lng.clone(),
            unit: self.unit.clone(),
            kind: self.kind.clone(),
            description: self.description.clone(),
        })
    }
}
