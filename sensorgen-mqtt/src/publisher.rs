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

//! Reading record and wire payload serialization.

use serde::Serialize;
use serde_json::Value;

/// One synthesized data point.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub id: String,
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
}

/// Serializes a reading into a compact JSON payload.
pub fn reading_to_payload(reading: &Reading) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(reading)
}

/// Human readable `<topic>: <payload>` line printed in verbose mode.
pub fn verbose_line(topic: &str, payload: &[u8]) -> String {
    format!("{topic}: {}", String::from_utf8_lossy(payload))
}
