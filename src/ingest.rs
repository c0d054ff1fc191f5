//! Wire adapter for block records.
//!
//! The game reports blocks either flat (`{"x":..,"y":..,"z":..}`) or with a
//! nested `worldPos` object. Both are normalized here into [`BlockSample`];
//! nothing downstream ever sees the wire shape.

use crate::block::{is_air_code, is_liquid_code, BlockSample};
use crate::error::IngestError;
use crate::types::is_world_coordinate;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlock {
    world_pos: Option<WirePos>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    #[serde(default)]
    code: String,
    is_solid: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WirePos {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

impl WireBlock {
    fn into_sample(self, index: usize) -> Result<BlockSample, IngestError> {
        // worldPos takes precedence when a record carries both encodings
        let (x, y, z) = match &self.world_pos {
            Some(pos) => (pos.x, pos.y, pos.z),
            None => (self.x, self.y, self.z),
        };
        let pos = (
            coordinate(x, index, "x")?,
            coordinate(y, index, "y")?,
            coordinate(z, index, "z")?,
        );

        let solid = self
            .is_solid
            .unwrap_or_else(|| !is_air_code(&self.code) && !is_liquid_code(&self.code));

        Ok(BlockSample::new(pos, self.code, solid))
    }
}

fn coordinate(value: Option<f64>, index: usize, axis: &'static str) -> Result<i32, IngestError> {
    match value {
        Some(v) if is_world_coordinate(v) => Ok(v.floor() as i32),
        Some(_) => Err(IngestError::InvalidCoordinate { index, axis }),
        None => Err(IngestError::MissingCoordinate { index, axis }),
    }
}

/// Decodes one block record.
pub fn parse_block(index: usize, record: &Value) -> Result<BlockSample, IngestError> {
    if !record.is_object() {
        return Err(IngestError::NotAnObject { index });
    }
    let wire = WireBlock::deserialize(record).map_err(|e| IngestError::InvalidField {
        index,
        message: e.to_string(),
    })?;
    wire.into_sample(index)
}

/// Decodes a list of block records, preserving order.
pub fn parse_blocks(records: &[Value]) -> Result<Vec<BlockSample>, IngestError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_block(index, record))
        .collect()
}

/// Decodes a JSON document holding either a bare array of block records or
/// a scan response object with a `blocks` array.
pub fn parse_blocks_json(json: &str) -> Result<Vec<BlockSample>, IngestError> {
    let document: Value = serde_json::from_str(json)?;
    match &document {
        Value::Array(records) => parse_blocks(records),
        Value::Object(map) => match map.get("blocks") {
            Some(Value::Array(records)) => parse_blocks(records),
            Some(_) => Err(IngestError::InvalidField {
                index: 0,
                message: "'blocks' is not an array".to_string(),
            }),
            None => Ok(Vec::new()),
        },
        _ => Err(IngestError::NotAnObject { index: 0 }),
    }
}
