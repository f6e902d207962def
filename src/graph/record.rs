//! Storage shape of the object graph: nodes, fields and their codec.

use std::fmt::Display;

use jiff::Timestamp;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::error::Result;

/// Surrogate identity of a node. A v7 UUID, so byte order is creation
/// order; the store leans on this for newest-first scans.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeKey(Uuid);

impl NodeKey {
    pub(crate) fn generate() -> NodeKey {
        NodeKey(Uuid::now_v7())
    }
    pub(crate) fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
    pub(crate) fn from_slice(bytes: &[u8]) -> Result<NodeKey> {
        let uuid = Uuid::from_slice(bytes).map_err(anyhow::Error::from)?;
        Ok(NodeKey(uuid))
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&base62::encode(self.0.as_u128()))
    }
}

/// Surrogate identity of a field within its owning node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FieldId(Uuid);

impl FieldId {
    pub(crate) fn generate() -> FieldId {
        FieldId(Uuid::now_v7())
    }
    pub(crate) fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
    pub(crate) fn from_slice(bytes: &[u8]) -> Result<FieldId> {
        let uuid = Uuid::from_slice(bytes).map_err(anyhow::Error::from)?;
        Ok(FieldId(uuid))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct NodeRecord {
    /// Protocol-level `id`; absent on anonymous inline sub-documents.
    pub(crate) iri: Option<String>,
    pub(crate) created: i64,
    pub(crate) updated: i64,
}

/// What a field holds: a literal scalar or a reference to another node,
/// never both. The sum type makes the exclusivity invariant
/// unrepresentable-as-wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Literal(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Reference(NodeKey),
}

impl FieldValue {
    pub fn target(&self) -> Option<NodeKey> {
        match self {
            FieldValue::Reference(target) => Some(*target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FieldRecord {
    pub(crate) name: String,
    pub(crate) value: FieldValue,
    pub(crate) created: i64,
    pub(crate) updated: i64,
}

/// A document in the object graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) key: NodeKey,
    pub(crate) record: NodeRecord,
}

impl Node {
    pub fn key(&self) -> NodeKey {
        self.key
    }
    pub fn iri(&self) -> Option<&str> {
        self.record.iri.as_deref()
    }
    pub fn created(&self) -> Timestamp {
        Timestamp::from_millisecond(self.record.created).unwrap_or(Timestamp::UNIX_EPOCH)
    }
    pub fn updated(&self) -> Timestamp {
        Timestamp::from_millisecond(self.record.updated).unwrap_or(Timestamp::UNIX_EPOCH)
    }
}

/// A named edge owned by exactly one node.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) owner: NodeKey,
    pub(crate) id: FieldId,
    pub(crate) record: FieldRecord,
}

impl Field {
    pub fn owner(&self) -> NodeKey {
        self.owner
    }
    pub fn name(&self) -> &str {
        &self.record.name
    }
    pub fn value(&self) -> &FieldValue {
        &self.record.value
    }
    pub fn target(&self) -> Option<NodeKey> {
        self.record.value.target()
    }
    pub fn created(&self) -> Timestamp {
        Timestamp::from_millisecond(self.record.created).unwrap_or(Timestamp::UNIX_EPOCH)
    }
    pub fn updated(&self) -> Timestamp {
        Timestamp::from_millisecond(self.record.updated).unwrap_or(Timestamp::UNIX_EPOCH)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub(crate) struct Header {
    version: u32,
}

impl Header {
    pub(crate) const V_1: Header = Header { version: 1 };
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let header = postcard::to_extend(&Header::V_1, Vec::new())?;
    Ok(postcard::to_extend(value, header)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (header, payload): (Header, _) = postcard::take_from_bytes(bytes)?;
    if header != Header::V_1 {
        tracing::error!(target: "graph", ?header, "unknown record version");
    }
    Ok(postcard::from_bytes(payload)?)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::{FieldRecord, FieldValue, NodeKey, NodeRecord, decode, encode};

    #[test]
    fn record_codec_round_trip() -> Result<()> {
        let node = NodeRecord {
            iri: Some("https://example.com/notes/1".to_string()),
            created: 1_700_000_000_000,
            updated: 1_700_000_000_000,
        };
        let bytes = encode(&node)?;
        let decoded: NodeRecord = decode(&bytes)?;
        assert_eq!(decoded.iri, node.iri);
        assert_eq!(decoded.created, node.created);

        let field = FieldRecord {
            name: "attributedTo".to_string(),
            value: FieldValue::Reference(NodeKey::generate()),
            created: 1_700_000_000_000,
            updated: 1_700_000_000_001,
        };
        let bytes = encode(&field)?;
        let decoded: FieldRecord = decode(&bytes)?;
        assert_eq!(decoded.name, field.name);
        assert_eq!(decoded.value, field.value);
        Ok(())
    }

    #[test]
    fn node_keys_are_time_ordered() {
        let a = NodeKey::generate();
        let b = NodeKey::generate();
        assert!(a < b);
    }
}
