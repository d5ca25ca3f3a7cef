use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use crate::vec2::Vec2;

// Envelope wraps all messages
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    pub t: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<serde_json::Value>,
    // Request id, echoed back on the matching "reply"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed json frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed msgpack frame: {0}")]
    MsgPack(#[from] rmp_serde::decode::Error),
    #[error("unknown message type {0:?}")]
    UnknownMessage(String),
    #[error("{0:?} message without payload")]
    MissingPayload(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Shoot,
    Sprint,
}

/// Held movement keys as the server sees them for one player.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    pub sprint: bool,
}

/// Server -> Client: authoritative state for one entity. `type` is only sent
/// the first time an id is seen.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: u32,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub pos: Vec2,
    pub vel: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rot_vel: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeyState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<u32>,
}

/// Decodes a `set` payload entry by entry. Older servers send one snapshot
/// object, newer ones an array; entries that do not decode are logged and
/// dropped without losing the rest of the batch.
fn decode_snapshots(d: Value) -> Vec<Snapshot> {
    let entries = match d {
        Value::Array(entries) => entries,
        single => vec![single],
    };
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<Snapshot>(entry) {
            Ok(snap) => Some(snap),
            Err(e) => {
                log::warn!("skipping snapshot {} in set: {}", i, e);
                None
            }
        })
        .collect()
}

#[derive(Deserialize)]
struct IdPayload {
    id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Ready,
    Set(Vec<Snapshot>),
    Despawn(u32),
    /// Reply to `get_id`.
    AssignedId { rid: Option<u64>, id: u32 },
}

impl ServerMessage {
    pub fn from_envelope(env: Envelope) -> Result<Self, ProtocolError> {
        let Envelope { t, d, rid } = env;
        match t.as_str() {
            "ready" => Ok(ServerMessage::Ready),
            "set" => {
                let d = d.ok_or_else(|| ProtocolError::MissingPayload(t.clone()))?;
                Ok(ServerMessage::Set(decode_snapshots(d)))
            }
            "despawn" => {
                let d = d.ok_or_else(|| ProtocolError::MissingPayload(t.clone()))?;
                let p: IdPayload = serde_json::from_value(d)?;
                Ok(ServerMessage::Despawn(p.id))
            }
            "reply" => {
                let d = d.ok_or_else(|| ProtocolError::MissingPayload(t.clone()))?;
                let p: IdPayload = serde_json::from_value(d)?;
                Ok(ServerMessage::AssignedId { rid, id: p.id })
            }
            _ => Err(ProtocolError::UnknownMessage(t)),
        }
    }

    pub fn decode_text(text: &str) -> Result<Self, ProtocolError> {
        Self::from_envelope(serde_json::from_str(text)?)
    }

    /// Binary frames carry the same envelope as MessagePack.
    pub fn decode_binary(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Self::from_envelope(rmp_serde::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    GetId { name: Option<String> },
    KeyDown(Action),
    KeyUp(Action),
}

impl ClientMessage {
    pub fn to_envelope(&self, rid: Option<u64>) -> Envelope {
        let (t, d) = match self {
            ClientMessage::GetId { name: Some(name) } => ("get_id", json!({ "name": name })),
            ClientMessage::GetId { name: None } => ("get_id", json!({})),
            ClientMessage::KeyDown(key) => ("keydown", json!({ "key": key })),
            ClientMessage::KeyUp(key) => ("keyup", json!({ "key": key })),
        };
        Envelope { t: t.to_string(), d: Some(d), rid }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_set_batch_with_optional_fields() {
        let text = r#"{"t":"set","d":[
            {"id":1,"type":"player","pos":{"x":0,"y":0},"vel":{"x":0,"y":0},"rot":0,"rotVel":0.5,
             "keys":{"up":true},"health":100,"name":"ace"},
            {"id":2,"pos":{"x":3,"y":4},"vel":{"x":1,"y":0},"ownerId":1}
        ]}"#;
        let ServerMessage::Set(snaps) = ServerMessage::decode_text(text).unwrap() else {
            panic!("expected set");
        };
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].kind.as_deref(), Some("player"));
        assert_eq!(snaps[0].rot_vel, Some(0.5));
        assert_eq!(snaps[0].keys, Some(KeyState { up: true, ..KeyState::default() }));
        assert_eq!(snaps[0].name.as_deref(), Some("ace"));
        assert_eq!(snaps[1].kind, None);
        assert_eq!(snaps[1].owner_id, Some(1));
        assert_eq!(snaps[1].pos, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn decodes_single_snapshot_set() {
        let text = r#"{"t":"set","d":{"id":9,"type":"bullet","pos":{"x":1,"y":2},"vel":{"x":0,"y":0}}}"#;
        let msg = ServerMessage::decode_text(text).unwrap();
        assert!(matches!(msg, ServerMessage::Set(ref s) if s.len() == 1 && s[0].id == 9));
    }

    #[test]
    fn decodes_despawn_ready_and_reply() {
        assert_eq!(ServerMessage::decode_text(r#"{"t":"ready"}"#).unwrap(), ServerMessage::Ready);
        assert_eq!(
            ServerMessage::decode_text(r#"{"t":"despawn","d":{"id":4}}"#).unwrap(),
            ServerMessage::Despawn(4)
        );
        assert_eq!(
            ServerMessage::decode_text(r#"{"t":"reply","rid":3,"d":{"id":12}}"#).unwrap(),
            ServerMessage::AssignedId { rid: Some(3), id: 12 }
        );
    }

    #[test]
    fn rejects_unknown_and_malformed_frames() {
        assert!(matches!(
            ServerMessage::decode_text(r#"{"t":"chat","d":{}}"#),
            Err(ProtocolError::UnknownMessage(t)) if t == "chat"
        ));
        assert!(matches!(
            ServerMessage::decode_text(r#"{"t":"despawn"}"#),
            Err(ProtocolError::MissingPayload(_))
        ));
        assert!(matches!(ServerMessage::decode_text("not json"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn bad_entry_does_not_drop_the_rest_of_the_batch() {
        let text = r#"{"t":"set","d":[
            {"id":1,"type":"player","pos":{"x":1,"y":2},"vel":{"x":0,"y":0},"health":80},
            {"id":2,"type":"player","pos":{"x":0,"y":0},"vel":{"x":0,"y":0},"health":99.5},
            {"id":3,"type":"bullet","vel":{"x":0,"y":0}}
        ]}"#;
        let ServerMessage::Set(snaps) = ServerMessage::decode_text(text).unwrap() else {
            panic!("expected set");
        };
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].id, 1);
        assert_eq!(snaps[0].health, Some(80));
    }

    #[test]
    fn decodes_msgpack_envelope() {
        let env = Envelope { t: "despawn".into(), d: Some(json!({ "id": 7 })), rid: None };
        let bytes = rmp_serde::to_vec_named(&env).unwrap();
        assert_eq!(ServerMessage::decode_binary(&bytes).unwrap(), ServerMessage::Despawn(7));
    }

    #[test]
    fn encodes_client_messages() {
        let env = ClientMessage::KeyDown(Action::Sprint).to_envelope(None);
        assert_eq!(serde_json::to_string(&env).unwrap(), r#"{"t":"keydown","d":{"key":"sprint"}}"#);

        let env = ClientMessage::GetId { name: Some("ace".into()) }.to_envelope(Some(1));
        assert_eq!(serde_json::to_string(&env).unwrap(), r#"{"t":"get_id","d":{"name":"ace"},"rid":1}"#);

        let env = ClientMessage::GetId { name: None }.to_envelope(Some(2));
        assert_eq!(env.d, Some(json!({})));
    }
}
