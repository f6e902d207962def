use serde_json::{Value, json};

use crate::json_ld::ACTIVITY_STREAMS_NS;

use super::Object;

/// Document scaffolding for a locally hosted actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor<'a>(Object<'a>);

impl Actor<'_> {
    /// A minimal Person document with the conventional inbox/outbox and
    /// follower collection IRIs under `base_url`.
    pub fn minimal(base_url: &str, preferred_username: &str) -> Actor<'static> {
        let base_url = base_url.trim_end_matches('/');
        let id = format!("{base_url}/users/{preferred_username}");
        Actor(Object::from(json!({
            "@context": ACTIVITY_STREAMS_NS,
            "type": "Person",
            "id": id,
            "preferredUsername": preferred_username,
            "inbox": format!("{id}/inbox"),
            "outbox": format!("{id}/outbox"),
            "followers": format!("{id}/followers"),
            "following": format!("{id}/following"),
        })))
    }

    pub fn iri(&self) -> Option<&str> {
        self.0.id()
    }

    pub fn to_value(&self) -> Value {
        self.0.to_value()
    }
}

impl From<Actor<'_>> for Value {
    fn from(value: Actor) -> Self {
        value.0.into()
    }
}
