//! Delete: the object is not removed, it is replaced by a Tombstone
//! remembering what it used to be.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ActivityKind, Object};

use super::{Direction, DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if ctx.kind() != Some(ActivityKind::Delete) {
        return Ok(());
    }
    let activity = Object::from(&ctx.activity);
    let Some(id) = activity.get_node_iri("object").map(str::to_string) else {
        return Ok(());
    };
    let Some(node) = engine.store().node_by_iri(&id)? else {
        debug!(target: "apub", %id, "delete target unknown, skipping");
        return Ok(());
    };
    let stored = engine.store().to_value(&node)?;
    let stored = Object::from(&stored);
    if ctx.direction == Direction::Outbox {
        let requester = ctx.requester();
        if stored.get_node_iri("attributedTo") != Some(requester.as_str()) {
            return Err(Error::AccessDenied(format!(
                "{requester} does not own {id}"
            )));
        }
    }
    let former_type = stored.get_value("type").unwrap_or(Value::Null);
    let deleted = engine.clock().now("apub.delete").to_string();
    let tombstone: Map<String, Value> = [
        ("type".to_string(), json!("Tombstone")),
        ("formerType".to_string(), former_type),
        ("deleted".to_string(), json!(deleted)),
    ]
    .into_iter()
    .collect();
    engine.store().replace(&id, &tombstone)?;
    Ok(())
}
