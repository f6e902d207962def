//! Accept: completes the Follow handshake on both sides, adding to
//! `following` on the follower's server and `followers` on the followee's.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ActivityKind, Object};

use super::{Direction, DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if ctx.kind() != Some(ActivityKind::Accept) {
        return Ok(());
    }
    let follow_value = match ctx.pending_follow.clone() {
        Some(value) => Some(value),
        None => resolve_follow(engine, ctx)?,
    };
    let Some(follow_value) = follow_value else {
        debug!(target: "apub", "cannot resolve accepted activity, skipping");
        return Ok(());
    };
    let follow = Object::from(&follow_value);
    if !follow.type_is("Follow") {
        return Ok(());
    }
    let Some(follow_actor) = follow.get_node_iri("actor") else {
        return Ok(());
    };
    let Some(follow_object) = follow.get_node_iri("object") else {
        return Ok(());
    };

    match ctx.direction {
        Direction::Inbox => {
            // only the one the Follow addressed may accept it
            let activity = Object::from(&ctx.activity);
            if activity.get_node_iri("actor") != Some(follow_object) {
                return Err(Error::AccessDenied(
                    "Accept actor is not the followed object".to_string(),
                ));
            }
            let Some(follower) = engine.store().dereference(follow_actor)? else {
                return Ok(());
            };
            let following = engine
                .collections()
                .ensure_collection(&follower, "following", &ctx.request)?;
            engine
                .collections()
                .add_item(&following, &Value::String(follow_object.to_string()))?;
        }
        Direction::Outbox => {
            if follow_object != ctx.actor {
                return Err(Error::AccessDenied(
                    "accepted Follow does not address the sending actor".to_string(),
                ));
            }
            let Some(followee) = engine.store().dereference(follow_object)? else {
                return Ok(());
            };
            let followers = engine
                .collections()
                .ensure_collection(&followee, "followers", &ctx.request)?;
            engine
                .collections()
                .add_item(&followers, &Value::String(follow_actor.to_string()))?;
        }
    }
    Ok(())
}

fn resolve_follow(engine: &Engine, ctx: &DispatchContext) -> Result<Option<Value>> {
    match Object::from(&ctx.activity).get_value("object") {
        Some(value @ Value::Object(_)) => Ok(Some(value)),
        Some(Value::String(iri)) => match engine.store().dereference(&iri)? {
            Some(node) => Ok(Some(engine.store().to_value(&node)?)),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}
