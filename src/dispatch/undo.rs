//! Undo: reverses a prior Follow or Like by removing the corresponding
//! collection entry. Only the original actor may undo an activity.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ActivityKind, Object};

use super::{Direction, DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if ctx.kind() != Some(ActivityKind::Undo) {
        return Ok(());
    }
    let undone_value = match Object::from(&ctx.activity).get_value("object") {
        Some(value @ Value::Object(_)) => Some(value),
        Some(Value::String(iri)) => match engine.store().dereference(&iri)? {
            Some(node) => Some(engine.store().to_value(&node)?),
            None => None,
        },
        _ => None,
    };
    let Some(undone_value) = undone_value else {
        debug!(target: "apub", "cannot resolve undone activity, skipping");
        return Ok(());
    };
    let undone = Object::from(&undone_value);
    let requester = ctx.requester();
    if undone.get_node_iri("actor") != Some(requester.as_str()) {
        return Err(Error::AccessDenied(format!(
            "{requester} may not undo another actor's activity"
        )));
    }
    match ActivityKind::from_object(&undone) {
        Some(ActivityKind::Follow) => undo_follow(engine, ctx, &undone, &requester),
        Some(ActivityKind::Like) => undo_like(engine, ctx, &undone, &requester),
        _ => Ok(()),
    }
}

fn undo_follow(
    engine: &Engine,
    ctx: &DispatchContext,
    undone: &Object,
    requester: &str,
) -> Result<()> {
    let Some(followee_iri) = undone.get_node_iri("object") else {
        return Ok(());
    };
    match ctx.direction {
        Direction::Inbox => {
            let Some(followee) = engine.store().node_by_iri(followee_iri)? else {
                return Ok(());
            };
            if let Some(followers) = engine.collections().find_collection(&followee, "followers")? {
                engine.collections().remove_item(&followers, requester)?;
            }
        }
        Direction::Outbox => {
            let Some(follower) = engine.store().node_by_iri(requester)? else {
                return Ok(());
            };
            if let Some(following) = engine.collections().find_collection(&follower, "following")? {
                engine.collections().remove_item(&following, followee_iri)?;
            }
        }
    }
    Ok(())
}

fn undo_like(
    engine: &Engine,
    ctx: &DispatchContext,
    undone: &Object,
    requester: &str,
) -> Result<()> {
    let Some(object_iri) = undone.get_node_iri("object") else {
        return Ok(());
    };
    match ctx.direction {
        Direction::Inbox => {
            // the likes collection holds Like activities; remove by the
            // undone activity's own id
            let Some(liked_object) = engine.store().node_by_iri(object_iri)? else {
                return Ok(());
            };
            let likes = engine.collections().find_collection(&liked_object, "likes")?;
            if let (Some(likes), Some(like_id)) = (likes, undone.id()) {
                engine.collections().remove_item(&likes, like_id)?;
            }
        }
        Direction::Outbox => {
            let Some(actor) = engine.store().node_by_iri(requester)? else {
                return Ok(());
            };
            if let Some(liked) = engine.collections().find_collection(&actor, "liked")? {
                engine.collections().remove_item(&liked, object_iri)?;
            }
        }
    }
    Ok(())
}
