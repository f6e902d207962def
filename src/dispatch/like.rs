//! Like: inbound likes gather on the object's `likes` collection,
//! outbound ones on the actor's `liked`.

use tracing::debug;

use crate::error::Result;
use crate::model::{ActivityKind, Object};

use super::{Direction, DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if ctx.kind() != Some(ActivityKind::Like) {
        return Ok(());
    }
    let activity = Object::from(&ctx.activity).into_owned();
    match ctx.direction {
        Direction::Inbox => {
            let Some(object_iri) = activity.get_node_iri("object") else {
                return Ok(());
            };
            let Some(liked_object) = engine.store().dereference(object_iri)? else {
                debug!(target: "apub", %object_iri, "cannot resolve liked object, skipping");
                return Ok(());
            };
            let likes = engine
                .collections()
                .ensure_collection(&liked_object, "likes", &ctx.request)?;
            engine.collections().add_item(&likes, &ctx.activity)?;
        }
        Direction::Outbox => {
            let requester = ctx.requester();
            let Some(actor) = engine.store().dereference(&requester)? else {
                return Ok(());
            };
            let liked = engine
                .collections()
                .ensure_collection(&actor, "liked", &ctx.request)?;
            let Some(object_value) = activity.get_value("object") else {
                return Ok(());
            };
            engine.collections().add_item(&liked, &object_value)?;
        }
    }
    Ok(())
}
