//! Update: only the author may mutate an object, and only the named
//! fields change.

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ActivityKind, Object};

use super::{Direction, DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if ctx.kind() != Some(ActivityKind::Update) {
        return Ok(());
    }
    let activity = Object::from(&ctx.activity).into_owned();
    let Some(object_value) = activity.get_value("object") else {
        return Ok(());
    };
    let object = Object::from(&object_value);
    let Some(changes) = object.as_map() else {
        return Err(Error::InvalidObject(
            "Update object must embed its changed fields".to_string(),
        ));
    };
    let Some(id) = object.id().map(str::to_string) else {
        return Err(Error::MissingProperties(vec!["object.id".to_string()]));
    };

    // auth check runs against the live stored object, not the payload
    let Some(node) = engine.store().dereference(&id)? else {
        debug!(target: "apub", %id, "update target unknown, skipping");
        return Ok(());
    };
    let stored = engine.store().to_value(&node)?;
    let requester = ctx.requester();
    if Object::from(&stored).get_node_iri("attributedTo") != Some(requester.as_str()) {
        return Err(Error::AccessDenied(format!(
            "{requester} does not own {id}"
        )));
    }

    match ctx.direction {
        Direction::Inbox => {
            engine.store().replace(&id, changes)?;
        }
        Direction::Outbox => {
            engine.store().update(&id, changes)?;
            // reflect the applied state back into the activity
            if let Some(updated) = engine.store().node_by_iri(&id)? {
                let value = engine.store().to_value(&updated)?;
                ctx.activity = activity.replace("object", value).into();
            }
        }
    }
    Ok(())
}
