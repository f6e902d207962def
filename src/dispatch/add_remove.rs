//! Add/Remove: explicit membership changes on a target collection,
//! restricted to collections on the requester's own host.

use crate::error::{Error, Result};
use crate::iri::host_of;
use crate::model::{ActivityKind, Object};

use super::{DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    let kind = ctx.kind();
    if !matches!(kind, Some(ActivityKind::Add | ActivityKind::Remove)) {
        return Ok(());
    }
    let activity = Object::from(&ctx.activity).into_owned();
    let Some(target_iri) = activity.get_node_iri("target").map(str::to_string) else {
        return Err(Error::MissingProperties(vec!["target".to_string()]));
    };
    let requester = ctx.requester();
    let target_host = host_of(&target_iri);
    if target_host.is_none() || host_of(&requester) != target_host {
        return Err(Error::AccessDenied(format!(
            "{requester} may not edit collection {target_iri}"
        )));
    }
    let Some(collection) = engine.store().dereference(&target_iri)? else {
        return Err(Error::NotFound(format!("collection {target_iri}")));
    };
    match kind {
        Some(ActivityKind::Add) => {
            let Some(object_value) = activity.get_value("object") else {
                return Ok(());
            };
            engine.collections().add_item(&collection, &object_value)?;
        }
        _ => {
            let Some(object_iri) = activity.get_node_iri("object") else {
                return Ok(());
            };
            engine.collections().remove_item(&collection, object_iri)?;
        }
    }
    Ok(())
}
