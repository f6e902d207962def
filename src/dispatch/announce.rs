//! Announce: the activity gathers on the announced object's `shares`
//! collection, symmetric in both directions.

use tracing::debug;

use crate::error::Result;
use crate::model::{ActivityKind, Object};

use super::{DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if ctx.kind() != Some(ActivityKind::Announce) {
        return Ok(());
    }
    let Some(object_iri) = Object::from(&ctx.activity)
        .get_node_iri("object")
        .map(str::to_string)
    else {
        return Ok(());
    };
    let Some(object) = engine.store().dereference(&object_iri)? else {
        debug!(target: "apub", %object_iri, "cannot resolve announced object, skipping");
        return Ok(());
    };
    let shares = engine
        .collections()
        .ensure_collection(&object, "shares", &ctx.request)?;
    engine.collections().add_item(&shares, &ctx.activity)?;
    Ok(())
}
