//! Outbox-only: a bare object posted to the outbox becomes the `object`
//! of a synthetic Create activity.

use serde_json::json;
use tracing::debug;

use crate::error::Result;
use crate::model::{ActivityKind, Object};

use super::create::AUDIENCE_UNION_PROPS;
use super::{DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    let object = Object::from(&ctx.activity);
    if let Some(ty) = object.get_first_type() {
        if ActivityKind::is_activity_type(&ty) {
            return Ok(());
        }
    }
    debug!(target: "apub", "wrapping bare object in a synthetic Create");
    let actor = ctx.requester();
    let inner = object.into_owned().strip_context();
    let mut wrapper = Object::from(json!({
        "@context": engine.ld_context().context(),
        "type": "Create",
        "id": engine.mint_iri(&ctx.request, "Create"),
        "actor": actor,
    }));
    // audience fields travel up onto the wrapper; the Create handler
    // unions them back down
    for prop in AUDIENCE_UNION_PROPS {
        if let Some(value) = inner.get_value(prop) {
            wrapper = wrapper.replace(prop, value);
        }
    }
    let wrapper = wrapper.replace("object", inner.into());
    ctx.activity = wrapper.into();
    Ok(())
}
