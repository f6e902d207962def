//! Outbox-only: under the auto-accept policy, a Follow addressed to a
//! local actor is answered immediately by a synthetic Accept dispatched
//! through the followed actor's outbox.

use serde_json::json;
use tracing::debug;

use crate::auth::RequestContext;
use crate::error::Result;
use crate::iri::host_of;
use crate::model::{ActivityKind, Object};

use super::{Direction, DispatchContext, Engine};

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if ctx.kind() != Some(ActivityKind::Follow) {
        return Ok(());
    }
    if !engine.config().auto_accept_follows {
        return Ok(());
    }
    let activity = Object::from(&ctx.activity).into_owned();
    let Some(followee) = activity.get_node_iri("object").map(str::to_string) else {
        return Ok(());
    };
    // a remote followee answers from its own server
    if host_of(&followee) != host_of(&ctx.request.origin) {
        return Ok(());
    }
    debug!(target: "apub", %followee, "auto-accepting follow");
    let follow_value = activity.to_value();
    let accept = json!({
        "@context": engine.ld_context().context(),
        "type": "Accept",
        "id": engine.mint_iri(&ctx.request, "Accept"),
        "actor": followee.clone(),
        "object": follow_value,
    });
    let mut accept_ctx = DispatchContext {
        direction: Direction::Outbox,
        activity: accept,
        actor: followee.clone(),
        request: RequestContext::new(ctx.request.origin.clone()).with_actor(followee),
        // the Follow has not been persisted yet; hand it to the Accept
        // handler directly
        pending_follow: Some(activity.into()),
    };
    engine.run(&mut accept_ctx)
}
