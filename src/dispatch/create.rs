//! Create: persist an incoming object, or prepare an outgoing one by
//! assigning ids, attributing it to the actor, and unioning audience
//! fields between the activity and its object.

use serde_json::Value;

use crate::error::Result;
use crate::iri::type_segment;
use crate::model::{ActivityKind, Object};

use super::{Direction, DispatchContext, Engine};

/// Audience properties shared between an activity and its object.
/// `bto` is deliberately absent: it never leaves the wrapper.
pub(crate) const AUDIENCE_UNION_PROPS: [&str; 4] = ["to", "cc", "bcc", "audience"];

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if ctx.kind() != Some(ActivityKind::Create) {
        return Ok(());
    }
    match ctx.direction {
        Direction::Inbox => {
            // objects without an id ride along when the activity itself
            // is persisted; only addressable objects are stored eagerly
            let activity = Object::from(&ctx.activity);
            if let Some(object) = activity.get_node_object("object") {
                if object.id().is_some() {
                    if let Some(map) = object.as_map() {
                        engine.store().persist(map)?;
                    }
                }
            }
            Ok(())
        }
        Direction::Outbox => {
            let mut activity = Object::from(&ctx.activity).into_owned();
            if activity.id().is_none() {
                activity = activity.ensure_id(engine.mint_iri(&ctx.request, "Create"));
            }
            let requester = ctx.requester();
            if let Some(object_value) = activity.get_value("object") {
                if object_value.is_object() {
                    let mut object = Object::from(object_value);
                    if object.id().is_none() {
                        let segment = object
                            .get_first_type()
                            .map(|ty| type_segment(&ty))
                            .unwrap_or_else(|| "object".to_string());
                        object = object
                            .ensure_id(engine.id_gen.object_iri(&ctx.request.origin, &segment));
                    }
                    object = object.augment("attributedTo", Value::String(requester.clone()));
                    for prop in AUDIENCE_UNION_PROPS {
                        let merged = union_audience(
                            activity.get_value(prop).as_ref(),
                            object.get_value(prop).as_ref(),
                        );
                        if let Some(merged) = merged {
                            activity = activity.replace(prop, merged.clone());
                            object = object.replace(prop, merged);
                        }
                    }
                    activity = activity.replace("object", object.into());
                }
            }
            ctx.activity = activity.into();
            Ok(())
        }
    }
}

/// Order-preserving deduplicated union of two audience values, each a
/// single string or an array.
fn union_audience(a: Option<&Value>, b: Option<&Value>) -> Option<Value> {
    let mut merged: Vec<Value> = Vec::new();
    for value in [a, b].into_iter().flatten() {
        match value {
            Value::Array(items) => {
                for item in items {
                    if !merged.contains(item) {
                        merged.push(item.clone());
                    }
                }
            }
            other => {
                if !merged.contains(other) {
                    merged.push(other.clone());
                }
            }
        }
    }
    if merged.is_empty() {
        None
    } else {
        Some(Value::Array(merged))
    }
}
