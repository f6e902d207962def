//! Generic validation, first stage after wrapping. Fails fast with the
//! list of missing property names.

use crate::error::{Error, Result};
use crate::model::{ActivityKind, Object};

use super::{Direction, DispatchContext, Engine};

pub(crate) fn handle(_engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    let activity = Object::from(&ctx.activity);
    let mut missing = match ctx.direction {
        Direction::Inbox => activity.missing_props(&["type", "id", "actor"]),
        Direction::Outbox => activity.missing_props(&["type"]),
    };
    if ctx.direction == Direction::Outbox && missing.is_empty() {
        if let Some(kind) = ActivityKind::from_object(&activity) {
            if kind.requires_object() && !activity.has_props(&["object"]) {
                missing.push("object".to_string());
            }
            if kind.requires_target() && !activity.has_props(&["target"]) {
                missing.push("target".to_string());
            }
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingProperties(missing))
    }
}
