//! Last stage: persist the activity as it left the handlers and, for
//! outbound activities, hand it to the delivery transport.

use serde_json::Value;
use tracing::warn;

use crate::error::Result;

use super::{Direction, DispatchContext, Engine};

/// Delivery hand-off for fully processed outbox activities. Fan-out,
/// signing and retry live behind this boundary.
pub trait Deliverer: Send + Sync {
    fn deliver(&self, activity: &Value) -> anyhow::Result<()>;
}

/// Deliverer for deployments without a federation transport wired up.
pub struct NoopDeliverer;

impl Deliverer for NoopDeliverer {
    fn deliver(&self, _activity: &Value) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) fn handle(engine: &Engine, ctx: &mut DispatchContext) -> Result<()> {
    if let Some(map) = ctx.activity.as_object() {
        engine.store().persist(map)?;
    }
    if ctx.direction == Direction::Outbox {
        // delivery failures do not abort the pipeline; retry is the
        // transport's responsibility
        if let Err(error) = engine.deliverer().deliver(&ctx.activity) {
            warn!(target: "apub", %error, "delivery hand-off failed");
        }
    }
    Ok(())
}
