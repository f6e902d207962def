//! The activity dispatch engine: an ordered pipeline of handlers applying
//! protocol side effects as activities pass through an actor's inbox or
//! outbox.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::auth::{AudienceAuthorizer, Authorizer, RequestContext};
use crate::clock::{Clock, SystemClock};
use crate::collection::CollectionService;
use crate::config::Config;
use crate::error::Result;
use crate::graph::GraphStore;
use crate::iri::{Base62IdGenerator, IdGenerator, type_segment};
use crate::json_ld::{ActivityStreamsContext, LdContextProvider};
use crate::model::{ActivityKind, Object};

mod accept;
mod add_remove;
mod announce;
mod create;
mod delete;
mod deliver;
mod follow;
mod like;
mod undo;
mod update;
mod validate;
mod wrap;

pub use deliver::{Deliverer, NoopDeliverer};

/// Which side of the actor an activity entered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbox,
    Outbox,
}

/// A pipeline stage. Handlers inspect the activity's type and no-op when
/// it is not theirs, so several independent handlers can serve one type.
pub type Handler = fn(&Engine, &mut DispatchContext) -> Result<()>;

struct Registration {
    direction: Direction,
    handler: Handler,
}

/// Mutable state of one pipeline invocation.
pub struct DispatchContext {
    direction: Direction,
    activity: Value,
    /// The actor whose inbox or outbox this activity passes through.
    actor: String,
    request: RequestContext,
    /// A Follow being answered by a synthetic Accept in the same
    /// invocation, before it has been persisted anywhere.
    pending_follow: Option<Value>,
}

impl DispatchContext {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn activity(&self) -> &Value {
        &self.activity
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub(crate) fn kind(&self) -> Option<ActivityKind> {
        ActivityKind::from_object(&Object::from(&self.activity))
    }

    /// The principal this mutation is attributed to: the authenticated
    /// actor when the transport supplied one, else the activity's own
    /// `actor`, else the owner of the box being processed.
    pub(crate) fn requester(&self) -> String {
        if let Some(actor) = &self.request.actor {
            return actor.clone();
        }
        if let Some(actor) = Object::from(&self.activity).get_node_iri("actor") {
            return actor.to_string();
        }
        self.actor.clone()
    }
}

pub struct Engine {
    store: GraphStore,
    collections: CollectionService,
    config: Config,
    authorizer: Arc<dyn Authorizer>,
    id_gen: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    ld_context: Arc<dyn LdContextProvider>,
    deliverer: Arc<dyn Deliverer>,
    handlers: Vec<Registration>,
}

impl Engine {
    pub fn new(store: GraphStore, config: Config) -> Engine {
        let authorizer: Arc<dyn Authorizer> = Arc::new(AudienceAuthorizer);
        let id_gen: Arc<dyn IdGenerator> = Arc::new(Base62IdGenerator);
        let ld_context: Arc<dyn LdContextProvider> = Arc::new(ActivityStreamsContext);
        let collections = CollectionService::new(
            store.clone(),
            authorizer.clone(),
            ld_context.clone(),
            id_gen.clone(),
            config.page_size,
        );
        let mut engine = Engine {
            store,
            collections,
            config,
            authorizer,
            id_gen,
            clock: Arc::new(SystemClock),
            ld_context,
            deliverer: Arc::new(NoopDeliverer),
            handlers: Vec::new(),
        };
        engine.register_defaults();
        engine
    }

    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Engine {
        self.authorizer = authorizer;
        self.rebuild_collections();
        self
    }

    pub fn with_id_generator(mut self, id_gen: Arc<dyn IdGenerator>) -> Engine {
        self.id_gen = id_gen;
        self.rebuild_collections();
        self
    }

    pub fn with_ld_context(mut self, ld_context: Arc<dyn LdContextProvider>) -> Engine {
        self.ld_context = ld_context;
        self.rebuild_collections();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Engine {
        self.clock = clock;
        self
    }

    pub fn with_deliverer(mut self, deliverer: Arc<dyn Deliverer>) -> Engine {
        self.deliverer = deliverer;
        self
    }

    /// Run the pipeline for one activity and return the activity as the
    /// handlers left it (wrapped, id-assigned, audience-unioned).
    pub fn process(
        &self,
        direction: Direction,
        activity: Value,
        actor: &str,
        request: RequestContext,
    ) -> Result<Value> {
        debug!(
            target: "apub",
            ?direction,
            actor,
            ty = Object::from(&activity).get_first_type().as_deref().unwrap_or("?"),
            "dispatching activity"
        );
        let mut ctx = DispatchContext {
            direction,
            activity,
            actor: actor.to_string(),
            request,
            pending_follow: None,
        };
        self.run(&mut ctx)?;
        Ok(ctx.activity)
    }

    /// Append a handler after the default registry. Handlers run in
    /// registration order, filtered by direction.
    pub fn register(&mut self, direction: Direction, handler: Handler) {
        self.handlers.push(Registration { direction, handler });
    }

    pub fn register_both(&mut self, handler: Handler) {
        self.register(Direction::Inbox, handler);
        self.register(Direction::Outbox, handler);
    }

    pub(crate) fn run(&self, ctx: &mut DispatchContext) -> Result<()> {
        for registration in &self.handlers {
            if registration.direction == ctx.direction {
                (registration.handler)(self, ctx)?;
            }
        }
        Ok(())
    }

    fn register_defaults(&mut self) {
        self.register(Direction::Outbox, wrap::handle);
        self.register_both(validate::handle);
        self.register_both(create::handle);
        self.register_both(update::handle);
        self.register_both(delete::handle);
        self.register(Direction::Outbox, follow::handle);
        self.register_both(accept::handle);
        self.register_both(like::handle);
        self.register_both(announce::handle);
        self.register_both(add_remove::handle);
        self.register_both(undo::handle);
        self.register_both(deliver::handle);
    }

    fn rebuild_collections(&mut self) {
        self.collections = CollectionService::new(
            self.store.clone(),
            self.authorizer.clone(),
            self.ld_context.clone(),
            self.id_gen.clone(),
            self.config.page_size,
        );
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn collections(&self) -> &CollectionService {
        &self.collections
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn ld_context(&self) -> &dyn LdContextProvider {
        self.ld_context.as_ref()
    }

    pub(crate) fn deliverer(&self) -> &dyn Deliverer {
        self.deliverer.as_ref()
    }

    /// Mint a fresh IRI under the request's origin with a type-derived
    /// path segment.
    pub(crate) fn mint_iri(&self, request: &RequestContext, ty: &str) -> String {
        self.id_gen.object_iri(&request.origin, &type_segment(ty))
    }
}
