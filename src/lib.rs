//! Server-side processing core for ActivityPub-style federation.
//!
//! Documents live in an object graph of nodes and typed edges
//! ([`GraphStore`]), membership lists are paginated collections on top of
//! it ([`CollectionService`]), and protocol side effects are applied by an
//! ordered pipeline of per-type handlers as activities pass through an
//! actor's inbox or outbox ([`Engine`]).
//!
//! Transport concerns (HTTP routing, signatures, delivery fan-out) stay
//! outside; they plug in through the [`RemoteFetcher`], [`Authorizer`],
//! and [`Deliverer`] traits.

mod auth;
mod clock;
mod collection;
mod config;
mod dispatch;
mod error;
mod fetch;
mod graph;
mod iri;
mod json_ld;
mod model;

pub use auth::{AudienceAuthorizer, Authorizer, RequestContext};
pub use clock::{Clock, SystemClock};
pub use collection::CollectionService;
pub use config::Config;
pub use dispatch::{Deliverer, Direction, DispatchContext, Engine, Handler, NoopDeliverer};
pub use error::{Error, Result};
pub use fetch::{Mailman, RemoteFetcher};
pub use graph::{Field, FieldId, FieldValue, GraphStore, Node, NodeKey};
pub use iri::{Base62IdGenerator, IdGenerator};
pub use json_ld::{ActivityStreamsContext, LdContextProvider};
pub use model::Actor;
