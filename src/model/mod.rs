mod activity;
mod actor;
mod collection;
mod object;

pub(crate) use activity::ActivityKind;
pub use actor::Actor;
pub(crate) use collection::Collection;
pub(crate) use object::Object;
