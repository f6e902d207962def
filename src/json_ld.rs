use serde_json::Value;

pub(crate) const ACTIVITY_STREAMS_NS: &str = "https://www.w3.org/ns/activitystreams";
pub(crate) const PUBLIC: &str = "https://www.w3.org/ns/activitystreams#Public";

/// All three spellings accepted in the wild for the public addressing
/// sentinel.
pub(crate) fn is_public_iri(iri: &str) -> bool {
    iri == PUBLIC || iri == "as:Public" || iri == "Public"
}

/// Supplies the `@context` stamped onto synthetically created documents
/// (lazily created collections, synthetic Accept/Create wrappers).
pub trait LdContextProvider: Send + Sync {
    fn context(&self) -> Value;
}

pub struct ActivityStreamsContext;

impl LdContextProvider for ActivityStreamsContext {
    fn context(&self) -> Value {
        Value::String(ACTIVITY_STREAMS_NS.to_string())
    }
}
