use serde_json::Value;

use crate::json_ld;
use crate::model::Object;

/// Per-request information threaded through paging and dispatch.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    /// Scheme-and-host origin used when minting IRIs for this request.
    pub origin: String,
    /// IRI of the authenticated principal, if any.
    pub actor: Option<String>,
    /// Requested item offset for collection paging.
    pub offset: Option<u64>,
}

impl RequestContext {
    pub fn new(origin: impl Into<String>) -> RequestContext {
        RequestContext {
            origin: origin.into(),
            actor: None,
            offset: None,
        }
    }
    pub fn with_actor(mut self, actor: impl Into<String>) -> RequestContext {
        self.actor = Some(actor.into());
        self
    }
    pub fn with_offset(mut self, offset: u64) -> RequestContext {
        self.offset = Some(offset);
        self
    }
}

const AUDIENCE_PROPS: [&str; 5] = ["to", "bto", "cc", "bcc", "audience"];

/// Decides whether a principal may see an object.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, request: &RequestContext, object: &Value) -> bool;
}

/// Audience-based check: public objects are visible to everyone, addressed
/// objects to their addressees and authors, and objects without audience
/// fields carry no restriction at all.
pub struct AudienceAuthorizer;

impl Authorizer for AudienceAuthorizer {
    fn is_authorized(&self, request: &RequestContext, object: &Value) -> bool {
        let object = Object::from(object);
        let mut audience: Vec<&str> = Vec::new();
        for prop in AUDIENCE_PROPS {
            if let Some(values) = object.get_str_array(prop) {
                audience.extend(values);
            }
        }
        if audience.is_empty() {
            return true;
        }
        if audience.iter().any(|iri| json_ld::is_public_iri(iri)) {
            return true;
        }
        let Some(actor) = request.actor.as_deref() else {
            return false;
        };
        if audience.contains(&actor) {
            return true;
        }
        ["attributedTo", "actor"]
            .iter()
            .any(|prop| object.get_node_iri(prop) == Some(actor))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AudienceAuthorizer, Authorizer, RequestContext};

    #[test]
    fn public_sentinel_short_circuits() {
        let object = json!({
            "type": "Note",
            "to": ["https://www.w3.org/ns/activitystreams#Public"],
        });
        let request = RequestContext::new("https://example.com");
        assert!(AudienceAuthorizer.is_authorized(&request, &object));
    }

    #[test]
    fn absent_audience_means_authorized() {
        let object = json!({"type": "Note", "content": "hi"});
        let request = RequestContext::new("https://example.com");
        assert!(AudienceAuthorizer.is_authorized(&request, &object));
    }

    #[test]
    fn addressee_and_author_are_authorized() {
        let object = json!({
            "type": "Note",
            "to": ["https://example.com/users/bob"],
            "attributedTo": "https://example.com/users/alice",
        });
        let request = RequestContext::new("https://example.com");
        assert!(!AudienceAuthorizer.is_authorized(&request, &object));
        let bob = request.clone().with_actor("https://example.com/users/bob");
        assert!(AudienceAuthorizer.is_authorized(&bob, &object));
        let alice = request.clone().with_actor("https://example.com/users/alice");
        assert!(AudienceAuthorizer.is_authorized(&alice, &object));
        let mallory = request.with_actor("https://example.net/users/mallory");
        assert!(!AudienceAuthorizer.is_authorized(&mallory, &object));
    }
}
