//! Paginated, ordered membership lists layered on the object graph.

use std::sync::Arc;

use serde_json::{Map, Number, Value, json};
use tracing::debug;

use crate::auth::{Authorizer, RequestContext};
use crate::error::{Error, Result};
use crate::graph::{Field, FieldValue, GraphStore, Node};
use crate::iri::IdGenerator;
use crate::json_ld::LdContextProvider;
use crate::model::Collection;

#[derive(Clone)]
pub struct CollectionService {
    store: GraphStore,
    authorizer: Arc<dyn Authorizer>,
    ld_context: Arc<dyn LdContextProvider>,
    id_gen: Arc<dyn IdGenerator>,
    page_size: usize,
}

impl CollectionService {
    pub fn new(
        store: GraphStore,
        authorizer: Arc<dyn Authorizer>,
        ld_context: Arc<dyn LdContextProvider>,
        id_gen: Arc<dyn IdGenerator>,
        page_size: usize,
    ) -> CollectionService {
        CollectionService {
            store,
            authorizer,
            ld_context,
            id_gen,
            page_size,
        }
    }

    /// Append an item to the collection, lazily creating the items node on
    /// first use and bumping the `totalItems` counter.
    ///
    /// The counter is maintained by increment only; writers that bypass
    /// this service will make it drift, and nothing reconciles it.
    pub fn add_item(&self, collection: &Node, item: &Value) -> Result<()> {
        let items = self.ensure_items_node(collection)?;
        let index = self.store.fields_of(items.key())?.len();
        self.store.add_field(items.key(), &index.to_string(), item)?;
        let total = self.total_items(collection)?;
        self.set_total(collection, total + 1)
    }

    /// Remove the first item whose literal value or target id equals
    /// `item_id`. Returns whether anything was removed.
    pub fn remove_item(&self, collection: &Node, item_id: &str) -> Result<bool> {
        let Some(items) = self.items_node(collection)? else {
            return Ok(false);
        };
        for field in self.store.fields_of(items.key())? {
            let found = match field.value() {
                FieldValue::Literal(s) => s == item_id,
                FieldValue::Reference(target) => {
                    self.store.node_iri_of(*target)?.as_deref() == Some(item_id)
                }
                _ => false,
            };
            if found {
                self.store.remove_field(&field)?;
                let total = self.total_items(collection)?;
                self.set_total(collection, (total - 1).max(0))?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Fetch (or lazily create) the collection a property of `owner` points
    /// at. A literal IRI value is dereferenced first; if it resolves
    /// nowhere, a fresh collection document is created under that IRI and
    /// the property is rewritten into a reference.
    pub fn ensure_collection(
        &self,
        owner: &Node,
        prop: &str,
        request: &RequestContext,
    ) -> Result<Node> {
        let mut iri = None;
        if let Some(field) = self.store.field(owner, prop)? {
            match field.value() {
                FieldValue::Reference(target) => {
                    return self.store.node(*target)?.ok_or_else(|| {
                        Error::InvalidObject(format!("{prop} references a missing node"))
                    });
                }
                FieldValue::Literal(link) => {
                    if let Some(node) = self.store.dereference(link)? {
                        return Ok(node);
                    }
                    iri = Some(link.clone());
                }
                _ => {
                    return Err(Error::InvalidObject(format!(
                        "{prop} of collection owner is not a node or IRI"
                    )));
                }
            }
        }
        let iri = iri.unwrap_or_else(|| self.id_gen.object_iri(&request.origin, prop));
        debug!(target: "apub", %iri, %prop, "lazily creating collection");
        let doc = json!({
            "@context": self.ld_context.context(),
            "id": iri,
            "type": "OrderedCollection",
            "totalItems": 0,
        });
        let Value::Object(map) = doc else {
            unreachable!()
        };
        let node = self.store.persist(&map)?;
        self.store
            .set_field(owner.key(), prop, FieldValue::Reference(node.key()))?;
        Ok(node)
    }

    /// Look up the collection a property of `owner` points at without
    /// creating anything on a miss.
    pub fn find_collection(&self, owner: &Node, prop: &str) -> Result<Option<Node>> {
        match self.store.field(owner, prop)? {
            None => Ok(None),
            Some(field) => match field.value() {
                FieldValue::Reference(target) => self.store.node(*target),
                FieldValue::Literal(link) => self.store.node_by_iri(link),
                _ => Ok(None),
            },
        }
    }

    /// Build a windowed page over the collection, admitting only items the
    /// requesting principal may see. Fails with `NotFound` when the
    /// requested window contains no visible items. The `next` cursor is
    /// found by scanning past the window for the next visible item.
    pub fn page_and_filter(&self, request: &RequestContext, collection: &Node) -> Result<Value> {
        let offset = request.offset.unwrap_or(0) as usize;
        let Some(items) = self.items_node(collection)? else {
            return Err(Error::NotFound("collection has no items".to_string()));
        };
        let fields = self.store.fields_of(items.key())?;
        let mut page_items = Vec::new();
        let mut cursor = offset;
        while cursor < fields.len() && page_items.len() < self.page_size {
            if let Some(value) = self.admit(request, &fields[cursor])? {
                page_items.push(value);
            }
            cursor += 1;
        }
        if page_items.is_empty() {
            return Err(Error::NotFound(format!("no visible items at offset {offset}")));
        }
        let mut next = None;
        while cursor < fields.len() {
            if self.admit(request, &fields[cursor])?.is_some() {
                next = Some(cursor);
                break;
            }
            cursor += 1;
        }
        let ordered = self.items_prop(collection)? == "orderedItems";
        let mut page = Collection::new(self.ld_context.context());
        if ordered {
            page = page.ordered().with_ordered_items(page_items);
        } else {
            page = page.with_items(page_items);
        }
        if let Some(iri) = collection.iri() {
            page = page.part_of(iri);
        }
        if let Some(index) = next {
            page = page.next(&next_link(collection.iri(), index));
        }
        Ok(page.to_page().into())
    }

    /// Flatten a paged collection into a single in-memory item list,
    /// following the `first`/`next` chain across local and remote pages
    /// and discarding pagination metadata.
    pub fn normalize_collection(&self, doc: &Value) -> Result<Value> {
        let Some(map) = doc.as_object() else {
            return Err(Error::InvalidObject(
                "collection document is not a JSON object".to_string(),
            ));
        };
        let ordered = is_ordered(map);
        let mut all = Vec::new();
        collect_inline_items(map, &mut all);
        let mut page = self.resolve_page(map.get("first"))?;
        let mut seen: Vec<String> = Vec::new();
        while let Some(current) = page {
            if let Some(id) = current.get("id").and_then(Value::as_str) {
                if seen.iter().any(|s| s == id) {
                    debug!(target: "apub", %id, "page chain loops, stopping");
                    break;
                }
                seen.push(id.to_string());
            }
            if let Some(current_map) = current.as_object() {
                collect_inline_items(current_map, &mut all);
            }
            page = self.resolve_page(current.get("next"))?;
        }
        let mut out = Map::new();
        out.insert("@context".to_string(), self.ld_context.context());
        if let Some(id) = map.get("id") {
            out.insert("id".to_string(), id.clone());
        }
        out.insert(
            "type".to_string(),
            Value::String(if ordered { "OrderedCollection" } else { "Collection" }.to_string()),
        );
        out.insert(
            "totalItems".to_string(),
            Value::Number(Number::from(all.len() as u64)),
        );
        let prop = if ordered { "orderedItems" } else { "items" };
        out.insert(prop.to_string(), Value::Array(all));
        Ok(Value::Object(out))
    }

    fn resolve_page(&self, link: Option<&Value>) -> Result<Option<Value>> {
        match link {
            Some(Value::String(iri)) => match self.store.dereference(iri)? {
                Some(node) => Ok(Some(self.store.to_value(&node)?)),
                None => Ok(None),
            },
            Some(Value::Object(map)) => Ok(Some(Value::Object(map.clone()))),
            _ => Ok(None),
        }
    }

    fn admit(&self, request: &RequestContext, field: &Field) -> Result<Option<Value>> {
        match field.value() {
            FieldValue::Reference(target) => {
                let Some(node) = self.store.node(*target)? else {
                    return Ok(None);
                };
                let value = self.store.to_value(&node)?;
                if self.authorizer.is_authorized(request, &value) {
                    Ok(Some(value))
                } else {
                    Ok(None)
                }
            }
            // bare IRIs and scalars carry no audience restriction
            FieldValue::Literal(s) => Ok(Some(Value::String(s.clone()))),
            FieldValue::Int(i) => Ok(Some(Value::Number(Number::from(*i)))),
            FieldValue::Float(f) => Ok(Number::from_f64(*f).map(Value::Number)),
            FieldValue::Bool(b) => Ok(Some(Value::Bool(*b))),
        }
    }

    fn items_prop(&self, collection: &Node) -> Result<&'static str> {
        if let Some(field) = self.store.field(collection, "type")? {
            if let FieldValue::Literal(ty) = field.value() {
                if ty.starts_with("Ordered") {
                    return Ok("orderedItems");
                }
            }
        }
        Ok("items")
    }

    fn items_node(&self, collection: &Node) -> Result<Option<Node>> {
        let prop = self.items_prop(collection)?;
        match self.store.field(collection, prop)? {
            None => Ok(None),
            Some(field) => match field.value() {
                FieldValue::Reference(target) => self.store.node(*target),
                _ => Err(Error::InvalidObject(format!(
                    "{prop} of collection is not a node"
                ))),
            },
        }
    }

    fn ensure_items_node(&self, collection: &Node) -> Result<Node> {
        if let Some(node) = self.items_node(collection)? {
            return Ok(node);
        }
        let prop = self.items_prop(collection)?;
        let node = self.store.create_anonymous_node()?;
        self.store
            .set_field(collection.key(), prop, FieldValue::Reference(node.key()))?;
        Ok(node)
    }

    fn total_items(&self, collection: &Node) -> Result<i64> {
        if let Some(field) = self.store.field(collection, "totalItems")? {
            if let FieldValue::Int(total) = field.value() {
                return Ok(*total);
            }
        }
        Ok(0)
    }

    fn set_total(&self, collection: &Node, total: i64) -> Result<()> {
        self.store
            .set_field(collection.key(), "totalItems", FieldValue::Int(total))
    }
}

fn next_link(collection_iri: Option<&str>, offset: usize) -> String {
    match collection_iri {
        Some(iri) => format!("{iri}?offset={offset}"),
        None => offset.to_string(),
    }
}

fn is_ordered(map: &Map<String, Value>) -> bool {
    if map.contains_key("orderedItems") {
        return true;
    }
    matches!(
        map.get("type").and_then(Value::as_str),
        Some("OrderedCollection") | Some("OrderedCollectionPage")
    )
}

fn collect_inline_items(map: &Map<String, Value>, out: &mut Vec<Value>) {
    for prop in ["items", "orderedItems"] {
        match map.get(prop) {
            Some(Value::Array(items)) => out.extend(items.iter().cloned()),
            Some(Value::Object(item)) => out.push(Value::Object(item.clone())),
            Some(Value::String(iri)) => out.push(Value::String(iri.clone())),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::auth::{AudienceAuthorizer, RequestContext};
    use crate::clock::SystemClock;
    use crate::error::Error;
    use crate::fetch::RemoteFetcher;
    use crate::fetch::testing::{NullFetcher, StaticFetcher};
    use crate::graph::{GraphStore, Node};
    use crate::iri::Base62IdGenerator;
    use crate::json_ld::ActivityStreamsContext;

    use super::CollectionService;

    fn fixture(page_size: usize) -> Result<(TempDir, GraphStore, CollectionService)> {
        fixture_with(page_size, Arc::new(NullFetcher))
    }

    fn fixture_with(
        page_size: usize,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Result<(TempDir, GraphStore, CollectionService)> {
        let dir = tempfile::tempdir()?;
        let keyspace = fjall::Config::new(dir.path()).temporary(true).open()?;
        let store = GraphStore::new(keyspace, fetcher, Arc::new(SystemClock))?;
        let service = CollectionService::new(
            store.clone(),
            Arc::new(AudienceAuthorizer),
            Arc::new(ActivityStreamsContext),
            Arc::new(Base62IdGenerator),
            page_size,
        );
        Ok((dir, store, service))
    }

    fn ordered_collection(store: &GraphStore, iri: &str) -> Result<Node> {
        let doc = json!({"id": iri, "type": "OrderedCollection", "totalItems": 0});
        Ok(store.persist(doc.as_object().unwrap())?)
    }

    #[test]
    fn add_and_remove_maintain_the_counter() -> Result<()> {
        let (_dir, store, service) = fixture(10)?;
        let outbox = ordered_collection(&store, "https://example.com/users/alice/outbox")?;
        service.add_item(&outbox, &json!("note-a"))?;
        service.add_item(&outbox, &json!("note-b"))?;
        let value = store.to_value(&outbox)?;
        assert_eq!(value["totalItems"], 2);
        assert_eq!(value["orderedItems"], json!(["note-a", "note-b"]));

        assert!(service.remove_item(&outbox, "note-a")?);
        assert!(!service.remove_item(&outbox, "note-a")?);
        let value = store.to_value(&outbox)?;
        assert_eq!(value["totalItems"], 1);
        assert_eq!(value["orderedItems"], json!(["note-b"]));
        Ok(())
    }

    #[test]
    fn pagination_boundary_at_five_items_page_size_four() -> Result<()> {
        let (_dir, store, service) = fixture(4)?;
        let iri = "https://example.com/users/alice/outbox";
        let outbox = ordered_collection(&store, iri)?;
        for index in 0..5 {
            service.add_item(&outbox, &json!(format!("note-{index}")))?;
        }
        let request = RequestContext::new("https://example.com");
        let page = service.page_and_filter(&request, &outbox)?;
        assert_eq!(page["type"], "OrderedCollectionPage");
        assert_eq!(page["partOf"], iri);
        assert_eq!(page["orderedItems"].as_array().map(Vec::len), Some(4));
        assert_eq!(page["next"], format!("{iri}?offset=4"));

        let page = service.page_and_filter(&request.with_offset(4), &outbox)?;
        assert_eq!(page["orderedItems"], json!(["note-4"]));
        assert!(page.get("next").is_none());
        Ok(())
    }

    #[test]
    fn empty_page_is_not_found() -> Result<()> {
        let (_dir, store, service) = fixture(4)?;
        let outbox = ordered_collection(&store, "https://example.com/users/alice/outbox")?;
        service.add_item(&outbox, &json!("note-a"))?;
        let request = RequestContext::new("https://example.com").with_offset(5);
        assert!(matches!(
            service.page_and_filter(&request, &outbox),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn paging_skips_unauthorized_items_and_aims_next_at_the_visible_one() -> Result<()> {
        let (_dir, store, service) = fixture(2)?;
        let iri = "https://example.com/users/alice/outbox";
        let outbox = ordered_collection(&store, iri)?;
        // public at 0, 2, 4; addressed to someone else at 1, 3
        for index in 0..5 {
            let audience = if index % 2 == 0 {
                json!(["https://www.w3.org/ns/activitystreams#Public"])
            } else {
                json!(["https://example.com/users/bob"])
            };
            let note = json!({
                "type": "Note",
                "content": format!("note-{index}"),
                "to": audience,
            });
            service.add_item(&outbox, &note)?;
        }
        let request = RequestContext::new("https://example.com");
        let page = service.page_and_filter(&request, &outbox)?;
        let contents: Vec<&str> = page["orderedItems"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["note-0", "note-2"]);
        // the cursor lands on the next authorized item, not the raw offset
        assert_eq!(page["next"], format!("{iri}?offset=4"));
        Ok(())
    }

    #[test]
    fn ensure_collection_creates_under_the_declared_iri() -> Result<()> {
        let (_dir, store, service) = fixture(10)?;
        let actor = store.persist(
            json!({
                "id": "https://example.com/users/alice",
                "type": "Person",
                "followers": "https://example.com/users/alice/followers",
            })
            .as_object()
            .unwrap(),
        )?;
        let request = RequestContext::new("https://example.com");
        let followers = service.ensure_collection(&actor, "followers", &request)?;
        assert_eq!(followers.iri(), Some("https://example.com/users/alice/followers"));
        // the literal link is now a graph edge
        let field = store.field(&actor, "followers")?.unwrap();
        assert_eq!(field.target(), Some(followers.key()));
        // a second call resolves the same node
        let again = service.ensure_collection(&actor, "followers", &request)?;
        assert_eq!(again.key(), followers.key());
        Ok(())
    }

    #[test]
    fn normalize_flattens_a_page_chain() -> Result<()> {
        let (_dir, _store, service) = fixture(10)?;
        let doc = json!({
            "id": "https://remote.example/outbox",
            "type": "OrderedCollection",
            "totalItems": 3,
            "first": {
                "id": "https://remote.example/outbox?page=1",
                "type": "OrderedCollectionPage",
                "orderedItems": ["a", "b"],
                "next": {
                    "id": "https://remote.example/outbox?page=2",
                    "type": "OrderedCollectionPage",
                    "orderedItems": ["c"],
                },
            },
        });
        let flat = service.normalize_collection(&doc)?;
        assert_eq!(flat["type"], "OrderedCollection");
        assert_eq!(flat["id"], "https://remote.example/outbox");
        assert_eq!(flat["orderedItems"], json!(["a", "b", "c"]));
        assert_eq!(flat["totalItems"], 3);
        assert!(flat.get("first").is_none());
        Ok(())
    }

    #[test]
    fn normalize_fetches_pages_linked_by_iri() -> Result<()> {
        let fetcher = StaticFetcher::new([
            (
                "https://remote.example/outbox?page=1".to_string(),
                json!({
                    "id": "https://remote.example/outbox?page=1",
                    "type": "OrderedCollectionPage",
                    "orderedItems": ["a", "b"],
                    "next": "https://remote.example/outbox?page=2",
                }),
            ),
            (
                "https://remote.example/outbox?page=2".to_string(),
                json!({
                    "id": "https://remote.example/outbox?page=2",
                    "type": "OrderedCollectionPage",
                    "orderedItems": ["c"],
                }),
            ),
        ]);
        let (_dir, _store, service) = fixture_with(10, Arc::new(fetcher))?;
        let doc = json!({
            "id": "https://remote.example/outbox",
            "type": "OrderedCollection",
            "first": "https://remote.example/outbox?page=1",
        });
        let flat = service.normalize_collection(&doc)?;
        assert_eq!(flat["orderedItems"], json!(["a", "b", "c"]));
        assert_eq!(flat["totalItems"], 3);
        assert!(flat.get("first").is_none());
        Ok(())
    }

    #[test]
    fn normalize_rejects_non_object_documents() -> Result<()> {
        let (_dir, _store, service) = fixture(10)?;
        assert!(matches!(
            service.normalize_collection(&Value::Null),
            Err(Error::InvalidObject(_))
        ));
        Ok(())
    }
}
