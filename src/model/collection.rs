use serde_json::{Number, Value, json};

/// Builder for collection and collection page documents.
pub(crate) struct Collection(Value);

impl Collection {
    pub(crate) fn new(context: Value) -> Collection {
        Collection(json!({
            "@context": context,
            "type": "Collection"
        }))
    }
    pub(crate) fn ordered(mut self) -> Collection {
        self.insert("type", Value::String("OrderedCollection".to_string()));
        self
    }
    pub(crate) fn id(mut self, iri: &str) -> Collection {
        self.insert("id", Value::String(iri.to_string()));
        self
    }
    pub(crate) fn with_items(mut self, items: Vec<Value>) -> Collection {
        self.insert("items", Value::Array(items));
        self
    }
    pub(crate) fn with_ordered_items(mut self, items: Vec<Value>) -> Collection {
        self.insert("orderedItems", Value::Array(items));
        self
    }
    pub(crate) fn total_items(mut self, total: u64) -> Collection {
        self.insert("totalItems", Value::Number(Number::from(total)));
        self
    }
    pub(crate) fn part_of(mut self, link: &str) -> Collection {
        self.insert("partOf", Value::String(link.to_string()));
        self
    }
    pub(crate) fn next(mut self, link: &str) -> Collection {
        self.insert("next", Value::String(link.to_string()));
        self
    }
    pub(crate) fn to_page(mut self) -> CollectionPage {
        let page_type = match self.0.get("type").and_then(Value::as_str) {
            Some("OrderedCollection") => "OrderedCollectionPage",
            _ => "CollectionPage",
        };
        self.insert("type", Value::String(page_type.to_string()));
        CollectionPage(self.0)
    }
    fn insert(&mut self, prop: &str, value: Value) {
        if let Some(map) = self.0.as_object_mut() {
            map.insert(prop.to_string(), value);
        }
    }
}

pub(crate) struct CollectionPage(Value);

impl From<Collection> for Value {
    fn from(value: Collection) -> Self {
        value.0
    }
}

impl From<CollectionPage> for Value {
    fn from(value: CollectionPage) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::Collection;

    #[test]
    fn ordered_page_document() {
        let page = Collection::new(json!("https://www.w3.org/ns/activitystreams"))
            .ordered()
            .with_ordered_items(vec![json!({"type": "Note"})])
            .part_of("https://example.com/outbox")
            .next("https://example.com/outbox?offset=4")
            .to_page();
        let value = Value::from(page);
        assert_eq!(value["type"], "OrderedCollectionPage");
        assert_eq!(value["partOf"], "https://example.com/outbox");
        assert_eq!(value["next"], "https://example.com/outbox?offset=4");
        assert_eq!(value["orderedItems"].as_array().map(Vec::len), Some(1));
    }
}
