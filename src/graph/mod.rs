mod record;
mod store;

pub use record::{Field, FieldId, FieldValue, Node, NodeKey};
pub use store::GraphStore;
