use uuid::Uuid;

/// Mints fresh, collision-free object IRIs.
pub trait IdGenerator: Send + Sync {
    /// Build an IRI under `origin` with a type-derived path segment.
    fn object_iri(&self, origin: &str, segment: &str) -> String;
}

/// Default generator: time-ordered UUIDs in base62, one path segment per
/// object type.
pub struct Base62IdGenerator;

impl IdGenerator for Base62IdGenerator {
    fn object_iri(&self, origin: &str, segment: &str) -> String {
        format!("{}/{}/{}", origin.trim_end_matches('/'), segment, base62_uuid())
    }
}

pub(crate) fn base62_uuid() -> String {
    base62::encode(Uuid::now_v7().as_u128())
}

pub(crate) fn type_segment(ty: &str) -> String {
    ty.to_ascii_lowercase()
}

/// A string qualifies for URI auto-linking only if it is an absolute
/// http(s) IRI with a host part.
pub(crate) fn is_absolute_iri(s: &str) -> bool {
    match s.strip_prefix("https://").or_else(|| s.strip_prefix("http://")) {
        Some(rest) => !rest.is_empty() && !rest.starts_with('/'),
        None => false,
    }
}

pub(crate) fn host_of(iri: &str) -> Option<&str> {
    let rest = iri
        .strip_prefix("https://")
        .or_else(|| iri.strip_prefix("http://"))?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if end == 0 { None } else { Some(&rest[..end]) }
}
