use jiff::Timestamp;

/// Source of "now" for created/updated/published stamps.
///
/// The context tag names the call site (`"graph.persist"`, `"apub.delete"`)
/// so a test clock can hand out deterministic, per-site timestamps.
pub trait Clock: Send + Sync {
    fn now(&self, context: &str) -> Timestamp;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self, _context: &str) -> Timestamp {
        Timestamp::now()
    }
}
