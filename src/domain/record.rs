// Identity shared by every registry record
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic record identifier. Issued by a registry counter, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record a registry can hold. The registry issues the id; the draft carries
/// everything else.
pub trait Record {
    type Draft;

    fn assemble(id: RecordId, draft: Self::Draft) -> Self;

    fn id(&self) -> RecordId;

    fn created_at(&self) -> DateTime<Utc>;
}
