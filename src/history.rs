//! History ledger of completed exchanges (newest first)

use chrono::{DateTime, Utc};

const PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryId(String);

impl HistoryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HistoryId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub preview: String,
}

impl HistoryEntry {
    /// Human-readable age such as "5 minutes ago"
    pub fn age(&self, now: DateTime<Utc>) -> String {
        relative_age(self.timestamp, now)
    }
}

#[derive(Debug, Default)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
    active: Option<HistoryId>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_id(&self) -> Option<&HistoryId> {
        self.active.as_ref()
    }

    pub fn active_entry(&self) -> Option<&HistoryEntry> {
        let id = self.active.as_ref()?;
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Insert a completed exchange at the head and make it active
    pub fn record(&mut self, query: impl Into<String>, content: &str) -> &HistoryEntry {
        self.record_at(query, content, Utc::now())
    }

    pub fn record_at(
        &mut self,
        query: impl Into<String>,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> &HistoryEntry {
        let entry = HistoryEntry {
            id: HistoryId::new(),
            query: query.into(),
            timestamp,
            preview: preview_of(content),
        };
        self.active = Some(entry.id.clone());
        self.entries.insert(0, entry);
        &self.entries[0]
    }

    /// Mark an entry active. Does not reload the conversation behind it.
    ///
    /// Returns false (and leaves the pointer alone) for an unknown id.
    pub fn select(&mut self, id: &HistoryId) -> bool {
        if !self.entries.iter().any(|e| &e.id == id) {
            tracing::warn!(id = %id.as_str(), "Ignoring selection of unknown history entry");
            return false;
        }
        self.active = Some(id.clone());
        true
    }
}

/// First non-blank line of the answer, truncated on a char boundary
fn preview_of(content: &str) -> String {
    let line = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let mut chars = line.chars();
    let mut preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        preview.push('…');
    }
    preview
}

fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    match seconds {
        0..=44 => "less than a minute ago".to_string(),
        45..=3_599 => plural(((seconds + 30) / 60).max(1), "minute"),
        3_600..=86_399 => plural((seconds + 1_800) / 3_600, "hour"),
        86_400..=2_591_999 => plural((seconds + 43_200) / 86_400, "day"),
        _ => plural(seconds / 2_592_000, "month"),
    }
}
