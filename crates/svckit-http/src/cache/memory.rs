//! In-memory cache store.

use super::r#trait::{CacheError, CacheResult, CacheStore, Ttl};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Page size used when `scan` is called with a count of zero.
pub const DEFAULT_SCAN_COUNT: usize = 10;

/// How long an unused scan cursor stays valid.
pub const DEFAULT_CURSOR_IDLE: Duration = Duration::from_secs(60);

/// In-memory store entry.
struct StoreEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoreEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(Instant::now() + ttl)
        };
        Self { value, expires_at }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Position of an unfinished scan.
struct ScanCursor {
    last_key: String,
    issued_at: Instant,
}

/// In-process [`CacheStore`] with Redis semantics.
///
/// Expiry is lazy: expired entries are dropped when touched or by
/// [`MemoryStore::purge_expired`]. Scan cursors are remembered per iteration,
/// so deleting keys between pages never skips entries. A cursor left unused
/// for longer than the idle timeout is forgotten, and resuming it ends the
/// iteration.
pub struct MemoryStore {
    entries: DashMap<String, StoreEntry>,
    cursors: DashMap<u64, ScanCursor>,
    next_cursor: AtomicU64,
    cursor_idle: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            cursors: DashMap::new(),
            next_cursor: AtomicU64::new(0),
            cursor_idle: DEFAULT_CURSOR_IDLE,
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long an abandoned scan cursor is kept.
    pub fn with_cursor_idle(mut self, idle: Duration) -> Self {
        self.cursor_idle = idle;
        self
    }

    /// Number of scan cursors still held.
    pub fn open_cursors(&self) -> usize {
        self.cursors.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.value().is_live(now)).count()
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry and idle scan cursor, returning how many
    /// entries were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        self.drop_idle_cursors(now);
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    fn drop_idle_cursors(&self, now: Instant) {
        let idle = self.cursor_idle;
        self.cursors
            .retain(|_, cursor| now.saturating_duration_since(cursor.issued_at) < idle);
    }

    fn allocate_cursor(&self, last_key: String) -> u64 {
        let now = Instant::now();
        self.drop_idle_cursors(now);
        // Cursor 0 is reserved for "start" and "done".
        let id = self.next_cursor.fetch_add(1, Ordering::Relaxed) + 1;
        self.cursors.insert(
            id,
            ScanCursor {
                last_key,
                issued_at: now,
            },
        );
        id
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Ok(entry.value.clone());
            }
        }

        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Err(CacheError::NotFound)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.entries.insert(key.to_string(), StoreEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        let now = Instant::now();
        let mut deleted = 0;
        for key in keys {
            if let Some((_, entry)) = self.entries.remove(key) {
                if entry.is_live(now) {
                    deleted += 1;
                }
            }
        }
        Ok(deleted)
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> CacheResult<(Vec<String>, u64)> {
        let after = if cursor == 0 {
            None
        } else {
            match self.cursors.remove(&cursor) {
                Some((_, cursor)) => Some(cursor.last_key),
                // Unknown cursor: the iteration is over.
                None => return Ok((Vec::new(), 0)),
            }
        };

        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.value().is_live(now))
            .filter(|e| after.as_deref().map_or(true, |last| e.key().as_str() > last))
            .filter(|e| glob_match(pattern, e.key()))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();

        let page = if count == 0 { DEFAULT_SCAN_COUNT } else { count };
        if keys.len() <= page {
            return Ok((keys, 0));
        }

        keys.truncate(page);
        let next = match keys.last() {
            Some(last) => self.allocate_cursor(last.clone()),
            None => 0,
        };
        Ok((keys, next))
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| StoreEntry::new(b"0".to_vec(), Duration::ZERO));
        if !entry.is_live(now) {
            *entry = StoreEntry::new(b"0".to_vec(), Duration::ZERO);
        }

        let current: i64 = std::str::from_utf8(&entry.value)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CacheError::Backend("value is not an integer or out of range".into()))?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| CacheError::Backend("increment or decrement would overflow".into()))?;

        entry.value = next.to_string().into_bytes();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let now = Instant::now();
        let exists = match self.entries.get_mut(key) {
            Some(mut entry) if entry.is_live(now) => {
                entry.expires_at = Some(now + ttl);
                true
            }
            _ => false,
        };

        if exists && ttl.is_zero() {
            self.entries.remove(key);
        }
        Ok(exists)
    }

    async fn ttl(&self, key: &str) -> CacheResult<Ttl> {
        let now = Instant::now();
        let ttl = match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => match entry.expires_at {
                Some(at) => Ttl::Expires(at - now),
                None => Ttl::Persistent,
            },
            _ => Ttl::Missing,
        };
        Ok(ttl)
    }
}

/// Redis-style glob matching supporting `*`, `?` and `\` escapes.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            Some('?') => {
                p += 1;
                t += 1;
                continue;
            }
            Some('\\') if p + 1 < pattern.len() && pattern[p + 1] == text[t] => {
                p += 2;
                t += 1;
                continue;
            }
            Some(c) if *c != '\\' && *c == text[t] => {
                p += 1;
                t += 1;
                continue;
            }
            _ => {}
        }

        match backtrack {
            Some((star, matched)) => {
                p = star + 1;
                t = matched + 1;
                backtrack = Some((star, matched + 1));
            }
            None => return false,
        }
    }

    while pattern.get(p) == Some(&'*') {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("order*", "order:u1:list|"));
        assert!(glob_match("order*", "order"));
        assert!(!glob_match("order*", "book:order"));
        assert!(glob_match("*:u1*", "book:u1|"));
        assert!(glob_match("b?ok", "book"));
        assert!(!glob_match("b?ok", "brook"));
        assert!(glob_match("a\\*b*", "a*bc"));
        assert!(!glob_match("a\\*b*", "axbc"));
        assert!(glob_match("*", ""));
    }

    #[tokio::test]
    async fn test_get_set_delete() {
        let store = MemoryStore::new();

        assert_eq!(store.get("k").await, Err(CacheError::NotFound));
        store.set("k", b"v".to_vec(), Duration::ZERO).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), b"v".to_vec());

        let deleted = store.delete(&["k".to_string(), "missing".to_string()]).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.get("k").await, Err(CacheError::NotFound));
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible() {
        let store = MemoryStore::new();
        store.set("short", b"1".to_vec(), Duration::from_millis(20)).await.unwrap();
        store.set("long", b"2".to_vec(), Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("short").await, Err(CacheError::NotFound));
        assert_eq!(store.ttl("short").await.unwrap(), Ttl::Missing);
        assert_eq!(store.len(), 1);
        assert_eq!(store.purge_expired(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        store.set("a", b"1".to_vec(), Duration::from_millis(10)).await.unwrap();
        store.set("b", b"2".to_vec(), Duration::ZERO).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.purge_expired(), 1);
        assert!(!store.is_empty());
    }

    #[tokio::test]
    async fn test_scan_pages_until_exhausted() {
        let store = MemoryStore::new();
        for i in 0..25 {
            store.set(&format!("order:{:02}", i), b"x".to_vec(), Duration::ZERO).await.unwrap();
        }
        store.set("book:1", b"x".to_vec(), Duration::ZERO).await.unwrap();

        let mut cursor = 0;
        let mut seen = Vec::new();
        let mut pages = 0;
        loop {
            let (keys, next) = store.scan(cursor, "order*", 0).await.unwrap();
            seen.extend(keys);
            pages += 1;
            if next == 0 {
                break;
            }
            cursor = next;
        }

        assert_eq!(pages, 3);
        assert_eq!(seen.len(), 25);
        assert!(seen.iter().all(|k| k.starts_with("order:")));
    }

    #[tokio::test]
    async fn test_scan_survives_deletes_between_pages() {
        let store = MemoryStore::new();
        for i in 0..12 {
            store.set(&format!("k{:02}", i), b"x".to_vec(), Duration::ZERO).await.unwrap();
        }

        let (first, cursor) = store.scan(0, "k*", 5).await.unwrap();
        store.delete(&first).await.unwrap();

        let (second, cursor) = store.scan(cursor, "k*", 5).await.unwrap();
        assert_eq!(second.first().map(String::as_str), Some("k05"));
        store.delete(&second).await.unwrap();

        let (third, cursor) = store.scan(cursor, "k*", 5).await.unwrap();
        assert_eq!(third, vec!["k10".to_string(), "k11".to_string()]);
        assert_eq!(cursor, 0);
    }

    #[tokio::test]
    async fn test_finished_scans_leave_no_cursors() {
        let store = MemoryStore::new();
        for i in 0..7 {
            store.set(&format!("k{}", i), b"x".to_vec(), Duration::ZERO).await.unwrap();
        }

        let (_, cursor) = store.scan(0, "k*", 3).await.unwrap();
        assert_eq!(store.open_cursors(), 1);
        let (_, cursor) = store.scan(cursor, "k*", 3).await.unwrap();
        let (_, cursor) = store.scan(cursor, "k*", 3).await.unwrap();

        assert_eq!(cursor, 0);
        assert_eq!(store.open_cursors(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_cursors_are_dropped() {
        let store = MemoryStore::new().with_cursor_idle(Duration::from_millis(20));
        for i in 0..6 {
            store.set(&format!("k{}", i), b"x".to_vec(), Duration::ZERO).await.unwrap();
        }

        let (_, abandoned) = store.scan(0, "k*", 2).await.unwrap();
        store.scan(0, "k*", 2).await.unwrap();
        assert_eq!(store.open_cursors(), 2);

        tokio::time::sleep(Duration::from_millis(40)).await;
        store.purge_expired();
        assert_eq!(store.open_cursors(), 0);
        assert_eq!(store.scan(abandoned, "k*", 2).await.unwrap(), (Vec::new(), 0));

        // New pages also sweep cursors that went idle.
        store.scan(0, "k*", 2).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        store.scan(0, "k*", 2).await.unwrap();
        assert_eq!(store.open_cursors(), 1);
    }

    #[tokio::test]
    async fn test_incr() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("counter").await.unwrap(), 1);
        assert_eq!(store.incr("counter").await.unwrap(), 2);

        store.set("text", b"\"hello\"".to_vec(), Duration::ZERO).await.unwrap();
        assert!(matches!(store.incr("text").await, Err(CacheError::Backend(_))));
    }

    #[tokio::test]
    async fn test_incr_keeps_expiry() {
        let store = MemoryStore::new();
        store.set("hits", b"41".to_vec(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.incr("hits").await.unwrap(), 42);
        assert!(matches!(store.ttl("hits").await.unwrap(), Ttl::Expires(_)));
    }

    #[tokio::test]
    async fn test_expire_and_ttl() {
        let store = MemoryStore::new();
        assert!(!store.expire("missing", Duration::from_secs(5)).await.unwrap());

        store.set("k", b"v".to_vec(), Duration::ZERO).await.unwrap();
        assert_eq!(store.ttl("k").await.unwrap(), Ttl::Persistent);

        assert!(store.expire("k", Duration::from_secs(30)).await.unwrap());
        let remaining = store.ttl("k").await.unwrap().remaining().unwrap();
        assert!(remaining > Duration::from_secs(29));
        assert!(remaining <= Duration::from_secs(30));

        assert!(store.expire("k", Duration::ZERO).await.unwrap());
        assert_eq!(store.get("k").await, Err(CacheError::NotFound));
    }
}
