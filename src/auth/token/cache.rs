//! Thread-safe in-memory cache of signed tokens keyed by credential string.

// self
use crate::{_prelude::*, auth::token::CACHE_TTL};

type CacheMap = Arc<RwLock<HashMap<String, CachedToken>>>;

/// Token cached for one credential together with the instant it was signed.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
	/// Signed token string.
	pub token: String,
	/// Instant the token was issued.
	pub issued_at: OffsetDateTime,
}
impl CachedToken {
	/// Creates a new cache entry.
	pub fn new(token: impl Into<String>, issued_at: OffsetDateTime) -> Self {
		Self { token: token.into(), issued_at }
	}

	/// Issue instant in milliseconds since the Unix epoch.
	pub fn issued_at_millis(&self) -> i64 {
		unix_millis(self.issued_at)
	}

	/// Returns `true` while the entry's age at `now` is strictly below [`CACHE_TTL`].
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		unix_millis(now) - self.issued_at_millis() < CACHE_TTL.whole_milliseconds() as i64
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

/// Shared token cache; clones observe the same entries.
///
/// Writes are last-writer-wins. Two callers racing on an expired entry may both sign a
/// fresh token and the later write replaces the earlier one; either token is valid.
///
/// Clearing remembers the issue instant of each dropped entry until the credential is cached
/// again, so a token re-signed in the same millisecond can still be told apart.
#[derive(Clone, Default)]
pub struct TokenCache {
	entries: CacheMap,
	retired: Arc<RwLock<HashMap<String, i64>>>,
}
impl TokenCache {
	/// Returns the cached token for `credential` if it is still fresh at `now`.
	pub fn fresh(&self, credential: &str, now: OffsetDateTime) -> Option<String> {
		self.entries
			.read()
			.get(credential)
			.filter(|entry| entry.is_fresh_at(now))
			.map(|entry| entry.token.clone())
	}

	/// Fetches the raw entry for `credential`, fresh or not.
	pub fn fetch(&self, credential: &str) -> Option<CachedToken> {
		self.entries.read().get(credential).cloned()
	}

	/// Stores `entry` under `credential`, replacing any prior entry.
	pub fn save(&self, credential: &str, entry: CachedToken) {
		self.entries.write().insert(credential.to_owned(), entry);
		self.retired.write().remove(credential);
	}

	/// Instant at which to sign a replacement token for `credential`.
	///
	/// This is `now` unless the last token cached for `credential` (live or cleared) was issued
	/// in the same millisecond or later, in which case it is one millisecond past that token.
	pub fn next_issue_instant(&self, credential: &str, now: OffsetDateTime) -> OffsetDateTime {
		let wanted = unix_millis(now);
		let live = self.entries.read().get(credential).map(CachedToken::issued_at_millis);
		let retired = self.retired.read().get(credential).copied();

		match live.max(retired) {
			Some(last) if last >= wanted => now + Duration::milliseconds(last + 1 - wanted),
			_ => now,
		}
	}

	/// Removes every entry.
	pub fn clear_all(&self) {
		let mut entries = self.entries.write();
		let mut retired = self.retired.write();

		for (credential, entry) in entries.drain() {
			retired.insert(credential, entry.issued_at_millis());
		}
	}

	/// Removes the entry for `credential`; no-op when absent.
	pub fn clear_one(&self, credential: &str) {
		let removed = self.entries.write().remove(credential);

		if let Some(entry) = removed {
			self.retired.write().insert(credential.to_owned(), entry.issued_at_millis());
		}
	}

	/// Number of cached credentials.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache").field("entries", &self.len()).finish()
	}
}

pub(crate) fn unix_millis(instant: OffsetDateTime) -> i64 {
	(instant.unix_timestamp_nanos() / 1_000_000) as i64
}
