//! Identifier minting.
//!
//! Two kinds of identifiers are minted here:
//!
//! - Node ids: opaque hex strings. A time-seeded hash prefix distinguishes
//!   processes and a monotonic counter distinguishes nodes minted within one
//!   process, so ids stay unique across every partition this process touches
//!   even when subtrees are duplicated between partitions.
//! - Project ids: a slug derived from the project name plus a 4-character
//!   hex suffix.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Global counter for deterministic ID generation in tests.
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Serial counter distinguishing ids minted within one process.
static MINT_SERIAL: AtomicU64 = AtomicU64::new(0);

/// Whether to use deterministic IDs (for testing).
static USE_DETERMINISTIC_IDS: AtomicBool = AtomicBool::new(false);

/// Enable deterministic ID generation for testing.
///
/// When enabled, IDs use a counter instead of time-seeded entropy.
pub fn enable_deterministic_ids() {
    USE_DETERMINISTIC_IDS.store(true, Ordering::SeqCst);
    TEST_COUNTER.store(0, Ordering::SeqCst);
}

/// Disable deterministic ID generation.
pub fn disable_deterministic_ids() {
    USE_DETERMINISTIC_IDS.store(false, Ordering::SeqCst);
}

/// Derive a 64-bit entropy value from the current time.
fn entropy() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let state = RandomState::new();
    let mut hasher = state.build_hasher();
    #[allow(clippy::cast_possible_truncation)] // only entropy is needed, not precision
    hasher.write_u64(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64),
    );
    hasher.finish()
}

/// Mint a fresh node id.
///
/// Ids are 24 hex characters: a 16-character entropy prefix and an
/// 8-character process serial. In deterministic mode the id is
/// `node-<counter>` instead.
#[must_use]
pub fn mint_node_id() -> String {
    if USE_DETERMINISTIC_IDS.load(Ordering::SeqCst) {
        let count = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        format!("node-{count:04x}")
    } else {
        let serial = MINT_SERIAL.fetch_add(1, Ordering::SeqCst);
        format!("{:016x}{:08x}", entropy(), serial & 0xFFFF_FFFF)
    }
}

/// Convert a project name to a slug.
///
/// The slug is created by:
/// 1. Converting to lowercase
/// 2. Replacing non-alphanumeric characters with hyphens
/// 3. Collapsing multiple hyphens into one
/// 4. Trimming leading/trailing hyphens
/// 5. Truncating to 50 characters
#[must_use]
pub fn slugify(name: &str) -> String {
    const MAX_LEN: usize = 50;

    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // Start true to avoid leading hyphen

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }

    if slug.len() > MAX_LEN {
        slug.truncate(MAX_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Generate a project ID from a project name.
///
/// The ID is the slugified name plus a 4-character hex suffix.
#[must_use]
pub fn mint_project_id(name: &str) -> String {
    let slug = slugify(name);
    let suffix = if USE_DETERMINISTIC_IDS.load(Ordering::SeqCst) {
        let count = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        format!("{count:04x}")
    } else {
        format!("{:04x}", entropy() & 0xFFFF)
    };

    if slug.is_empty() {
        format!("project-{suffix}")
    } else {
        format!("{slug}-{suffix}")
    }
}
