/*!
 * Cache Snapshots
 *
 * Binary format, all integers little-endian:
 *
 * ```text
 * magic "SPRC" | version u32
 * { key_len u32 | value_len u32 | expires_at i64 | key | value }*
 * key_len = 0 | value_len = 0 | expires_at = 0        (sentinel)
 * ```
 *
 * `expires_at` is Unix milliseconds, `i64::MAX` for never. Shards are
 * written one at a time under their own read lock, so a snapshot is not
 * atomic across shards.
 */

use super::entry::unix_millis;
use super::sharded::Cache;
use crate::core::errors::{CacheError, CacheResult};
use crate::core::limits::{SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use crate::monitoring::span_operation;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bytes in a record header (and in the sentinel)
const RECORD_HEADER_SIZE: usize = 16;

/// Bytes before the first record
const PREAMBLE_SIZE: usize = SNAPSHOT_MAGIC.len() + 4;

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize every unexpired entry
pub(crate) fn encode(cache: &Cache) -> (Bytes, usize) {
    let now = unix_millis();
    let mut buf = BytesMut::with_capacity(PREAMBLE_SIZE + RECORD_HEADER_SIZE);
    buf.put_slice(&SNAPSHOT_MAGIC);
    buf.put_u32_le(SNAPSHOT_VERSION);

    let mut written = 0;
    for entries in cache.snapshot_shards() {
        for entry in entries.iter().filter(|entry| !entry.is_expired(now)) {
            let (key, value) = (entry.key(), entry.value());
            buf.reserve(RECORD_HEADER_SIZE + key.len() + value.len());
            buf.put_u32_le(entry.key_len());
            // Lengths were checked against u32 when the entry was built
            buf.put_u32_le(value.len() as u32);
            buf.put_i64_le(entry.expires_at());
            buf.put_slice(key);
            buf.put_slice(value);
            written += 1;
        }
    }

    buf.put_bytes(0, RECORD_HEADER_SIZE);
    (buf.freeze(), written)
}

/// Apply records from `data`; returns how many entries were inserted
///
/// Records are applied as they are read. On error, entries before the
/// failing record stay in the cache.
pub(crate) fn decode(cache: &Cache, mut data: Bytes) -> CacheResult<usize> {
    let total = data.len();
    if data.remaining() < PREAMBLE_SIZE {
        return Err(CacheError::BadMagic);
    }
    if data[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
        return Err(CacheError::BadMagic);
    }
    data.advance(SNAPSHOT_MAGIC.len());

    let version = data.get_u32_le();
    if version != SNAPSHOT_VERSION {
        return Err(CacheError::UnsupportedVersion(version));
    }

    let now = unix_millis();
    let mut loaded = 0;
    loop {
        let offset = total - data.remaining();
        if data.remaining() < RECORD_HEADER_SIZE {
            return Err(CacheError::Truncated { offset });
        }

        let key_len = data.get_u32_le() as usize;
        let value_len = data.get_u32_le() as usize;
        let expires_at = data.get_i64_le();

        if key_len == 0 && value_len == 0 {
            break;
        }
        if key_len == 0 {
            return Err(CacheError::Malformed(format!(
                "empty key with {} value bytes at byte {}",
                value_len, offset
            )));
        }
        let body = key_len.checked_add(value_len).ok_or_else(|| {
            CacheError::Malformed(format!(
                "record lengths overflow at byte {}",
                offset
            ))
        })?;
        if data.remaining() < body {
            return Err(CacheError::Truncated { offset });
        }

        let key = data.split_to(key_len);
        let value = data.split_to(value_len);
        if expires_at <= now {
            continue;
        }

        cache.insert_with_expiry(&key, &value, expires_at)?;
        loaded += 1;
    }

    if data.has_remaining() {
        warn!(
            trailing = data.remaining(),
            "Ignoring bytes after snapshot sentinel"
        );
    }

    Ok(loaded)
}

impl Cache {
    /// Write every unexpired entry to `path`
    ///
    /// The snapshot goes to `<path>.tmp` first and is renamed into place,
    /// so a failed save leaves any previous snapshot intact. Returns the
    /// number of entries written.
    pub fn save(&self, path: impl AsRef<Path>) -> CacheResult<usize> {
        let path = path.as_ref();
        let op = span_operation("cache.save");
        let _entered = op.enter();

        let (data, written) = encode(self);
        let tmp = tmp_path(path);

        if let Err(e) = fs::write(&tmp, &data).and_then(|()| fs::rename(&tmp, path)) {
            warn!(path = %path.display(), error = %e, "Cache snapshot save failed");
            let _ = fs::remove_file(&tmp);
            op.record_result(false);
            return Err(e.into());
        }
        op.record_items(written);
        op.record_result(true);

        info!(
            path = %path.display(),
            entries = written,
            bytes = data.len(),
            "Cache snapshot saved"
        );
        Ok(written)
    }

    /// Insert every unexpired entry stored in `path`
    ///
    /// Existing keys are overwritten. Bad magic or an unknown version is
    /// rejected before anything is applied; a truncated or malformed record
    /// aborts the load with earlier records already applied. Returns the
    /// number of entries inserted.
    pub fn load(&self, path: impl AsRef<Path>) -> CacheResult<usize> {
        let path = path.as_ref();
        let op = span_operation("cache.load");
        let _entered = op.enter();

        let data = Bytes::from(fs::read(path)?);
        let size = data.len();

        let result = decode(self, data);
        op.record_result(result.is_ok());
        match result {
            Ok(loaded) => {
                op.record_items(loaded);
                info!(path = %path.display(), entries = loaded, bytes = size, "Cache snapshot loaded");
                Ok(loaded)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache snapshot load aborted");
                Err(e)
            }
        }
    }
}
