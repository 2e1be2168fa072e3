//! Module containing functionality related to BSON ObjectIds.

use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use once_cell::sync::Lazy;
use rand::{random, thread_rng, Rng};

use crate::error::{Error, Result};

static OID_COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(thread_rng().gen_range(0..=0xFF_FFFF)));

/// A wrapper around a raw 12-byte ObjectId.
///
/// Generated ids consist of a 4-byte big-endian seconds-since-epoch timestamp,
/// a 5-byte process-random value, and a 3-byte incrementing counter seeded
/// randomly at startup.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObjectId {
    id: [u8; 12],
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectId {
    /// Generates a new [`ObjectId`], represented in bytes.
    /// See the [docs](http://dochub.mongodb.org/core/objectids) for more information.
    pub fn new() -> Self {
        let timestamp = Self::gen_timestamp();
        let process_id = Self::gen_process_id();
        let counter = Self::gen_count();

        let mut buf: [u8; 12] = [0; 12];
        buf[0..4].copy_from_slice(&timestamp);
        buf[4..9].copy_from_slice(&process_id);
        buf[9..12].copy_from_slice(&counter);

        Self::from_bytes(buf)
    }

    /// Constructs a new ObjectId wrapper around the raw byte representation.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self { id: bytes }
    }

    /// Returns the raw byte representation of an ObjectId.
    pub const fn bytes(&self) -> [u8; 12] {
        self.id
    }

    /// Retrieves the timestamp from an [`ObjectId`] as seconds since the Unix epoch.
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.id[0], self.id[1], self.id[2], self.id[3]])
    }

    /// Convert this [`ObjectId`] to its hex string representation.
    pub fn to_hex(self) -> String {
        hex::encode(self.id)
    }

    /// Convert a hex string to an [`ObjectId`].
    pub fn parse_str(s: impl AsRef<str>) -> Result<Self> {
        let s = s.as_ref();

        if s.len() != 24 {
            return Err(Error::incompatible_type_conversion(format!(
                "expected 24-character hex ObjectId, got {} characters",
                s.len()
            )));
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| {
            Error::incompatible_type_conversion(format!("invalid ObjectId hex: {}", e))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    fn gen_timestamp() -> [u8; 4] {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0) as u32;
        secs.to_be_bytes()
    }

    fn gen_process_id() -> [u8; 5] {
        static BUF: Lazy<[u8; 5]> = Lazy::new(random);

        *BUF
    }

    fn gen_count() -> [u8; 3] {
        let count = OID_COUNTER.fetch_add(1, Ordering::SeqCst) & 0xFF_FFFF;
        let [_, b1, b2, b3] = count.to_be_bytes();
        [b1, b2, b3]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}
