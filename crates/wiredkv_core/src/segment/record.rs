//! The segment record.

use super::header::SegmentHeader;
use super::{unix_now, CRC_SIZE, HEADER_SIZE};
use crate::error::{CoreError, CoreResult};
use crate::kind::Kind;
use crate::transform::Transformer;
use crate::types::{Binary, Deserializable, List, Number, Serializable, Set, Tables, Text, ZSet};
use tracing::debug;
use wiredkv_storage::StorageBackend;

/// One key/value write, or one deletion, in the append log.
///
/// Segments are immutable. The value is always stored exactly as the
/// [`Transformer`] produced it; reading it back as a typed value goes
/// through the same transformer in reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    tombstone: bool,
    kind: Kind,
    expired_at: u64,
    created_at: u64,
    key: Vec<u8>,
    value: Vec<u8>,
}

impl Segment {
    /// Builds a value record stamped with the current time.
    ///
    /// `ttl` is in seconds; 0 means the record never expires.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnsupportedType`] if `V` is not one of the value types
    /// - [`CoreError::Serialization`] if the value cannot be encoded
    /// - [`CoreError::Compression`] / [`CoreError::Encryption`] if a
    ///   transform stage fails
    /// - [`CoreError::RecordTooLarge`] if the key or transformed value does
    ///   not fit a 32-bit size field
    pub fn new<V: Serializable>(
        key: impl Into<Vec<u8>>,
        value: &V,
        ttl: u64,
        transformer: &Transformer,
    ) -> CoreResult<Self> {
        Self::new_at(key, value, ttl, transformer, unix_now())
    }

    /// Like [`new`](Self::new), with the construction time given as `now`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn new_at<V: Serializable>(
        key: impl Into<Vec<u8>>,
        value: &V,
        ttl: u64,
        transformer: &Transformer,
        now: u64,
    ) -> CoreResult<Self> {
        let kind = Kind::of::<V>();
        if !kind.is_known() {
            return Err(CoreError::UnsupportedType {
                type_name: std::any::type_name::<V>(),
            });
        }

        let key = key.into();
        check_size("key", key.len())?;

        let expired_at = if ttl > 0 { now.saturating_add(ttl) } else { 0 };

        let canonical = value.to_canonical_bytes()?;
        let value = transformer.encode(&canonical)?;
        check_size("value", value.len())?;

        debug!(
            %kind,
            key_size = key.len(),
            canonical_size = canonical.len(),
            value_size = value.len(),
            expired_at,
            "built segment"
        );

        Ok(Self {
            tombstone: false,
            kind,
            expired_at,
            created_at: now,
            key,
            value,
        })
    }

    /// Builds a deletion marker for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RecordTooLarge`] if the key does not fit a 32-bit
    /// size field.
    pub fn tombstone(key: impl Into<Vec<u8>>) -> CoreResult<Self> {
        let key = key.into();
        check_size("key", key.len())?;
        Ok(Self {
            tombstone: true,
            kind: Kind::default(),
            expired_at: 0,
            created_at: 0,
            key,
            value: Vec::new(),
        })
    }

    /// Returns whether this record marks a deletion.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.tombstone
    }

    /// Returns the value type tag.
    ///
    /// Tombstones carry no value; their tag is always the zero tag
    /// ([`Kind::Set`]) and means nothing. Check
    /// [`is_tombstone`](Self::is_tombstone) first.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the expiry in Unix seconds, 0 if the record never expires.
    #[must_use]
    pub fn expired_at(&self) -> u64 {
        self.expired_at
    }

    /// Returns the creation time in Unix seconds.
    #[must_use]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Returns the raw key.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Returns the transformed value bytes.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Key length in bytes.
    #[must_use]
    pub fn key_size(&self) -> u32 {
        self.key.len() as u32
    }

    /// Transformed value length in bytes.
    #[must_use]
    pub fn value_size(&self) -> u32 {
        self.value.len() as u32
    }

    /// Exact on-disk length: header, key, value and CRC trailer.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.header().record_size()
    }

    /// Returns the header describing this record.
    #[must_use]
    pub fn header(&self) -> SegmentHeader {
        SegmentHeader {
            tombstone: self.tombstone,
            kind: self.kind,
            expired_at: self.expired_at,
            created_at: self.created_at,
            key_size: self.key_size(),
            value_size: self.value_size(),
        }
    }

    /// Seconds left before expiry, measured from now.
    ///
    /// Returns -1 both when no expiry is set and when the record has already
    /// expired; use [`is_expired`](Self::is_expired) to tell them apart.
    #[must_use]
    pub fn ttl(&self) -> i64 {
        self.ttl_at(unix_now())
    }

    /// Seconds left before expiry, measured from `now`, or -1.
    #[must_use]
    pub fn ttl_at(&self, now: u64) -> i64 {
        if self.expired_at > 0 && self.expired_at > now {
            i64::try_from(self.expired_at - now).unwrap_or(i64::MAX)
        } else {
            -1
        }
    }

    /// Returns true if an expiry is set and has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    /// Returns true if an expiry is set and is at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expired_at > 0 && self.expired_at <= now
    }

    /// Decodes the value as `T`.
    ///
    /// Returns `Ok(None)` for tombstones and when the record holds a
    /// different kind. Otherwise reverses `transformer` on the stored bytes
    /// and deserializes the result.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decryption`], [`CoreError::Decompression`] or
    /// [`CoreError::Deserialization`] for the stage that failed.
    pub fn project<T: Deserializable>(&self, transformer: &Transformer) -> CoreResult<Option<T>> {
        if self.tombstone || self.kind != Kind::of::<T>() {
            return Ok(None);
        }
        let canonical = transformer.decode(&self.value)?;
        T::from_canonical_bytes(&canonical).map(Some)
    }

    /// Decodes the value as a [`Set`].
    ///
    /// # Errors
    ///
    /// See [`project`](Self::project).
    pub fn to_set(&self, transformer: &Transformer) -> CoreResult<Option<Set>> {
        self.project(transformer)
    }

    /// Decodes the value as a [`ZSet`].
    ///
    /// # Errors
    ///
    /// See [`project`](Self::project).
    pub fn to_zset(&self, transformer: &Transformer) -> CoreResult<Option<ZSet>> {
        self.project(transformer)
    }

    /// Decodes the value as a [`List`].
    ///
    /// # Errors
    ///
    /// See [`project`](Self::project).
    pub fn to_list(&self, transformer: &Transformer) -> CoreResult<Option<List>> {
        self.project(transformer)
    }

    /// Decodes the value as a [`Text`].
    ///
    /// # Errors
    ///
    /// See [`project`](Self::project).
    pub fn to_text(&self, transformer: &Transformer) -> CoreResult<Option<Text>> {
        self.project(transformer)
    }

    /// Decodes the value as a [`Tables`].
    ///
    /// # Errors
    ///
    /// See [`project`](Self::project).
    pub fn to_tables(&self, transformer: &Transformer) -> CoreResult<Option<Tables>> {
        self.project(transformer)
    }

    /// Decodes the value as a [`Binary`].
    ///
    /// # Errors
    ///
    /// See [`project`](Self::project).
    pub fn to_binary(&self, transformer: &Transformer) -> CoreResult<Option<Binary>> {
        self.project(transformer)
    }

    /// Decodes the value as a [`Number`].
    ///
    /// # Errors
    ///
    /// See [`project`](Self::project).
    pub fn to_number(&self, transformer: &Transformer) -> CoreResult<Option<Number>> {
        self.project(transformer)
    }

    /// Encodes the record to its on-disk bytes, CRC trailer included.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size() as usize);
        buf.extend_from_slice(&self.header().encode());
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);

        let crc = crc32fast::hash(&buf);
        buf.extend_from_slice(&crc.to_be_bytes());
        buf
    }

    /// Decodes a record from the start of `data`.
    ///
    /// Bytes after the record are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SegmentCorruption`] for malformed or truncated
    /// input and [`CoreError::ChecksumMismatch`] if the CRC does not match.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        let header = SegmentHeader::decode(data)?;
        let record_len = usize::try_from(header.record_size())
            .map_err(|_| CoreError::segment_corruption("record length overflows usize"))?;

        if data.len() < record_len {
            return Err(CoreError::segment_corruption(format!(
                "incomplete record: need {record_len} bytes, have {}",
                data.len()
            )));
        }

        let crc_at = record_len - CRC_SIZE;
        let mut stored = [0u8; CRC_SIZE];
        stored.copy_from_slice(&data[crc_at..record_len]);
        let expected = u32::from_be_bytes(stored);
        let actual = crc32fast::hash(&data[..crc_at]);
        if expected != actual {
            return Err(CoreError::ChecksumMismatch { expected, actual });
        }

        let key_end = HEADER_SIZE + header.key_size as usize;
        Ok(Self {
            tombstone: header.tombstone,
            kind: header.kind,
            expired_at: header.expired_at,
            created_at: header.created_at,
            key: data[HEADER_SIZE..key_end].to_vec(),
            value: data[key_end..crc_at].to_vec(),
        })
    }

    /// Reads and decodes the record starting at `offset` in `source`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ReadAt`] if the backend cannot supply the bytes,
    /// or any error from [`decode`](Self::decode).
    pub fn read_at<B>(source: &B, offset: u64) -> CoreResult<Self>
    where
        B: StorageBackend + ?Sized,
    {
        let head = source
            .read_at(offset, HEADER_SIZE)
            .map_err(CoreError::ReadAt)?;
        let header = SegmentHeader::decode(&head)?;
        let record_len = usize::try_from(header.record_size())
            .map_err(|_| CoreError::segment_corruption("record length overflows usize"))?;

        let record = source
            .read_at(offset, record_len)
            .map_err(CoreError::ReadAt)?;
        Self::decode(&record)
    }
}

fn check_size(field: &'static str, len: usize) -> CoreResult<()> {
    if u32::try_from(len).is_err() {
        return Err(CoreError::RecordTooLarge { field, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapabilityError;
    use crate::transform::{AesGcmEncryptor, Compressor, Lz4Compressor};
    use wiredkv_storage::InMemoryBackend;

    const NOW: u64 = 1_700_000_000;
    const SECRET: &[u8] = b"0123456789abcdef";

    fn sealed_transformer() -> Transformer {
        let mut transformer = Transformer::new();
        transformer.set_compressor(Lz4Compressor);
        transformer.set_encryptor(AesGcmEncryptor, SECRET).unwrap();
        transformer
    }

    struct Foreign;

    impl Serializable for Foreign {
        fn to_canonical_bytes(&self) -> CoreResult<Vec<u8>> {
            Ok(vec![1, 2, 3])
        }
    }

    struct FailingCompressor;

    impl Compressor for FailingCompressor {
        fn compress(&self, _data: &[u8]) -> Result<Vec<u8>, CapabilityError> {
            Err("no space left".into())
        }

        fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CapabilityError> {
            Ok(data.to_vec())
        }
    }

    #[test]
    fn number_record_without_ttl() {
        let transformer = Transformer::new();
        let segment = Segment::new_at("user:1", &Number::new(42), 0, &transformer, NOW).unwrap();

        assert_eq!(segment.kind(), Kind::Number);
        assert_eq!(segment.expired_at(), 0);
        assert_eq!(segment.created_at(), NOW);
        assert_eq!(segment.ttl_at(NOW), -1);
        assert_eq!(segment.key_size(), 6);
        assert!(!segment.is_tombstone());
        assert_eq!(segment.to_number(&transformer).unwrap(), Some(Number::new(42)));
    }

    #[test]
    fn size_uses_transformed_value_length() {
        let transformer = sealed_transformer();
        let text = Text::new("a fairly repetitive value ".repeat(20));
        let segment = Segment::new_at(b"k".to_vec(), &text, 0, &transformer, NOW).unwrap();

        let canonical = text.to_canonical_bytes().unwrap();
        assert_ne!(segment.value().len(), canonical.len());
        assert_eq!(segment.value_size() as usize, segment.value().len());
        assert_eq!(segment.size(), 26 + 1 + u64::from(segment.value_size()) + 4);
        assert_eq!(segment.encode().len() as u64, segment.size());
    }

    #[test]
    fn tombstone_has_no_value() {
        let segment = Segment::tombstone("user:9").unwrap();
        assert!(segment.is_tombstone());
        assert_eq!(segment.value_size(), 0);
        assert_eq!(segment.key_size(), 6);
        assert_eq!(segment.expired_at(), 0);
        assert_eq!(segment.created_at(), 0);
        assert_eq!(segment.size(), 26 + 6 + 4);
        assert_eq!(segment.to_number(&Transformer::new()).unwrap(), None);
        assert_eq!(segment.kind(), Kind::Set);
        assert_eq!(segment.to_set(&Transformer::new()).unwrap(), None);
    }

    #[test]
    fn ttl_counts_down_then_expires() {
        let transformer = Transformer::new();
        let segment = Segment::new_at("session", &Text::new("x"), 10, &transformer, NOW).unwrap();

        assert_eq!(segment.expired_at(), NOW + 10);
        assert_eq!(segment.ttl_at(NOW), 10);
        assert_eq!(segment.ttl_at(NOW + 9), 1);
        assert_eq!(segment.ttl_at(NOW + 10), -1);
        assert_eq!(segment.ttl_at(NOW + 20), -1);
        assert!(!segment.is_expired_at(NOW + 9));
        assert!(segment.is_expired_at(NOW + 10));
    }

    #[test]
    fn ttl_against_wall_clock() {
        let transformer = Transformer::new();
        let live = Segment::new("k", &Number::new(1), 10, &transformer).unwrap();
        let ttl = live.ttl();
        assert!((1..=10).contains(&ttl), "ttl = {ttl}");
        assert!(!live.is_expired());

        let forever = Segment::new("k", &Number::new(1), 0, &transformer).unwrap();
        assert_eq!(forever.ttl(), -1);
        assert!(!forever.is_expired());
    }

    #[test]
    fn expired_record_reports_minus_one() {
        let transformer = Transformer::new();
        let now = unix_now();
        let segment = Segment::new_at("old", &Number::new(1), 10, &transformer, now - 20).unwrap();
        assert_eq!(segment.ttl(), -1);
        assert!(segment.is_expired());
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let err = Segment::new("k", &Foreign, 0, &Transformer::new()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedType { type_name } if type_name.ends_with("Foreign")
        ));
    }

    #[test]
    fn transform_failure_aborts_construction() {
        let mut transformer = Transformer::new();
        transformer.set_compressor(FailingCompressor);
        let err = Segment::new("k", &Text::new("v"), 0, &transformer).unwrap_err();
        assert!(matches!(err, CoreError::Compression { .. }));
    }

    #[test]
    fn projection_checks_kind() {
        let transformer = sealed_transformer();
        let set: Set = ["a", "b"].into_iter().collect();
        let segment = Segment::new_at("tags", &set, 0, &transformer, NOW).unwrap();

        assert_eq!(segment.to_set(&transformer).unwrap(), Some(set));
        assert_eq!(segment.to_zset(&transformer).unwrap(), None);
        assert_eq!(segment.to_list(&transformer).unwrap(), None);
        assert_eq!(segment.to_text(&transformer).unwrap(), None);
        assert_eq!(segment.to_tables(&transformer).unwrap(), None);
        assert_eq!(segment.to_binary(&transformer).unwrap(), None);
        assert_eq!(segment.to_number(&transformer).unwrap(), None);
    }

    #[test]
    fn every_kind_projects_back() {
        let transformer = sealed_transformer();

        let mut zset = ZSet::new();
        zset.add("alice", 9.5);
        let s = Segment::new_at("z", &zset, 0, &transformer, NOW).unwrap();
        assert_eq!(s.to_zset(&transformer).unwrap(), Some(zset));

        let mut list = List::new();
        list.push("head");
        list.push(7);
        let s = Segment::new_at("l", &list, 0, &transformer, NOW).unwrap();
        assert_eq!(s.to_list(&transformer).unwrap(), Some(list));

        let mut tables = Tables::new();
        tables.insert("name", "alice");
        let s = Segment::new_at("t", &tables, 0, &transformer, NOW).unwrap();
        assert_eq!(s.to_tables(&transformer).unwrap(), Some(tables));

        let binary = Binary::new(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let s = Segment::new_at("b", &binary, 0, &transformer, NOW).unwrap();
        assert_eq!(s.to_binary(&transformer).unwrap(), Some(binary));

        let text = Text::new("hello");
        let s = Segment::new_at("x", &text, 0, &transformer, NOW).unwrap();
        assert_eq!(s.to_text(&transformer).unwrap(), Some(text));
    }

    #[test]
    fn projection_with_wrong_secret_fails() {
        let writer = sealed_transformer();
        let segment = Segment::new_at("k", &Number::new(5), 0, &writer, NOW).unwrap();

        let mut reader = Transformer::new();
        reader.set_compressor(Lz4Compressor);
        reader
            .set_encryptor(AesGcmEncryptor, b"a-different-secret".to_vec())
            .unwrap();
        assert!(matches!(
            segment.to_number(&reader),
            Err(CoreError::Decryption { .. })
        ));
    }

    #[test]
    fn encode_decode_preserves_fields() {
        let transformer = sealed_transformer();
        let segment =
            Segment::new_at("user:1", &Text::new("alice"), 30, &transformer, NOW).unwrap();

        let bytes = segment.encode();
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], Kind::Text.as_byte());
        assert_eq!(&bytes[2..10], &(NOW + 30).to_be_bytes());
        assert_eq!(&bytes[26..32], b"user:1");

        let decoded = Segment::decode(&bytes).unwrap();
        assert_eq!(decoded, segment);
        assert_eq!(decoded.to_text(&transformer).unwrap(), Some(Text::new("alice")));
    }

    #[test]
    fn tombstone_encodes_zeroed_fields() {
        let bytes = Segment::tombstone("gone").unwrap().encode();
        assert_eq!(bytes.len(), 26 + 4 + 4);
        assert_eq!(bytes[0], 1);
        assert!(bytes[1..18].iter().all(|b| *b == 0));

        let decoded = Segment::decode(&bytes).unwrap();
        assert!(decoded.is_tombstone());
        assert_eq!(decoded.key(), b"gone");
    }

    #[test]
    fn flipped_byte_fails_checksum() {
        let segment = Segment::new_at("k", &Number::new(1), 0, &Transformer::new(), NOW).unwrap();
        let mut bytes = segment.encode();
        bytes[12] ^= 0x01;
        assert!(matches!(
            Segment::decode(&bytes),
            Err(CoreError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn truncated_record_is_corruption() {
        let segment = Segment::new_at("k", &Number::new(1), 0, &Transformer::new(), NOW).unwrap();
        let bytes = segment.encode();
        assert!(matches!(
            Segment::decode(&bytes[..bytes.len() - 1]),
            Err(CoreError::SegmentCorruption { .. })
        ));
    }

    #[test]
    fn read_records_back_from_log() {
        let transformer = sealed_transformer();
        let first = Segment::new_at("a", &Number::new(1), 0, &transformer, NOW).unwrap();
        let second = Segment::tombstone("a").unwrap();

        let mut log = InMemoryBackend::new();
        let off1 = log.append(&first.encode()).unwrap();
        let off2 = log.append(&second.encode()).unwrap();
        assert_eq!(off2, first.size());

        assert_eq!(Segment::read_at(&log, off1).unwrap(), first);
        assert_eq!(Segment::read_at(&log, off2).unwrap(), second);

        let value = transformer
            .read_at(&log, off1 + 26 + 1, first.value_size() as usize)
            .unwrap();
        assert_eq!(Number::from_canonical_bytes(&value).unwrap(), Number::new(1));
    }

    #[test]
    fn read_past_end_of_log_fails() {
        let log = InMemoryBackend::new();
        assert!(matches!(Segment::read_at(&log, 0), Err(CoreError::ReadAt(_))));
    }
}
