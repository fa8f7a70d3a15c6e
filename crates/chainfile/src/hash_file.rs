//! Hash file lifecycle and the chained-overflow engine
//!
//! A hash file maps keys onto a fixed primary area of record slots via a
//! caller-supplied hash function. Synonyms (different keys hashing to an
//! occupied slot) go to an append-only overflow area and are linked into
//! a per-slot chain through each record's `next_chain` pointer.
//!
//! The file layout, in `record_size`-byte slots: RBN 0 holds the header,
//! RBNs `1..=num_primary` form the primary area, and everything above
//! `num_primary` up to the header's `high_overflow_rbn` is overflow.
//! Primary slots are not pre-written; a slot that was never inserted into
//! is simply absent past the end of file.

use crate::block::BlockFile;
use crate::error::{ChainFileError, Result};
use crate::header::{HashHeader, HEADER_RBN};
use crate::record::Record;
use crate::types::{HashFn, Rbn, RecordKey};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::num::NonZeroU64;
use std::path::Path;
use tracing::{debug, trace};

/// Slot contents as seen by the engine. A short read past the end of
/// file and a written slot whose key field is the empty sentinel mean
/// the same thing: nothing is stored there.
enum SlotState {
    Empty,
    Occupied(Record),
}

/// An open hash file: the file resource, its loaded header, and the
/// injected key → slot function.
///
/// The in-memory header always equals the header last written at RBN 0.
/// The handle assumes exclusive access; there is no locking and no
/// multi-writer coordination.
#[derive(Debug)]
pub struct HashFile {
    blocks: BlockFile,
    header: HashHeader,
    hash: HashFn,
}

impl HashFile {
    /// Create a new hash file holding only the header record.
    ///
    /// Fails with `FileExists` if `path` already has a file, and with
    /// `BadRecordSize` if `record_size` cannot hold the record layout.
    /// The primary area is not pre-extended; unwritten slots read back
    /// as absent until their first insert.
    pub fn create<P: AsRef<Path>>(path: P, num_primary: u64, record_size: u32) -> Result<()> {
        let path = path.as_ref();
        // Existence probe: an open-for-read that succeeds means the file
        // is already there.
        if File::open(path).is_ok() {
            return Err(ChainFileError::FileExists(path.display().to_string()));
        }
        let header = HashHeader::new(num_primary, record_size)?;
        debug!(
            "creating hash file {:?}: num_primary={num_primary} record_size={record_size}",
            path
        );
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        let mut blocks = BlockFile::new(file, record_size);
        blocks.write_record(HEADER_RBN, &header.encode()?)
    }

    /// Open an existing hash file and load its header.
    ///
    /// `hash` is the key → primary slot strategy used by every later
    /// insert and lookup; it must return slots in `1..=num_primary`.
    pub fn open<P: AsRef<Path>>(path: P, hash: HashFn) -> Result<Self> {
        let path = path.as_ref();
        let mut file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ChainFileError::FileNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let mut fixed = [0u8; HashHeader::FIXED_SIZE];
        if file.read_exact(&mut fixed).is_err() {
            return Err(ChainFileError::HeaderNotFound);
        }
        let header = HashHeader::decode(&fixed)?;
        // The header must occupy a full record slot, like everything else.
        if file.metadata()?.len() < u64::from(header.record_size()) {
            return Err(ChainFileError::HeaderNotFound);
        }
        debug!(
            "opened hash file {:?}: num_primary={} high_overflow_rbn={}",
            path,
            header.num_primary(),
            header.high_overflow_rbn()
        );
        Ok(Self {
            blocks: BlockFile::new(file, header.record_size()),
            header,
            hash,
        })
    }

    pub fn header(&self) -> &HashHeader {
        &self.header
    }

    /// Insert a record, returning the RBN it landed at.
    ///
    /// The key's primary slot takes the record if it is empty. Otherwise
    /// the synonym chain is walked to its tail and the record is appended
    /// in a newly allocated overflow slot (FIFO chain order, never head
    /// insertion). A duplicate key anywhere in the chain fails with
    /// `RecordExists` and mutates nothing.
    pub fn insert(&mut self, mut record: Record) -> Result<Rbn> {
        let slot = (self.hash)(&record.key, self.header.num_primary());
        trace!("insert key={} hashed to slot {slot}", record.key);
        let head = match self.read_slot(slot)? {
            SlotState::Empty => {
                record.next_chain = None;
                self.write_at(slot, &record)?;
                debug!("inserted key={} at primary slot {slot}", record.key);
                return Ok(slot);
            }
            SlotState::Occupied(head) => head,
        };
        if head.key == record.key {
            return Err(ChainFileError::RecordExists(record.key.to_string()));
        }

        // Walk the chain to its tail, watching for a duplicate key.
        let mut tail_rbn = slot;
        let mut tail = head;
        while let Some(next) = tail.next_chain {
            let next_rbn = next.get();
            let current = self.read_chained(next_rbn)?;
            if current.key == record.key {
                return Err(ChainFileError::RecordExists(record.key.to_string()));
            }
            tail_rbn = next_rbn;
            tail = current;
        }

        // Grow the overflow area. The header is persisted before the new
        // record is written and before the tail is relinked; a crash in
        // between leaves an allocated slot that later reads treat as
        // empty. Known inconsistency window, no recovery mechanism.
        let new_rbn = self.header.bump_overflow();
        let header_bytes = self.header.encode()?;
        self.blocks.write_record(HEADER_RBN, &header_bytes)?;
        record.next_chain = None;
        self.write_at(new_rbn, &record)?;
        tail.next_chain = NonZeroU64::new(new_rbn);
        self.write_at(tail_rbn, &tail)?;
        debug!(
            "inserted key={} at overflow rbn {new_rbn}, chained from rbn {tail_rbn}",
            record.key
        );
        Ok(new_rbn)
    }

    /// Look up a record by key, returning it with the RBN it occupies.
    ///
    /// A short read while walking the chain halts the walk and reports
    /// `RecordNotFound`; a broken chain and an absent key are the same
    /// outcome, keeping the contract total over damaged files.
    pub fn lookup(&mut self, key: &RecordKey) -> Result<(Record, Rbn)> {
        let slot = (self.hash)(key, self.header.num_primary());
        trace!("lookup key={key} hashed to slot {slot}");
        let head = match self.read_slot(slot)? {
            SlotState::Empty => {
                return Err(ChainFileError::RecordNotFound(key.to_string()));
            }
            SlotState::Occupied(head) => head,
        };
        if head.key == *key {
            return Ok((head, slot));
        }
        let mut next = head.next_chain;
        while let Some(rbn) = next {
            let rbn = rbn.get();
            let Ok(current) = self.read_chained(rbn) else {
                break;
            };
            if current.key == *key {
                return Ok((current, rbn));
            }
            next = current.next_chain;
        }
        Err(ChainFileError::RecordNotFound(key.to_string()))
    }

    /// Replace the payload of the stored record carrying `record.key`.
    ///
    /// The stored record's `next_chain` is preserved; callers cannot
    /// corrupt chain linkage through an update.
    pub fn update(&mut self, mut record: Record) -> Result<()> {
        let (stored, rbn) = self.lookup(&record.key)?;
        record.next_chain = stored.next_chain;
        self.write_at(rbn, &record)?;
        debug!("updated key={} at rbn {rbn}", record.key);
        Ok(())
    }

    /// Record deletion is not supported: always fails with
    /// `NotImplemented`, performing no I/O and no state change.
    pub fn delete(&mut self, _key: &RecordKey) -> Result<()> {
        Err(ChainFileError::NotImplemented("delete"))
    }

    /// Iterate every stored record in RBN order, primary area first,
    /// then overflow. Absent and never-written slots are skipped.
    pub fn records(&mut self) -> Records<'_> {
        Records { file: self, rbn: 1 }
    }

    fn read_slot(&mut self, rbn: Rbn) -> Result<SlotState> {
        match self.blocks.read_record(rbn) {
            Ok(buf) => {
                let record = Record::decode(&buf)?;
                if record.key.is_empty() {
                    Ok(SlotState::Empty)
                } else {
                    Ok(SlotState::Occupied(record))
                }
            }
            Err(ChainFileError::LocationNotFound(_)) => Ok(SlotState::Empty),
            Err(e) => Err(e),
        }
    }

    /// Read a record a chain pointer led to. Unlike a primary probe,
    /// the slot is expected to exist; a short read surfaces as
    /// `LocationNotFound` for the caller to interpret.
    fn read_chained(&mut self, rbn: Rbn) -> Result<Record> {
        let buf = self.blocks.read_record(rbn)?;
        Record::decode(&buf)
    }

    fn write_at(&mut self, rbn: Rbn, record: &Record) -> Result<()> {
        let buf = record.encode(self.blocks.record_size())?;
        self.blocks.write_record(rbn, &buf)
    }
}

/// Iterator over the stored records of an open hash file.
///
/// Holds the handle mutably for its lifetime (reads move the file
/// cursor) and yields `(rbn, record)` pairs.
pub struct Records<'a> {
    file: &'a mut HashFile,
    rbn: Rbn,
}

impl Iterator for Records<'_> {
    type Item = (Rbn, Record);

    fn next(&mut self) -> Option<Self::Item> {
        while self.rbn <= self.file.header.high_overflow_rbn() {
            let rbn = self.rbn;
            self.rbn += 1;
            if let Ok(SlotState::Occupied(record)) = self.file.read_slot(rbn) {
                return Some((rbn, record));
            }
        }
        None
    }
}
