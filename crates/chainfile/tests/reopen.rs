//! Lifecycle behavior across close/reopen and against damaged files

use chainfile::{ChainFileError, HashFile, Rbn, Record, RecordKey, MIN_RECORD_SIZE};
use std::io::{Seek, SeekFrom, Write};
use tempfile::TempDir;

const RECORD_SIZE: u32 = 48;

fn slot_three(_key: &RecordKey, _num_primary: u64) -> Rbn {
    3
}

fn numeric_mod(key: &RecordKey, num_primary: u64) -> Rbn {
    let digits: u64 = key.as_str().parse().unwrap_or(0);
    digits % num_primary + 1
}

fn record(key: &str, payload: &str) -> Record {
    Record::new(RecordKey::new(key).unwrap(), payload.as_bytes().to_vec())
}

#[test]
fn overflow_growth_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.dat");
    let num_primary = 5;
    HashFile::create(&path, num_primary, RECORD_SIZE).unwrap();

    // One primary insert plus three overflow-causing synonyms.
    let overflow_inserts = 3;
    {
        let mut file = HashFile::open(&path, slot_three).unwrap();
        for i in 0..=overflow_inserts {
            file.insert(record(&format!("k{i}"), &format!("p{i}"))).unwrap();
        }
        assert_eq!(
            file.header().high_overflow_rbn(),
            num_primary + overflow_inserts
        );
    }

    let mut reopened = HashFile::open(&path, slot_three).unwrap();
    assert_eq!(reopened.header().num_primary(), num_primary);
    assert_eq!(reopened.header().record_size(), RECORD_SIZE);
    assert_eq!(
        reopened.header().high_overflow_rbn(),
        num_primary + overflow_inserts
    );

    // The whole chain is still reachable through the reopened handle.
    for i in 0..=overflow_inserts {
        let key = RecordKey::new(&format!("k{i}")).unwrap();
        let (found, _) = reopened.lookup(&key).unwrap();
        assert_eq!(found.key, key);
    }
}

#[test]
fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.dat");
    HashFile::create(&path, 10, RECORD_SIZE).unwrap();

    {
        let mut file = HashFile::open(&path, numeric_mod).unwrap();
        for key in ["1", "2", "11", "21"] {
            file.insert(record(key, &format!("payload-{key}"))).unwrap();
        }
    }

    let mut reopened = HashFile::open(&path, numeric_mod).unwrap();
    let keys: Vec<String> = reopened
        .records()
        .map(|(_, rec)| rec.key.to_string())
        .collect();
    assert_eq!(keys.len(), 4);
    for key in ["1", "2", "11", "21"] {
        assert!(keys.contains(&key.to_string()));
        assert!(reopened.lookup(&RecordKey::new(key).unwrap()).is_ok());
    }
}

#[test]
fn create_rejects_undersized_record_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.dat");

    let err = HashFile::create(&path, 10, MIN_RECORD_SIZE - 1).unwrap_err();
    assert!(matches!(err, ChainFileError::BadRecordSize(_)));
    // Nothing was created.
    assert!(!path.exists());
}

#[test]
fn open_rejects_doctored_record_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.dat");
    HashFile::create(&path, 10, RECORD_SIZE).unwrap();

    // Stamp an impossible record size over the header field.
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap();
    file.seek(SeekFrom::Start(8)).unwrap();
    file.write_all(&4u32.to_le_bytes()).unwrap();
    drop(file);

    let err = HashFile::open(&path, numeric_mod).unwrap_err();
    assert!(matches!(err, ChainFileError::BadRecordSize(4)));
}

#[test]
fn open_of_empty_file_is_header_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.dat");
    std::fs::File::create(&path).unwrap();

    let err = HashFile::open(&path, numeric_mod).unwrap_err();
    assert!(matches!(err, ChainFileError::HeaderNotFound));
}

#[test]
fn open_of_truncated_header_is_header_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stub.dat");
    std::fs::write(&path, [0u8; 10]).unwrap();

    let err = HashFile::open(&path, numeric_mod).unwrap_err();
    assert!(matches!(err, ChainFileError::HeaderNotFound));
}
