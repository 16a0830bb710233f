//! File-backed key-value store with checksummed save files.
//!
//! One file per key, `<dir>/<key>.sav`:
//! - Header (32 bytes):
//!   - Magic: "TGS1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Payload length: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of payload (8 bytes)
//!   - Reserved: 8 bytes (zeros)
//! - Payload: the stored value as UTF-8
//!
//! Writes go to a temporary file that is renamed into place.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tilegame_core::{KeyValueStore, StoreError};
use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"TGS1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;

/// Directory of save files, one per key.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::new(format!("invalid save key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.sav")))
    }

    /// Write a payload with header and checksum.
    pub fn write_record(path: &Path, payload: &[u8]) -> io::Result<()> {
        let checksum = xxh64(payload, 0);
        let tmp = path.with_extension("sav.tmp");

        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);

            // Header
            writer.write_all(MAGIC)?;
            writer.write_all(&VERSION.to_le_bytes())?;
            writer.write_all(&(payload.len() as u64).to_le_bytes())?;
            writer.write_all(&checksum.to_le_bytes())?;
            writer.write_all(&[0u8; 8])?; // Reserved

            // Payload
            writer.write_all(payload)?;
            writer.flush()?;
        }

        fs::rename(&tmp, path)
    }

    /// Read and verify a payload.
    pub fn read_record(path: &Path) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Invalid save file magic",
            ));
        }

        let version = u32::from_le_bytes(le_bytes(&header[4..8]));
        if version != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unsupported save file version: {}", version),
            ));
        }

        let len = u64::from_le_bytes(le_bytes(&header[8..16]));
        let stored_checksum = u64::from_le_bytes(le_bytes(&header[16..24]));

        // The header length must account for exactly the rest of the file
        if file_len.checked_sub(HEADER_SIZE as u64) != Some(len) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Save file length mismatch: header says {} bytes", len),
            ));
        }

        let mut payload = Vec::new();
        reader.take(len).read_to_end(&mut payload)?;

        if xxh64(&payload, 0) != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Save file checksum mismatch",
            ));
        }

        Ok(payload)
    }
}

fn le_bytes<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key)?;
        let payload = match Self::read_record(&path) {
            Ok(payload) => payload,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::new(e)),
        };
        String::from_utf8(payload).map(Some).map_err(StoreError::new)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.dir).map_err(StoreError::new)?;
        Self::write_record(&path, value.as_bytes()).map_err(StoreError::new)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::new(e)),
        }
    }
}
