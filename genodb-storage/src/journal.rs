// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Append-Only Index Journal
//!
//! Each checkpoint appends one self-checking record:
//!
//! ```text
//! ┌──────────────────┬───────────────┬─────────────────┐
//! │ checksum: u64 LE │ length: u32 LE│ payload: length │
//! └──────────────────┴───────────────┴─────────────────┘
//! ```
//!
//! The checksum is the CRC32 of the payload widened to 64 bits. Readers walk
//! records front to back and stop at the first torn or damaged one; everything
//! before it is still usable. Once the file grows past the compaction
//! threshold, the next append rewrites it to hold only the new record.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use genodb_core::{Encode, JournalConfig, MetricPoint};
use genodb_index::VpTree;

use crate::error::{JournalError, Result};

/// checksum (8) + length (4)
pub const RECORD_HEADER_SIZE: u64 = 12;

pub fn record_checksum(payload: &[u8]) -> u64 {
    crc32fast::hash(payload) as u64
}

/// Position and size of one intact record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    pub offset: u64,
    pub length: u32,
    pub checksum: u64,
}

/// Result of walking a journal file
#[derive(Debug, Default)]
pub struct JournalScan {
    pub records: Vec<RecordInfo>,
    /// Payload of the last intact record
    pub latest: Option<Vec<u8>>,
    /// Why the walk stopped before end of file, if it did
    pub stopped_at: Option<JournalError>,
    pub file_len: u64,
}

impl JournalScan {
    pub fn is_clean(&self) -> bool {
        self.stopped_at.is_none()
    }
}

/// Walk every record in `path`. A missing file scans as empty.
pub fn scan_file(path: &Path) -> Result<JournalScan> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(JournalScan::default()),
        Err(e) => return Err(e.into()),
    };
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut scan = JournalScan {
        file_len,
        ..JournalScan::default()
    };

    let mut offset = 0u64;
    while offset < file_len {
        match read_record(&mut reader, offset, file_len) {
            Ok((info, payload)) => {
                offset += RECORD_HEADER_SIZE + info.length as u64;
                scan.records.push(info);
                scan.latest = Some(payload);
            }
            Err(e) if e.is_corruption() => {
                scan.stopped_at = Some(e);
                break;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(scan)
}

fn read_record<R: Read>(reader: &mut R, offset: u64, file_len: u64) -> Result<(RecordInfo, Vec<u8>)> {
    if file_len - offset < RECORD_HEADER_SIZE {
        return Err(JournalError::Truncated { offset });
    }
    let expected = reader.read_u64::<LittleEndian>()?;
    let length = reader.read_u32::<LittleEndian>()?;
    if file_len - offset - RECORD_HEADER_SIZE < length as u64 {
        return Err(JournalError::Truncated { offset });
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload)?;
    let actual = record_checksum(&payload);
    if actual != expected {
        return Err(JournalError::ChecksumMismatch {
            offset,
            expected,
            actual,
        });
    }
    Ok((
        RecordInfo {
            offset,
            length,
            checksum: expected,
        },
        payload,
    ))
}

fn write_record<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let length = u32::try_from(payload.len())
        .map_err(|_| JournalError::Codec(format!("record of {} bytes is too large", payload.len())))?;
    writer.write_u64::<LittleEndian>(record_checksum(payload))?;
    writer.write_u32::<LittleEndian>(length)?;
    writer.write_all(payload)?;
    Ok(())
}

pub struct Journal {
    config: JournalConfig,
    writer: Option<BufWriter<File>>,
    len: u64,
}

impl Journal {
    /// Bind to a journal path without touching the file
    pub fn open(config: JournalConfig) -> Self {
        Self {
            config,
            writer: None,
            len: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn is_started(&self) -> bool {
        self.writer.is_some()
    }

    /// Bytes currently in the journal file (valid once started)
    pub fn len_bytes(&self) -> u64 {
        self.len
    }

    /// Open the file for appending, creating it and its directory if needed.
    ///
    /// A torn or damaged tail is cut off first, so new records follow the
    /// last intact one and stay reachable by later scans.
    pub fn start(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.discard_damaged_tail()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)?;
        self.len = file.metadata()?.len();
        self.writer = Some(BufWriter::new(file));
        info!(path = %self.config.path.display(), bytes = self.len, "journal started");
        Ok(())
    }

    /// Truncate the file to the end of its last intact record
    fn discard_damaged_tail(&self) -> Result<()> {
        let scan = self.scan()?;
        let Some(err) = &scan.stopped_at else {
            return Ok(());
        };
        let intact_len = scan
            .records
            .last()
            .map_or(0, |r| r.offset + RECORD_HEADER_SIZE + r.length as u64);
        warn!(
            path = %self.config.path.display(),
            intact_records = scan.records.len(),
            discarded_bytes = scan.file_len - intact_len,
            error = %err,
            "journal tail damaged; truncating to last intact record"
        );
        let file = OpenOptions::new().write(true).open(&self.config.path)?;
        file.set_len(intact_len)?;
        file.sync_all()?;
        Ok(())
    }

    /// Append one record and return its offset
    pub fn append(&mut self, payload: &[u8]) -> Result<u64> {
        if self.writer.is_none() {
            return Err(JournalError::NotStarted);
        }
        if self.len >= self.config.compact_threshold_bytes {
            return self.compact_with(payload);
        }

        let offset = self.len;
        let sync = self.config.sync_on_write;
        let writer = self.writer.as_mut().ok_or(JournalError::NotStarted)?;
        write_record(writer, payload)?;
        writer.flush()?;
        if sync {
            writer.get_ref().sync_data()?;
        }
        self.len += RECORD_HEADER_SIZE + payload.len() as u64;
        debug!(offset, length = payload.len(), "journal record appended");
        Ok(offset)
    }

    /// Serialize `tree` and append it as the newest record
    pub fn write_index<P: MetricPoint + Encode>(&mut self, tree: &VpTree<P>) -> Result<u64> {
        if self.writer.is_none() {
            return Err(JournalError::NotStarted);
        }
        let bytes = tree.to_bytes()?;
        self.append(&bytes)
    }

    /// Walk the file from the start
    pub fn scan(&self) -> Result<JournalScan> {
        scan_file(&self.config.path)
    }

    /// Payload of the newest intact record.
    ///
    /// A damaged or torn record ends the walk; it is logged and the record
    /// before it (if any) is returned.
    pub fn recover(&self) -> Result<Option<Vec<u8>>> {
        let scan = self.scan()?;
        if let Some(err) = &scan.stopped_at {
            warn!(
                path = %self.config.path.display(),
                intact_records = scan.records.len(),
                error = %err,
                "journal damaged; ignoring records from the damaged one onward"
            );
        }
        Ok(scan.latest)
    }

    /// Drop every record. The journal stays started if it was.
    pub fn erase(&mut self) -> Result<()> {
        let was_started = self.writer.take().is_some();
        match fs::remove_file(&self.config.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.len = 0;
        info!(path = %self.config.path.display(), "journal erased");
        if was_started {
            self.start()?;
        }
        Ok(())
    }

    /// Rewrite the journal so it holds only `payload`
    fn compact_with(&mut self, payload: &[u8]) -> Result<u64> {
        let tmp = tmp_path(&self.config.path);
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            write_record(&mut writer, payload)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        let previous = self.len;
        self.install_compacted(&tmp)?;

        info!(
            path = %self.config.path.display(),
            before = previous,
            after = self.len,
            "journal compacted"
        );
        Ok(0)
    }

    /// Replace the journal file with `tmp` and reopen it. If the rename
    /// fails the original file is reopened, so the journal stays started.
    fn install_compacted(&mut self, tmp: &Path) -> Result<()> {
        // Close the old handle before the rename replaces the file
        self.writer = None;
        if let Err(err) = fs::rename(tmp, &self.config.path) {
            warn!(path = %self.config.path.display(), error = %err, "journal compaction rename failed");
            if let Err(cleanup) = fs::remove_file(tmp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "compaction file not removed");
                }
            }
            self.start()?;
            return Err(err.into());
        }
        self.start()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "journal".into());
    name.push(".tmp");
    path.with_file_name(name)
}
