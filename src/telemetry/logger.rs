//! JSONL actuation log with file rotation

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TelemetryConfig;
use crate::error::{RcLinkError, Result};
use crate::protocol::decoder::ActuationState;
use crate::protocol::packet::{ControlPacket, PACKET_LEN};

const FILE_PREFIX: &str = "actuation_";
const FILE_EXTENSION: &str = "jsonl";

/// Records buffered between flushes to disk
pub const FLUSH_INTERVAL_RECORDS: usize = 32;

/// One line of the actuation log
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
    /// Raw packet bytes as received
    pub packet: [u8; PACKET_LEN],
    /// Reconstructed throttle magnitude
    pub throttle: u32,
    #[serde(flatten)]
    pub state: ActuationState,
}

impl TelemetryRecord {
    pub fn new(packet: &ControlPacket, throttle: u32, state: &ActuationState) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            packet: *packet.as_bytes(),
            throttle,
            state: *state,
        }
    }
}

/// Writes [`TelemetryRecord`]s as JSON lines into rotating files
///
/// A new file is started after `max_records_per_file` records, and only the
/// newest `max_files_to_keep` files are left in the directory. Existing files
/// are never reopened, so a restarted receiver keeps the previous run's logs.
///
/// Lines are buffered and reach the disk every [`FLUSH_INTERVAL_RECORDS`]
/// records, on rotation, on [`TelemetryLogger::flush`] and on drop.
pub struct TelemetryLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    sequence: u32,
}

impl std::fmt::Debug for TelemetryLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryLogger")
            .field("dir", &self.dir)
            .field("records_in_file", &self.records_in_file)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl TelemetryLogger {
    /// Create a logger writing into `dir`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `RcLinkError::Telemetry` if a limit is zero and
    /// `RcLinkError::Io` if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(dir: P, max_records_per_file: usize, max_files_to_keep: usize) -> Result<Self> {
        if max_records_per_file == 0 || max_files_to_keep == 0 {
            return Err(RcLinkError::Telemetry(
                "max_records_per_file and max_files_to_keep must be greater than 0".to_string(),
            ));
        }

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!("Telemetry logging to {}", dir.display());

        Ok(Self {
            dir,
            max_records_per_file,
            max_files_to_keep,
            writer: None,
            records_in_file: 0,
            sequence: 0,
        })
    }

    /// Logger built from the `[telemetry]` config section, or `None` when disabled.
    pub fn from_config(config: &TelemetryConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(&config.log_dir, config.max_records_per_file, config.max_files_to_keep).map(Some)
    }

    /// Append one record, rotating first if the current file is full
    pub fn record(&mut self, record: &TelemetryRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = serde_json::to_string(record)
            .map_err(|e| RcLinkError::Telemetry(format!("Failed to serialize record: {}", e)))?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
        }
        self.records_in_file += 1;

        if self.records_in_file % FLUSH_INTERVAL_RECORDS == 0 {
            self.flush()?;
        }
        Ok(())
    }

    /// Push buffered records to disk
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Directory the log files are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let (path, file) = loop {
            let name = format!("{}{}_{:04}.{}", FILE_PREFIX, stamp, self.sequence, FILE_EXTENSION);
            self.sequence = self.sequence.wrapping_add(1);

            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                // Left by an earlier logger within the same second
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        };
        debug!("Opened telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.prune()
    }

    /// Remove the oldest log files beyond `max_files_to_keep`
    fn prune(&self) -> Result<()> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_log_file(path))
            .collect();

        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Names start with a UTC timestamp, so lexical order is age order
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove old telemetry file {}: {}", path.display(), e);
            } else {
                debug!("Removed old telemetry file {}", path.display());
            }
        }
        Ok(())
    }
}

fn is_log_file(path: &Path) -> bool {
    let name_ok = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(FILE_PREFIX));
    let ext_ok = path.extension().and_then(|ext| ext.to_str()) == Some(FILE_EXTENSION);
    name_ok && ext_ok
}
