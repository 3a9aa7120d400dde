//! File-level probing, unit listing and demux summaries used by the CLI.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use avs3probe_core::{
    classify, probe, Classification, FormatRegistry, ProbeData, RawDemuxer, StartCodes,
    StreamInfo, Unit,
};
use serde::Serialize;

use crate::config::Config;

/// Outcome of probing one file
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub file_path: PathBuf,
    pub file_size: u64,
    /// Bytes that were actually scored
    pub sample_size: usize,
    pub score: u32,
    pub classification: Classification,
}

/// Summary of a full demux pass
#[derive(Debug, Serialize)]
pub struct DemuxReport {
    pub file_path: PathBuf,
    pub stream: StreamInfo,
    pub packets: u64,
    pub bytes: u64,
}

/// Read at most `limit` bytes from the start of `path`.
pub fn read_sample(path: &Path, limit: usize) -> Result<(Vec<u8>, u64)> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let file_size = file
        .metadata()
        .with_context(|| format!("Failed to stat {:?}", path))?
        .len();

    let mut sample = Vec::with_capacity(limit.min(file_size as usize));
    file.take(limit as u64)
        .read_to_end(&mut sample)
        .with_context(|| format!("Failed to read {:?}", path))?;

    Ok((sample, file_size))
}

/// Score the leading `probe.sample_size` bytes of a file.
pub fn probe_path(path: &Path, config: &Config) -> Result<ProbeReport> {
    let (sample, file_size) = read_sample(path, config.probe.sample_size)?;
    let filename = path.to_string_lossy();

    let score = probe(&ProbeData::new(&filename, &sample));
    let classification = classify(&sample);

    tracing::debug!(
        file = %filename,
        score,
        sequence_headers = classification.sequence_headers,
        pictures = classification.pictures,
        "probed"
    );

    Ok(ProbeReport {
        file_path: path.to_path_buf(),
        file_size,
        sample_size: sample.len(),
        score,
        classification,
    })
}

/// Every start code in the file, up to `limit`.
pub fn list_units(path: &Path, limit: Option<usize>) -> Result<Vec<Unit>> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let units = StartCodes::new(&data);

    Ok(match limit {
        Some(n) => units.take(n).collect(),
        None => units.collect(),
    })
}

/// Open the file through the format registry and read every packet.
pub fn demux_path(path: &Path, config: &Config) -> Result<DemuxReport> {
    let options = config.demuxer_options()?;
    let registry = FormatRegistry::with_defaults();
    let filename = path.to_string_lossy();

    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut demuxer = RawDemuxer::open(BufReader::new(file), &filename, options, &registry)?;
    let stream = *demuxer.stream();

    let mut packets = 0u64;
    let mut bytes = 0u64;
    while let Some(packet) = demuxer.read_packet()? {
        packets += 1;
        bytes += packet.data.len() as u64;
    }

    tracing::info!(packets, bytes, "demuxed {:?}", path);

    Ok(DemuxReport {
        file_path: path.to_path_buf(),
        stream,
        packets,
        bytes,
    })
}
