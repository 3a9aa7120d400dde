use avs3probe_core::{DemuxerOptions, Rational};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub demux: DemuxConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Bytes read from the start of a file before scoring it
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemuxConfig {
    /// Largest packet the demuxer emits
    #[serde(default = "default_packet_size")]
    pub packet_size: usize,

    /// Stream frame rate, "25" or "30000/1001"
    #[serde(default = "default_framerate")]
    pub framerate: String,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            packet_size: default_packet_size(),
            framerate: default_framerate(),
        }
    }
}

impl Config {
    /// Demuxer options from the `[probe]` and `[demux]` sections.
    pub fn demuxer_options(&self) -> avs3probe_core::Result<DemuxerOptions> {
        let framerate: Rational = self.demux.framerate.parse()?;
        let options = DemuxerOptions {
            packet_size: self.demux.packet_size,
            framerate,
            probe_size: self.probe.sample_size,
        };
        options.validate()?;
        Ok(options)
    }
}

fn default_sample_size() -> usize {
    2048
}

fn default_packet_size() -> usize {
    1024
}

fn default_framerate() -> String {
    "25".to_string()
}
