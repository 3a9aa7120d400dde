//! Raw video demuxer
//!
//! A raw elementary stream has no container: once a format probe accepts
//! the input, the demuxer hands the bytes on in fixed-size packets and
//! leaves framing to a downstream parser.

use std::fmt;
use std::io::{ErrorKind, Read};
use std::str::FromStr;

use bytes::{Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::format::{CodecId, FormatRegistry};
use crate::probe::ProbeData;

/// Time base of raw video streams, in seconds per tick.
pub const RAW_TIME_BASE: Rational = Rational::new(1, 1_200_000);

/// A positive fraction such as a frame rate or time base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Rational {
    type Err = Error;

    /// Parse `"25"` or `"30000/1001"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidOption(format!("invalid rational: {s:?}"));

        let (num, den) = match s.trim().split_once('/') {
            Some((num, den)) => (num.trim(), den.trim()),
            None => (s.trim(), "1"),
        };
        let num: u32 = num.parse().map_err(|_| invalid())?;
        let den: u32 = den.parse().map_err(|_| invalid())?;
        if num == 0 || den == 0 {
            return Err(invalid());
        }

        Ok(Self { num, den })
    }
}

/// Demuxer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemuxerOptions {
    /// Largest packet handed out by [`RawDemuxer::read_packet`]
    pub packet_size: usize,
    /// Frame rate reported for the stream
    pub framerate: Rational,
    /// Bytes read up front for format detection
    pub probe_size: usize,
}

impl Default for DemuxerOptions {
    fn default() -> Self {
        Self {
            packet_size: 1024,
            framerate: Rational::new(25, 1),
            probe_size: 2048,
        }
    }
}

impl DemuxerOptions {
    pub fn validate(&self) -> Result<()> {
        if self.packet_size == 0 {
            return Err(Error::InvalidOption("packet_size must be positive".into()));
        }
        if self.probe_size == 0 {
            return Err(Error::InvalidOption("probe_size must be positive".into()));
        }
        if self.framerate.num == 0 || self.framerate.den == 0 {
            return Err(Error::InvalidOption(format!(
                "framerate must be positive, got {}",
                self.framerate
            )));
        }
        Ok(())
    }
}

/// The single video stream of a raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct StreamInfo {
    pub codec: CodecId,
    pub framerate: Rational,
    pub time_base: Rational,
}

/// A chunk of the elementary stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub data: Bytes,
    /// Byte offset of the chunk in the input
    pub pos: u64,
}

/// Fixed-size packet reader over a raw video stream.
pub struct RawDemuxer<R> {
    reader: R,
    /// Probe sample not yet handed out
    pending: Bytes,
    stream: StreamInfo,
    packet_size: usize,
    pos: u64,
}

impl<R: Read> RawDemuxer<R> {
    /// Demux `reader` as `codec` without probing.
    pub fn new(reader: R, codec: CodecId, options: DemuxerOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::with_sample(reader, Bytes::new(), codec, &options))
    }

    /// Read a probe sample from `reader`, pick a format from `registry`
    /// and demux the stream with it.
    ///
    /// The sample is not lost: it is handed out by the first packets.
    pub fn open(
        mut reader: R,
        filename: &str,
        options: DemuxerOptions,
        registry: &FormatRegistry,
    ) -> Result<Self> {
        options.validate()?;

        let sample = read_sample(&mut reader, options.probe_size)?;
        let codec = match registry.detect(&ProbeData::new(filename, &sample)) {
            Some((format, score)) => {
                tracing::info!(
                    format = format.name(),
                    score,
                    filename,
                    "opened {}",
                    format.long_name()
                );
                format.codec()
            }
            None => {
                return Err(Error::NotRecognized {
                    filename: filename.to_string(),
                })
            }
        };

        Ok(Self::with_sample(reader, sample.freeze(), codec, &options))
    }

    fn with_sample(reader: R, pending: Bytes, codec: CodecId, options: &DemuxerOptions) -> Self {
        Self {
            reader,
            pending,
            stream: StreamInfo {
                codec,
                framerate: options.framerate,
                time_base: RAW_TIME_BASE,
            },
            packet_size: options.packet_size,
            pos: 0,
        }
    }

    pub fn stream(&self) -> &StreamInfo {
        &self.stream
    }

    /// Next chunk of at most `packet_size` bytes, `None` at end of input.
    ///
    /// Short reads are returned as they come, without waiting to fill the
    /// packet.
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        let data = if !self.pending.is_empty() {
            let n = self.packet_size.min(self.pending.len());
            self.pending.split_to(n)
        } else {
            let mut buf = BytesMut::zeroed(self.packet_size);
            let n = loop {
                match self.reader.read(&mut buf) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            };
            if n == 0 {
                return Ok(None);
            }
            buf.truncate(n);
            buf.freeze()
        };

        let packet = Packet {
            pos: self.pos,
            data,
        };
        self.pos += packet.data.len() as u64;
        Ok(Some(packet))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for RawDemuxer<R> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_packet().transpose()
    }
}

/// Read until `limit` bytes or end of input.
fn read_sample<R: Read>(reader: &mut R, limit: usize) -> Result<BytesMut> {
    let mut sample = BytesMut::zeroed(limit);
    let mut filled = 0;

    while filled < limit {
        match reader.read(&mut sample[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    sample.truncate(filled);
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Hands out at most `step` bytes per read, failing the first with
    /// `Interrupted`.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        interrupted: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "gone"))
        }
    }

    fn avs3_stream(len: usize) -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x01, 0xB0, 0x20, 0x11];
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3, 0x22]);
        while data.len() < len {
            data.push(0x5A);
        }
        data
    }

    #[test]
    fn test_rational_from_str() {
        assert_eq!("25".parse::<Rational>().unwrap(), Rational::new(25, 1));
        assert_eq!(
            " 30000 / 1001 ".parse::<Rational>().unwrap(),
            Rational::new(30000, 1001)
        );
        assert!("0".parse::<Rational>().is_err());
        assert!("25/0".parse::<Rational>().is_err());
        assert!("fast".parse::<Rational>().is_err());
        assert_eq!(Rational::new(24000, 1001).to_string(), "24000/1001");
    }

    #[test]
    fn test_options_validate() {
        assert!(DemuxerOptions::default().validate().is_ok());

        let options = DemuxerOptions {
            packet_size: 0,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidOption(_))));

        let options = DemuxerOptions {
            framerate: Rational::new(0, 1),
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidOption(_))));
    }

    #[test]
    fn test_fixed_size_packets() {
        let data = avs3_stream(2500);
        let demuxer =
            RawDemuxer::new(Cursor::new(data.clone()), CodecId::Avs3, DemuxerOptions::default())
                .unwrap();

        let packets: Vec<Packet> = demuxer.map(|p| p.unwrap()).collect();
        let sizes: Vec<usize> = packets.iter().map(|p| p.data.len()).collect();
        assert_eq!(sizes, vec![1024, 1024, 452]);
        assert_eq!(packets[1].pos, 1024);
        assert_eq!(packets[2].pos, 2048);

        let joined: Vec<u8> = packets.iter().flat_map(|p| p.data.to_vec()).collect();
        assert_eq!(joined, data);
    }

    #[test]
    fn test_open_detects_and_keeps_sample() {
        let data = avs3_stream(5000);
        let registry = FormatRegistry::with_defaults();
        let mut demuxer = RawDemuxer::open(
            Cursor::new(data.clone()),
            "clip.avs3",
            DemuxerOptions::default(),
            &registry,
        )
        .unwrap();

        assert_eq!(demuxer.stream().codec, CodecId::Avs3);
        assert_eq!(demuxer.stream().framerate, Rational::new(25, 1));
        assert_eq!(demuxer.stream().time_base, RAW_TIME_BASE);

        let first = demuxer.read_packet().unwrap().unwrap();
        assert_eq!(first.pos, 0);
        assert_eq!(&first.data[..], &data[..1024]);

        let rest: Vec<Packet> = demuxer.map(|p| p.unwrap()).collect();
        let total: usize = first.data.len() + rest.iter().map(|p| p.data.len()).sum::<usize>();
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_open_rejects_unknown_input() {
        let registry = FormatRegistry::with_defaults();
        let result = RawDemuxer::open(
            Cursor::new(avs3_stream(64)),
            "clip.mkv",
            DemuxerOptions::default(),
            &registry,
        );
        assert!(matches!(
            result,
            Err(Error::NotRecognized { ref filename }) if filename == "clip.mkv"
        ));
    }

    #[test]
    fn test_short_reads_not_refilled() {
        let reader = Trickle {
            data: vec![0x42; 10],
            pos: 0,
            step: 4,
            interrupted: false,
        };
        let options = DemuxerOptions {
            packet_size: 8,
            ..Default::default()
        };
        let demuxer = RawDemuxer::new(reader, CodecId::Avs3, options).unwrap();
        let sizes: Vec<usize> = demuxer.map(|p| p.unwrap().data.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_sample_fills_across_short_reads() {
        let data = avs3_stream(40);
        let reader = Trickle {
            data: data.clone(),
            pos: 0,
            step: 3,
            interrupted: false,
        };
        let options = DemuxerOptions {
            probe_size: 32,
            packet_size: 16,
            ..Default::default()
        };
        let registry = FormatRegistry::with_defaults();
        let mut demuxer = RawDemuxer::open(reader, "x.avs3", options, &registry).unwrap();

        let sizes: Vec<usize> = demuxer
            .by_ref()
            .map(|p| p.unwrap().data.len())
            .collect();
        assert_eq!(sizes[..2], [16, 16]);
        assert_eq!(sizes.iter().sum::<usize>(), 40);
        assert_eq!(demuxer.into_inner().pos, 40);
    }

    #[test]
    fn test_io_error_propagates() {
        let mut demuxer = RawDemuxer::new(Broken, CodecId::Avs3, DemuxerOptions::default()).unwrap();
        assert!(matches!(demuxer.read_packet(), Err(Error::Io(_))));

        let registry = FormatRegistry::with_defaults();
        let result = RawDemuxer::open(Broken, "x.avs3", DemuxerOptions::default(), &registry);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
