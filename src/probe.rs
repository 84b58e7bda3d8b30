//! Image dimension probing from raw file headers.
//!
//! Reads only the signature and header bytes of PNG, GIF and JPEG files to
//! recover pixel dimensions without decoding the image. Each format is a
//! [`HeaderProbe`]; [`probe_reader`] sniffs the signature and dispatches.
//!
//! An unrecognised signature or a header cut short by end-of-file yields
//! [`ImageFormat::Unknown`]. Only genuine I/O failures are returned as errors.
//!
//! # Examples
//!
//! ```
//! use mediasort::probe::{probe_bytes, ImageFormat};
//!
//! let gif = b"GIF89a\x30\x00\x20\x00\x00\x00\x00";
//! let info = probe_bytes(gif);
//! assert_eq!(info.format, ImageFormat::Gif);
//! assert_eq!((info.width, info.height), (48, 32));
//! ```

use serde::Serialize;
use std::io::{self, Read};

/// Longest signature any probe needs to see.
pub const SIGNATURE_LEN: usize = 8;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Image container recognised by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Unknown,
}

/// Dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageHeaderInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageHeaderInfo {
    /// Header info for anything that could not be parsed.
    pub const UNKNOWN: ImageHeaderInfo = ImageHeaderInfo {
        width: 0,
        height: 0,
        format: ImageFormat::Unknown,
    };

    /// Returns true if dimensions were recovered.
    pub fn is_known(&self) -> bool {
        self.format != ImageFormat::Unknown
    }

    /// The longer of the two axes.
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }

    /// The shorter of the two axes.
    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }
}

/// A format-specific header parser.
pub trait HeaderProbe {
    /// The format this probe parses.
    fn format(&self) -> ImageFormat;

    /// Returns true if `signature` starts this probe's format. The slice holds
    /// up to [`SIGNATURE_LEN`] bytes.
    fn matches(&self, signature: &[u8]) -> bool;

    /// Parses dimensions from `reader`, positioned just after the signature
    /// bytes that were handed to [`HeaderProbe::matches`].
    ///
    /// Returns `Ok(None)` if the header is malformed.
    fn dimensions(&self, signature: &[u8], reader: &mut dyn Read) -> io::Result<Option<(u32, u32)>>;
}

/// PNG: IHDR is always the first chunk, so dimensions sit at a fixed offset.
pub struct PngProbe;

impl HeaderProbe for PngProbe {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn matches(&self, signature: &[u8]) -> bool {
        signature.starts_with(&PNG_SIGNATURE)
    }

    fn dimensions(&self, _signature: &[u8], reader: &mut dyn Read) -> io::Result<Option<(u32, u32)>> {
        // length(4) type(4) width(4) height(4)
        let mut ihdr = [0u8; 16];
        reader.read_exact(&mut ihdr)?;
        if &ihdr[4..8] != b"IHDR" {
            return Ok(None);
        }
        let width = u32::from_be_bytes([ihdr[8], ihdr[9], ihdr[10], ihdr[11]]);
        let height = u32::from_be_bytes([ihdr[12], ihdr[13], ihdr[14], ihdr[15]]);
        Ok(Some((width, height)))
    }
}

/// GIF: logical screen descriptor follows the six-byte signature, little-endian.
pub struct GifProbe;

impl HeaderProbe for GifProbe {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn matches(&self, signature: &[u8]) -> bool {
        signature.starts_with(b"GIF87a") || signature.starts_with(b"GIF89a")
    }

    fn dimensions(&self, signature: &[u8], reader: &mut dyn Read) -> io::Result<Option<(u32, u32)>> {
        // Bytes 6..10 of the file; part of them may already be in the signature.
        let mut screen = [0u8; 4];
        let carried = signature.len().saturating_sub(6).min(4);
        screen[..carried].copy_from_slice(&signature[6..6 + carried]);
        reader.read_exact(&mut screen[carried..])?;
        let width = u16::from_le_bytes([screen[0], screen[1]]);
        let height = u16::from_le_bytes([screen[2], screen[3]]);
        Ok(Some((u32::from(width), u32::from(height))))
    }
}

/// JPEG: dimensions live in the first SOF segment, found by walking the
/// variable-length marker segments that precede it.
pub struct JpegProbe;

impl JpegProbe {
    fn is_sof(marker: u8) -> bool {
        // C4 (DHT), C8 (JPG) and CC (DAC) share the range but are not frames.
        matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
    }

    fn is_standalone(marker: u8) -> bool {
        matches!(marker, 0x01 | 0xD0..=0xD7)
    }
}

impl HeaderProbe for JpegProbe {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn matches(&self, signature: &[u8]) -> bool {
        signature.starts_with(&[0xFF, 0xD8])
    }

    fn dimensions(&self, signature: &[u8], reader: &mut dyn Read) -> io::Result<Option<(u32, u32)>> {
        let mut stream = io::Cursor::new(&signature[2..]).chain(reader);

        loop {
            if read_u8(&mut stream)? != 0xFF {
                return Ok(None);
            }
            let mut marker = read_u8(&mut stream)?;
            while marker == 0xFF {
                marker = read_u8(&mut stream)?;
            }

            if Self::is_standalone(marker) {
                continue;
            }
            // Start of scan or end of image without a frame header.
            if marker == 0xDA || marker == 0xD9 {
                return Ok(None);
            }

            let length = read_u16_be(&mut stream)?;
            if length < 2 {
                return Ok(None);
            }

            if Self::is_sof(marker) {
                let _precision = read_u8(&mut stream)?;
                let height = read_u16_be(&mut stream)?;
                let width = read_u16_be(&mut stream)?;
                return Ok(Some((u32::from(width), u32::from(height))));
            }

            io::copy(&mut (&mut stream).take(u64::from(length - 2)), &mut io::sink())
                .and_then(|skipped| {
                    if skipped == u64::from(length - 2) {
                        Ok(())
                    } else {
                        Err(io::ErrorKind::UnexpectedEof.into())
                    }
                })?;
        }
    }
}

fn read_u8<R: Read>(reader: &mut R) -> io::Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}

fn read_u16_be<R: Read>(reader: &mut R) -> io::Result<u16> {
    let mut bytes = [0u8; 2];
    reader.read_exact(&mut bytes)?;
    Ok(u16::from_be_bytes(bytes))
}

/// Built-in probes, in dispatch order.
pub fn default_probes() -> Vec<Box<dyn HeaderProbe>> {
    vec![Box::new(PngProbe), Box::new(JpegProbe), Box::new(GifProbe)]
}

/// Probes `reader` with the built-in probes.
///
/// The reader should be buffered; the JPEG walk reads one byte at a time.
pub fn probe_reader<R: Read>(reader: R) -> io::Result<ImageHeaderInfo> {
    probe_with(&default_probes(), reader)
}

/// Probes an in-memory buffer. Never fails.
pub fn probe_bytes(bytes: &[u8]) -> ImageHeaderInfo {
    probe_reader(bytes).unwrap_or(ImageHeaderInfo::UNKNOWN)
}

/// Probes `reader` with an explicit probe list.
pub fn probe_with<R: Read>(probes: &[Box<dyn HeaderProbe>], mut reader: R) -> io::Result<ImageHeaderInfo> {
    let signature = match read_signature(&mut reader)? {
        Some(signature) => signature,
        None => return Ok(ImageHeaderInfo::UNKNOWN),
    };

    let Some(probe) = probes.iter().find(|p| p.matches(&signature)) else {
        return Ok(ImageHeaderInfo::UNKNOWN);
    };

    match probe.dimensions(&signature, &mut reader) {
        Ok(Some((width, height))) => Ok(ImageHeaderInfo {
            width,
            height,
            format: probe.format(),
        }),
        Ok(None) => Ok(ImageHeaderInfo::UNKNOWN),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(ImageHeaderInfo::UNKNOWN),
        Err(e) => Err(e),
    }
}

/// Reads up to [`SIGNATURE_LEN`] bytes. `None` for an empty source.
fn read_signature<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut signature = Vec::with_capacity(SIGNATURE_LEN);
    reader
        .by_ref()
        .take(SIGNATURE_LEN as u64)
        .read_to_end(&mut signature)?;
    if signature.is_empty() {
        Ok(None)
    } else {
        Ok(Some(signature))
    }
}
