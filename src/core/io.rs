use anyhow::{Context, Result, bail};
use flate2::read::MultiGzDecoder;
use memchr::memchr;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One raw symbol per byte, header and line framing already stripped.
/// Immutable once built; every worker borrows it read-only.
pub struct SequenceBlock {
    data: Vec<u8>,
}

impl SequenceBlock {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| "mmap failed")?;
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        if ext.eq_ignore_ascii_case("gz") {
            return Ok(InputKind::Gzip);
        }
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| "failed to read magic bytes")?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

/// Load the named sequence block from a FASTA stream: a plain file (mapped),
/// a gzip file, or stdin for `-`.
pub fn load_block(path: &Path, header: &str) -> Result<SequenceBlock> {
    if path.as_os_str() == "-" {
        let mut text = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut text)
            .with_context(|| "failed to read stdin")?;
        return extract_block(&text, header);
    }
    match detect_input_kind(path)? {
        InputKind::Plain => {
            let source = MmapSource::open(path)?;
            extract_block(source.bytes(), header)
        }
        InputKind::Gzip => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            let mut decoder = MultiGzDecoder::new(BufReader::new(file));
            let mut text = Vec::new();
            decoder
                .read_to_end(&mut text)
                .with_context(|| format!("failed to decompress {}", path.display()))?;
            extract_block(&text, header)
        }
    }
}

/// Scan line-oriented FASTA text for the block whose `>` header starts with
/// `header`, then collect its sequence lines with line terminators stripped,
/// stopping at the next header or end of input.
pub fn extract_block(text: &[u8], header: &str) -> Result<SequenceBlock> {
    let want = header.as_bytes();
    let mut pos = 0usize;
    let mut body = None;
    while pos < text.len() {
        let line_end = memchr(b'\n', &text[pos..]).map_or(text.len(), |i| pos + i);
        let line = trim_cr(&text[pos..line_end]);
        if line.first() == Some(&b'>') && line[1..].starts_with(want) {
            body = Some((line_end + 1).min(text.len()));
            break;
        }
        pos = line_end + 1;
    }
    let Some(mut pos) = body else {
        bail!("sequence block >{header} not found in input");
    };

    let mut data = Vec::with_capacity(text.len() - pos);
    while pos < text.len() {
        let line_end = memchr(b'\n', &text[pos..]).map_or(text.len(), |i| pos + i);
        let line = trim_cr(&text[pos..line_end]);
        if line.first() == Some(&b'>') {
            break;
        }
        data.extend_from_slice(line);
        pos = line_end + 1;
    }
    Ok(SequenceBlock { data })
}

#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    match line.split_last() {
        Some((&b'\r', rest)) => rest,
        _ => line,
    }
}
