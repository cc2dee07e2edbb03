//! MDict `.mdx` dictionaries (engine versions 1.x and 2.x)
//!
//! Layout: UTF-16LE XML header, key section (block info + key blocks), record
//! section (block sizes + record blocks). Blocks are stored raw, LZO or zlib
//! compressed. Key-info encryption (`Encrypted` bit 2) is handled; record
//! header encryption needs a registration key and is rejected, as is the
//! version 3 container.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use encoding_rs::{Encoding, GB18030, UTF_8, UTF_16LE};
use flate2::read::ZlibDecoder;
use quick_xml::events::Event;
use ripemd128::{Digest, Ripemd128};
use tracing::{debug, info};

use crate::errors::ImportError;
use crate::importers::report::ParsedEntries;

const LINK_PREFIX: &str = "@@@LINK=";
const BLOCK_HEADER_LEN: usize = 8;

/// Upper bound of the decompressed/compressed size ratio (deflate tops out near 1032:1).
const MAX_EXPANSION: usize = 1032;

/// Parsed header attributes that drive decoding.
#[derive(Debug)]
struct MdxHeader {
  title: Option<String>,
  /// Engine 2.x: 64-bit numbers, 16-bit text lengths, terminated key-info texts
  v2: bool,
  key_info_encrypted: bool,
  encoding: &'static Encoding,
  utf16: bool,
}

impl MdxHeader {
  fn parse(xml: &str, path: &Path) -> Result<Self, ImportError> {
    let attrs = header_attributes(xml)
      .map_err(|reason| ImportError::invalid("mdx", path, format!("bad header: {reason}")))?;
    let attr = |name: &'static str| attrs.get(name).map_or("", |v| v.trim());

    let version_raw = match attr("GeneratedByEngineVersion") {
      "" => attr("RequiredEngineVersion"),
      v => v,
    };
    let version: f32 = version_raw.parse().map_err(|_| {
      ImportError::invalid("mdx", path, format!("bad engine version: {version_raw:?}"))
    })?;
    if version >= 3.0 {
      return Err(ImportError::Unsupported {
        format: "mdx",
        reason: format!("engine version {version_raw}"),
      });
    }

    let encrypted: u8 = match attr("Encrypted") {
      "" | "No" => 0,
      "Yes" => 1,
      n => n
        .parse()
        .map_err(|_| ImportError::invalid("mdx", path, format!("bad Encrypted value: {n}")))?,
    };
    if encrypted & 1 != 0 {
      return Err(ImportError::Unsupported {
        format: "mdx",
        reason: "record header encryption requires a registration key".to_string(),
      });
    }

    let label = attr("Encoding");
    let upper = label.to_ascii_uppercase();
    let utf16 = upper.starts_with("UTF-16");
    let encoding = match upper.as_str() {
      "" => UTF_8,
      "GBK" | "GB2312" => GB18030,
      _ if utf16 => UTF_16LE,
      _ => Encoding::for_label(label.as_bytes()).ok_or_else(|| ImportError::Unsupported {
        format: "mdx",
        reason: format!("text encoding {label}"),
      })?,
    };

    Ok(Self {
      title: attrs.get("Title").cloned().filter(|t| !t.is_empty()),
      v2: version >= 2.0,
      key_info_encrypted: encrypted & 2 != 0,
      encoding,
      utf16,
    })
  }

  fn unit(&self) -> usize {
    if self.utf16 { 2 } else { 1 }
  }
}

fn header_attributes(xml: &str) -> Result<HashMap<String, String>, String> {
  let mut reader = quick_xml::Reader::from_str(xml);
  let mut buf = Vec::new();
  loop {
    match reader.read_event_into(&mut buf).map_err(|e| e.to_string())? {
      Event::Start(e) | Event::Empty(e) => {
        let mut attrs = HashMap::new();
        for attr in e.attributes().flatten() {
          let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
          let value = String::from_utf8_lossy(attr.value.as_ref()).into_owned();
          attrs.insert(key, value);
        }
        return Ok(attrs);
      }
      Event::Eof => return Err("no root element".to_string()),
      _ => {}
    }
    buf.clear();
  }
}

fn ripemd128(data: &[u8]) -> Vec<u8> {
  let mut hasher = Ripemd128::new();
  hasher.input(data);
  hasher.result().to_vec()
}

/// Reverses the nibble-swap XOR cipher used for the key-block info.
fn simple_decrypt(data: &mut [u8], key: &[u8]) {
  let mut previous = 0x36u8;
  for (i, byte) in data.iter_mut().enumerate() {
    let b = *byte;
    *byte = b.rotate_left(4) ^ key[i % key.len()] ^ (i as u8) ^ previous;
    previous = b;
  }
}

/// Decrypts an encrypted key-info block in place (after its 8 byte header).
fn decrypt_key_info(block: &mut [u8]) {
  if block.len() <= BLOCK_HEADER_LEN {
    return;
  }
  let mut seed = [0u8; 8];
  seed[..4].copy_from_slice(&block[4..8]);
  seed[4..].copy_from_slice(&0x3695u32.to_le_bytes());
  let key = ripemd128(&seed);
  simple_decrypt(&mut block[BLOCK_HEADER_LEN..], &key);
}

/// Decodes a stored block: 4 byte type, 4 byte checksum, payload.
fn decode_block(block: &[u8], decompressed_len: usize) -> Result<Vec<u8>, String> {
  if block.len() < BLOCK_HEADER_LEN {
    return Err("block shorter than its header".to_string());
  }
  if block[0] >> 4 != 0 {
    return Err(format!("unsupported block encryption method {}", block[0] >> 4));
  }
  let data = &block[BLOCK_HEADER_LEN..];
  let compression = block[0] & 0x0f;
  if compression != 0 && decompressed_len > data.len().saturating_mul(MAX_EXPANSION) {
    return Err(format!(
      "declared size {decompressed_len} is implausible for {} compressed bytes",
      data.len()
    ));
  }
  match compression {
    0 => Ok(data.to_vec()),
    1 => {
      let mut out = vec![0u8; decompressed_len];
      let (result, error) = rust_lzo::LZOContext::decompress_to_slice(data, &mut out);
      if error != rust_lzo::LZOError::OK {
        return Err(format!("LZO decompression error {}", error as u32));
      }
      Ok(result.to_vec())
    }
    2 => {
      let limit = data.len().saturating_mul(MAX_EXPANSION);
      let mut out = Vec::with_capacity(decompressed_len.min(data.len().saturating_mul(4)));
      ZlibDecoder::new(data)
        .take(limit as u64)
        .read_to_end(&mut out)
        .map_err(|e| e.to_string())?;
      Ok(out)
    }
    other => Err(format!("unknown block compression {other}")),
  }
}

fn read_number<R: Read>(reader: &mut R, wide: bool) -> io::Result<u64> {
  if wide { reader.read_u64::<BigEndian>() } else { reader.read_u32::<BigEndian>().map(u64::from) }
}

fn to_len(n: u64) -> Result<usize, String> {
  usize::try_from(n).map_err(|_| format!("length {n} does not fit in memory"))
}

/// Position of the text terminator (`\0`, or an aligned `\0\0` for UTF-16).
fn terminator(data: &[u8], unit: usize) -> Option<usize> {
  if unit == 1 {
    data.iter().position(|&b| b == 0)
  } else {
    (0..data.len().saturating_sub(1)).step_by(2).find(|&i| data[i] == 0 && data[i + 1] == 0)
  }
}

/// Sequential reader over the whole file.
struct Sections<'a> {
  data: &'a [u8],
  pos: usize,
  path: &'a Path,
  wide: bool,
}

impl<'a> Sections<'a> {
  fn invalid(&self, reason: impl Into<String>) -> ImportError {
    ImportError::invalid("mdx", self.path, reason)
  }

  fn take(&mut self, len: usize) -> Result<&'a [u8], ImportError> {
    let end = self
      .pos
      .checked_add(len)
      .filter(|&end| end <= self.data.len())
      .ok_or_else(|| self.invalid("unexpected end of file"))?;
    let bytes = &self.data[self.pos..end];
    self.pos = end;
    Ok(bytes)
  }

  fn u32(&mut self) -> Result<u32, ImportError> {
    let mut bytes = self.take(4)?;
    bytes.read_u32::<BigEndian>().map_err(|e| self.invalid(e.to_string()))
  }

  fn remaining(&self) -> usize {
    self.data.len() - self.pos
  }

  fn number(&mut self) -> Result<usize, ImportError> {
    let mut bytes = self.take(if self.wide { 8 } else { 4 })?;
    let n = read_number(&mut bytes, self.wide).map_err(|e| self.invalid(e.to_string()))?;
    to_len(n).map_err(|reason| self.invalid(reason))
  }
}

/// `(compressed, decompressed)` size of each key block.
fn key_block_sizes(
  info: &[u8],
  header: &MdxHeader,
  blocks: usize,
) -> Result<Vec<(usize, usize)>, String> {
  let unit = header.unit();
  let terminator_units = usize::from(header.v2);
  let mut cursor = Cursor::new(info);
  let skip_text = |cursor: &mut Cursor<&[u8]>| -> Result<(), String> {
    let len = if header.v2 {
      usize::from(cursor.read_u16::<BigEndian>().map_err(|e| e.to_string())?)
    } else {
      usize::from(cursor.read_u8().map_err(|e| e.to_string())?)
    };
    let next = cursor.position() as usize + (len + terminator_units) * unit;
    if next > info.len() {
      return Err("key block info truncated".to_string());
    }
    cursor.set_position(next as u64);
    Ok(())
  };

  // every block needs at least two numbers and two length prefixes
  if blocks > info.len() / 4 {
    return Err(format!("{blocks} key blocks do not fit in {} bytes of block info", info.len()));
  }
  let mut sizes = Vec::with_capacity(blocks);
  for _ in 0..blocks {
    read_number(&mut cursor, header.v2).map_err(|e| e.to_string())?;
    skip_text(&mut cursor)?;
    skip_text(&mut cursor)?;
    let compressed = to_len(read_number(&mut cursor, header.v2).map_err(|e| e.to_string())?)?;
    let decompressed = to_len(read_number(&mut cursor, header.v2).map_err(|e| e.to_string())?)?;
    sizes.push((compressed, decompressed));
  }
  Ok(sizes)
}

/// `(record offset, raw key)` pairs of one decoded key block.
fn block_keys(block: &[u8], header: &MdxHeader) -> Result<Vec<(u64, Vec<u8>)>, String> {
  let unit = header.unit();
  let mut keys = Vec::new();
  let mut cursor = Cursor::new(block);
  while (cursor.position() as usize) < block.len() {
    let offset = read_number(&mut cursor, header.v2).map_err(|e| e.to_string())?;
    let start = cursor.position() as usize;
    let rest = &block[start..];
    let (text, consumed) = match terminator(rest, unit) {
      Some(end) => (&rest[..end], end + unit),
      None => (rest, rest.len()),
    };
    keys.push((offset, text.to_vec()));
    cursor.set_position((start + consumed) as u64);
  }
  Ok(keys)
}

/// Decodes text, `None` if the bytes are invalid in the dictionary encoding.
fn decode_text(bytes: &[u8], header: &MdxHeader) -> Option<String> {
  let (text, had_errors) = header.encoding.decode_without_bom_handling(bytes);
  if had_errors {
    return None;
  }
  Some(text.trim_end_matches('\0').trim().to_string())
}

/// Parses an MDict dictionary.
///
/// `@@@LINK=target` records are replaced by the article of `target` (one hop);
/// repeated headwords are joined with `<br>`.
pub fn parse_mdx(path: &Path) -> Result<ParsedEntries, ImportError> {
  let data = std::fs::read(path).map_err(|e| ImportError::io(path, e))?;
  let mut sections = Sections { data: &data, pos: 0, path, wide: false };

  let header_len = sections.u32()? as usize;
  let header_bytes = sections.take(header_len)?;
  sections.take(4)?; // header checksum
  let (xml, _) = UTF_16LE.decode_without_bom_handling(header_bytes);
  let header = MdxHeader::parse(xml.trim_end_matches(['\0', '\r', '\n']), path)?;
  sections.wide = header.v2;

  // key section
  let key_block_count = sections.number()?;
  let entry_count = sections.number()?;
  let info_decompressed = if header.v2 { sections.number()? } else { 0 };
  let info_len = sections.number()?;
  let key_blocks_len = sections.number()?;
  if header.v2 {
    sections.take(4)?; // checksum of the numbers above
  }

  let info_raw = sections.take(info_len)?;
  let info = if header.v2 {
    let mut block = info_raw.to_vec();
    if header.key_info_encrypted {
      decrypt_key_info(&mut block);
    }
    decode_block(&block, info_decompressed).map_err(|r| sections.invalid(r))?
  } else {
    info_raw.to_vec()
  };
  let sizes = key_block_sizes(&info, &header, key_block_count).map_err(|r| sections.invalid(r))?;

  let key_blocks_end = sections
    .pos
    .checked_add(key_blocks_len)
    .filter(|&end| end <= data.len())
    .ok_or_else(|| {
      sections.invalid(format!("key section of {key_blocks_len} bytes overruns the file"))
    })?;
  // each key takes at least one offset byte and one text byte
  let mut keys = Vec::with_capacity(entry_count.min(key_blocks_len / 2));
  for (compressed, decompressed) in sizes {
    let block = decode_block(sections.take(compressed)?, decompressed)
      .map_err(|r| sections.invalid(format!("key block: {r}")))?;
    keys.extend(block_keys(&block, &header).map_err(|r| sections.invalid(r))?);
  }
  if sections.pos != key_blocks_end {
    debug!(expected = key_blocks_end, actual = sections.pos, "mdx key section size mismatch");
    sections.pos = key_blocks_end;
  }
  if keys.len() != entry_count {
    debug!(expected = entry_count, actual = keys.len(), "mdx entry count mismatch");
  }

  // record section
  let record_block_count = sections.number()?;
  sections.number()?; // entries
  sections.number()?; // record block info size
  sections.number()?; // record blocks size
  let size_pair_len = if header.v2 { 16 } else { 8 };
  if record_block_count > sections.remaining() / size_pair_len {
    return Err(sections.invalid(format!("{record_block_count} record blocks overrun the file")));
  }
  let mut record_sizes = Vec::with_capacity(record_block_count);
  for _ in 0..record_block_count {
    record_sizes.push((sections.number()?, sections.number()?));
  }

  let mut articles: Vec<(Option<String>, Option<String>)> = Vec::with_capacity(keys.len());
  let mut record_sizes = record_sizes.into_iter();
  let mut block: Vec<u8> = Vec::new();
  let mut block_start = 0u64;
  for (i, (offset, raw_key)) in keys.iter().enumerate() {
    while *offset >= block_start + block.len() as u64 {
      let Some((compressed, decompressed)) = record_sizes.next() else {
        break;
      };
      block_start += block.len() as u64;
      block = decode_block(sections.take(compressed)?, decompressed)
        .map_err(|r| sections.invalid(format!("record block: {r}")))?;
    }

    let block_end = block_start + block.len() as u64;
    let end = keys
      .get(i + 1)
      .map(|(next, _)| *next)
      .filter(|next| next > offset)
      .map_or(block_end, |next| next.min(block_end));
    let record = if (block_start..block_end).contains(offset) {
      block.get((offset - block_start) as usize..(end - block_start) as usize)
    } else {
      None
    };

    articles.push((decode_text(raw_key, &header), record.and_then(|r| decode_text(r, &header))));
  }

  let mut parsed = ParsedEntries::default();
  let targets: HashMap<&str, &str> = articles
    .iter()
    .rev()
    .filter_map(|(key, article)| Some((key.as_deref()?, article.as_deref()?)))
    .filter(|(_, article)| !article.starts_with(LINK_PREFIX))
    .collect();

  for (key, article) in &articles {
    let (Some(key), Some(article)) = (key.as_deref(), article.as_deref()) else {
      parsed.record_malformed();
      continue;
    };
    let article = match article.strip_prefix(LINK_PREFIX) {
      Some(target) => targets.get(target.trim()).copied(),
      None => Some(article),
    };
    match article {
      Some(article) if !key.is_empty() && !article.is_empty() => {
        parsed.record_or_append(key, article, "<br>");
      }
      _ => parsed.record_malformed(),
    }
  }

  info!(
    title = header.title.as_deref().unwrap_or("?"),
    entries = parsed.entries.len(),
    malformed = parsed.skipped_malformed,
    "parsed mdx dictionary"
  );
  Ok(parsed)
}
