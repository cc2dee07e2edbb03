//! StarDict dictionaries: `.ifo` + `.idx`/`.idx.gz` + `.dict`/`.dict.dz`, optional `.syn`
//!
//! The importer accepts any of the member files, the base path without
//! extension, or a directory holding a single dictionary.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::errors::ImportError;
use crate::importers::markup::xdxf_to_html;
use crate::importers::report::ParsedEntries;

const IFO_MAGIC: &str = "StarDict's dict ifo file";
const MEMBER_SUFFIXES: [&str; 6] = [".ifo", ".idx.gz", ".idx", ".dict.dz", ".dict", ".syn"];

/// Textual entry types; everything else is binary and skipped.
const TEXT_TYPES: &str = "mlgtxykwhr";

#[derive(Debug, Default)]
struct IfoInfo {
  book_name: Option<String>,
  word_count: usize,
  same_type_sequence: Option<String>,
  offset_bits_64: bool,
}

/// One `.idx` record: headword and location of its article in `.dict`.
#[derive(Debug)]
struct IdxRecord {
  word: Vec<u8>,
  offset: u64,
  size: u32,
}

/// Resolves the common path prefix of the dictionary files.
fn base_path(path: &Path) -> Result<PathBuf, ImportError> {
  if path.is_dir() {
    let mut ifos = Vec::new();
    let entries = std::fs::read_dir(path).map_err(|e| ImportError::io(path, e))?;
    for entry in entries {
      let entry = entry.map_err(|e| ImportError::io(path, e))?;
      if entry.path().extension().is_some_and(|ext| ext == "ifo") {
        ifos.push(entry.path());
      }
    }
    return match ifos.as_slice() {
      [ifo] => base_path(ifo),
      [] => Err(ImportError::invalid("stardict", path, "no .ifo file in directory")),
      _ => Err(ImportError::invalid("stardict", path, "more than one .ifo file in directory")),
    };
  }

  let raw = path.to_string_lossy();
  for suffix in MEMBER_SUFFIXES {
    if let Some(stem) = raw.strip_suffix(suffix) {
      return Ok(PathBuf::from(stem));
    }
  }
  Ok(path.to_path_buf())
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
  let mut raw = base.as_os_str().to_owned();
  raw.push(suffix);
  PathBuf::from(raw)
}

/// Reads `base + plain`, falling back to the gzip/dictzip variant `base + gz`.
fn read_member(base: &Path, plain: &str, gz: &str) -> Result<Option<Vec<u8>>, ImportError> {
  let plain_path = with_suffix(base, plain);
  if plain_path.is_file() {
    return std::fs::read(&plain_path).map(Some).map_err(|e| ImportError::io(plain_path, e));
  }
  let gz_path = with_suffix(base, gz);
  if gz_path.is_file() {
    let file = std::fs::File::open(&gz_path).map_err(|e| ImportError::io(&gz_path, e))?;
    let mut data = Vec::new();
    GzDecoder::new(file).read_to_end(&mut data).map_err(|e| ImportError::io(&gz_path, e))?;
    return Ok(Some(data));
  }
  Ok(None)
}

fn parse_ifo(path: &Path) -> Result<IfoInfo, ImportError> {
  let text = std::fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
  let mut lines = text.lines();
  if lines.next().map(|l| l.trim_start_matches('\u{feff}').trim()) != Some(IFO_MAGIC) {
    return Err(ImportError::invalid("stardict", path, "missing .ifo magic line"));
  }

  let mut info = IfoInfo::default();
  for line in lines {
    let Some((key, value)) = line.split_once('=') else {
      continue;
    };
    let value = value.trim();
    match key.trim() {
      "bookname" => info.book_name = Some(value.to_string()),
      "wordcount" => {
        info.word_count = value
          .parse()
          .map_err(|_| ImportError::invalid("stardict", path, format!("bad wordcount: {value}")))?;
      }
      "sametypesequence" if !value.is_empty() => {
        info.same_type_sequence = Some(value.to_string())
      }
      "idxoffsetbits" => info.offset_bits_64 = value == "64",
      _ => {}
    }
  }
  Ok(info)
}

/// Parses `.idx`. A truncated trailing record is reported separately.
fn parse_idx(data: &[u8], offset_bits_64: bool) -> (Vec<IdxRecord>, bool) {
  let mut records = Vec::new();
  let mut cursor = Cursor::new(data);
  loop {
    let start = cursor.position() as usize;
    if start >= data.len() {
      return (records, false);
    }
    let Some(nul) = data[start..].iter().position(|&b| b == 0) else {
      return (records, true);
    };
    cursor.set_position((start + nul + 1) as u64);

    let offset = if offset_bits_64 {
      cursor.read_u64::<BigEndian>()
    } else {
      cursor.read_u32::<BigEndian>().map(u64::from)
    };
    let (Ok(offset), Ok(size)) = (offset, cursor.read_u32::<BigEndian>()) else {
      return (records, true);
    };
    records.push(IdxRecord { word: data[start..start + nul].to_vec(), offset, size });
  }
}

/// Parses `.syn`: synonym word followed by a u32 index into `.idx`.
fn parse_syn(data: &[u8]) -> Vec<(Vec<u8>, usize)> {
  let mut synonyms = Vec::new();
  let mut cursor = Cursor::new(data);
  loop {
    let start = cursor.position() as usize;
    let Some(nul) = data.get(start..).and_then(|rest| rest.iter().position(|&b| b == 0)) else {
      return synonyms;
    };
    cursor.set_position((start + nul + 1) as u64);
    let Ok(index) = cursor.read_u32::<BigEndian>() else {
      return synonyms;
    };
    synonyms.push((data[start..start + nul].to_vec(), index as usize));
  }
}

/// Reads one typed field starting at `pos`; returns the data and the next position.
fn read_field(data: &[u8], pos: usize, kind: char, last: bool) -> Option<(&[u8], usize)> {
  if last {
    return Some((&data[pos..], data.len()));
  }
  if kind.is_ascii_uppercase() {
    let size = u32::from_be_bytes(data.get(pos..pos + 4)?.try_into().ok()?) as usize;
    let start = pos + 4;
    let end = start.checked_add(size)?;
    return Some((data.get(start..end)?, end));
  }
  match data[pos..].iter().position(|&b| b == 0) {
    Some(nul) => Some((&data[pos..pos + nul], pos + nul + 1)),
    None => Some((&data[pos..], data.len())),
  }
}

/// Splits an article into `(type, data)` fields. `None` if truncated.
fn split_article<'a>(
  data: &'a [u8],
  same_type_sequence: Option<&str>,
) -> Option<Vec<(char, &'a [u8])>> {
  let mut fields = Vec::new();
  let mut pos = 0;
  match same_type_sequence {
    Some(types) => {
      let count = types.chars().count();
      for (i, kind) in types.chars().enumerate() {
        if pos > data.len() {
          return None;
        }
        let (field, next) = read_field(data, pos, kind, i + 1 == count)?;
        fields.push((kind, field));
        pos = next;
      }
    }
    None => {
      while pos < data.len() {
        let kind = data[pos] as char;
        let (field, next) = read_field(data, pos + 1, kind, false)?;
        fields.push((kind, field));
        pos = next;
      }
    }
  }
  Some(fields)
}

/// Renders the textual fields of an article. `Err` on invalid UTF-8.
fn render_article(fields: &[(char, &[u8])]) -> Result<String, std::str::Utf8Error> {
  let mut parts = Vec::new();
  for (kind, data) in fields {
    if !TEXT_TYPES.contains(*kind) {
      continue;
    }
    let text = std::str::from_utf8(data)?.trim();
    if text.is_empty() {
      continue;
    }
    parts.push(if *kind == 'x' { xdxf_to_html(text) } else { text.to_string() });
  }
  Ok(parts.join("\n"))
}

/// Parses a StarDict dictionary.
///
/// Articles sharing a headword are joined in index order; synonyms from
/// `.syn` are added as extra headwords carrying the article of their target.
pub fn parse_stardict(path: &Path) -> Result<ParsedEntries, ImportError> {
  let base = base_path(path)?;
  let ifo_path = with_suffix(&base, ".ifo");
  if !ifo_path.is_file() {
    return Err(ImportError::invalid("stardict", &ifo_path, "missing .ifo file"));
  }
  let info = parse_ifo(&ifo_path)?;
  let idx = read_member(&base, ".idx", ".idx.gz")?
    .ok_or_else(|| ImportError::invalid("stardict", &base, "missing .idx file"))?;
  let dict = read_member(&base, ".dict", ".dict.dz")?
    .ok_or_else(|| ImportError::invalid("stardict", &base, "missing .dict file"))?;

  let (records, truncated) = parse_idx(&idx, info.offset_bits_64);
  if records.len() != info.word_count {
    debug!(expected = info.word_count, actual = records.len(), "stardict wordcount mismatch");
  }

  let mut parsed = ParsedEntries::default();
  // entry index per idx record, for `.syn` targets
  let mut rendered: Vec<Option<usize>> = Vec::with_capacity(records.len());

  for record in &records {
    let article = usize::try_from(record.offset).ok().and_then(|start| {
      let end = start.checked_add(record.size as usize)?;
      dict.get(start..end)
    });
    let headword = std::str::from_utf8(&record.word).ok().map(str::trim);
    let payload = article
      .and_then(|a| split_article(a, info.same_type_sequence.as_deref()))
      .and_then(|fields| render_article(&fields).ok());

    match (headword, payload) {
      (Some(headword), Some(payload)) if !headword.is_empty() && !payload.is_empty() => {
        rendered.push(Some(parsed.record_or_append(headword, &payload, "\n")));
      }
      (Some(_), Some(_)) => {
        // binary-only or empty article
        parsed.record_ignored();
        rendered.push(None);
      }
      _ => {
        parsed.record_malformed();
        rendered.push(None);
      }
    }
  }
  if truncated {
    parsed.record_malformed();
  }

  if let Some(syn) = read_member(&base, ".syn", ".syn.gz")? {
    for (word, index) in parse_syn(&syn) {
      let target = rendered.get(index).copied().flatten();
      match (std::str::from_utf8(&word).ok().map(str::trim), target) {
        (Some(word), Some(_)) if parsed.position(word).is_some() => parsed.record_ignored(),
        (Some(word), Some(target)) if !word.is_empty() => {
          let payload = parsed.entries[target].payload.clone();
          parsed.record_or_append(word, &payload, "\n");
        }
        _ => parsed.record_malformed(),
      }
    }
  }

  info!(
    book = info.book_name.as_deref().unwrap_or("?"),
    entries = parsed.entries.len(),
    malformed = parsed.skipped_malformed,
    "parsed stardict dictionary"
  );
  Ok(parsed)
}
