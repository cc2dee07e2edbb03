//! ABBYY Lingvo DSL dictionaries (`.dsl`, or gzip compressed `.dsl.dz`)
//!
//! A card is one or more non-indented headword lines followed by indented
//! body lines. `#` lines before the first card are the header.

use std::io::Read;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, UTF_16LE};
use flate2::read::GzDecoder;
use tracing::info;

use crate::errors::ImportError;
use crate::importers::markup::{dsl_body_to_html, dsl_headword, dsl_headword_variants};
use crate::importers::report::ParsedEntries;

fn read_source(path: &Path) -> Result<Vec<u8>, ImportError> {
  if path.extension().is_some_and(|ext| ext == "dz") {
    let file = std::fs::File::open(path).map_err(|e| ImportError::io(path, e))?;
    let mut data = Vec::new();
    GzDecoder::new(file).read_to_end(&mut data).map_err(|e| ImportError::io(path, e))?;
    Ok(data)
  } else {
    std::fs::read(path).map_err(|e| ImportError::io(path, e))
  }
}

/// Picks the encoding from the BOM; without one, text with many NUL bytes is
/// taken as UTF-16LE, anything else as UTF-8.
fn decode(bytes: &[u8]) -> String {
  if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
    return encoding.decode_without_bom_handling(&bytes[bom_len..]).0.into_owned();
  }
  let zeros = bytes.iter().filter(|&&b| b == 0).count();
  let encoding = if zeros * 4 > bytes.len() { UTF_16LE } else { UTF_8 };
  encoding.decode_without_bom_handling(bytes).0.into_owned()
}

#[derive(Default)]
struct Card<'a> {
  headwords: Vec<&'a str>,
  body: Vec<&'a str>,
}

impl Card<'_> {
  fn flush(&mut self, parsed: &mut ParsedEntries) {
    let headwords = std::mem::take(&mut self.headwords);
    let body = std::mem::take(&mut self.body);
    if headwords.is_empty() {
      return;
    }

    let html = dsl_body_to_html(body);
    for raw in headwords {
      let headword = dsl_headword(raw);
      if headword.is_empty() || html.is_empty() {
        parsed.record_malformed();
        continue;
      }
      for variant in dsl_headword_variants(&headword) {
        parsed.record_or_append(&variant, &html, "<br>");
      }
    }
  }
}

/// Parses a DSL dictionary.
///
/// Each headword of a card (and each expansion of its optional parts) gets
/// the card body converted to HTML; repeated headwords are joined with `<br>`.
pub fn parse_dsl(path: &Path) -> Result<ParsedEntries, ImportError> {
  let text = decode(&read_source(path)?);

  let mut parsed = ParsedEntries::default();
  let mut name = None;
  let mut in_header = true;
  let mut card = Card::default();

  for line in text.lines() {
    if in_header && line.starts_with('#') {
      if let Some(value) = line.strip_prefix("#NAME") {
        name = Some(value.trim().trim_matches('"').to_string());
      }
      continue;
    }
    in_header = false;

    if line.trim().is_empty() {
      continue;
    }
    if line.starts_with([' ', '\t']) {
      if !card.headwords.is_empty() {
        card.body.push(line);
      }
      continue;
    }
    if !card.body.is_empty() {
      card.flush(&mut parsed);
    }
    card.headwords.push(line);
  }
  card.flush(&mut parsed);

  info!(
    name = name.as_deref().unwrap_or("?"),
    entries = parsed.entries.len(),
    malformed = parsed.skipped_malformed,
    "parsed dsl dictionary"
  );
  Ok(parsed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  const SAMPLE: &str = "#NAME \"Test\"\n#INDEX_LANGUAGE \"German\"\n\n\
    Haus\n\
    Häuser\n\
    \t[m1][b]1.[/b] [trn]house[/trn][/m]\n\
    \t[m1][b]2.[/b] [trn]home[/trn][/m]\n\
    \n\
    ask(ed)\n\
    \t[trn]to ask[/trn]\n\
    orphan\n";

  fn payload<'a>(parsed: &'a ParsedEntries, headword: &str) -> Option<&'a str> {
    parsed.entries.iter().find(|e| e.headword == headword).map(|e| e.payload.as_str())
  }

  #[test]
  fn cards_share_body_between_headwords() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("d.dsl");
    std::fs::write(&path, SAMPLE).unwrap();

    let parsed = parse_dsl(&path).unwrap();

    let expected = "<div style=\"margin-left:1em\"><b>1.</b> house</div><br>\
                    <div style=\"margin-left:1em\"><b>2.</b> home</div>";
    assert_eq!(payload(&parsed, "Haus"), Some(expected));
    assert_eq!(payload(&parsed, "Häuser"), Some(expected));
  }

  #[test]
  fn optional_parts_expand_and_orphans_are_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("d.dsl");
    std::fs::write(&path, SAMPLE).unwrap();

    let parsed = parse_dsl(&path).unwrap();

    assert_eq!(payload(&parsed, "ask"), Some("to ask"));
    assert_eq!(payload(&parsed, "asked"), Some("to ask"));
    assert_eq!(payload(&parsed, "orphan"), None);
    assert_eq!(parsed.skipped_malformed, 1);
  }

  #[test]
  fn reads_utf16_with_bom() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("d.dsl");
    let mut bytes = vec![0xff, 0xfe];
    bytes.extend("кот\n\tcat\n".encode_utf16().flat_map(u16::to_le_bytes));
    std::fs::write(&path, bytes).unwrap();

    let parsed = parse_dsl(&path).unwrap();

    assert_eq!(payload(&parsed, "кот"), Some("cat"));
  }

  #[test]
  fn reads_utf16_without_bom() {
    let bytes: Vec<u8> = "cat\n\tKatze\n".encode_utf16().flat_map(u16::to_le_bytes).collect();

    assert_eq!(decode(&bytes), "cat\n\tKatze\n");
  }
}
