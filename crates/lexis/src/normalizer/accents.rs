//! Stress-mark folding for Cyrillic text
//!
//! Learner material marks stress with a combining acute (or, less often, a
//! grave). Dictionaries never do, so the marks are removed before lookup.

use unicode_normalization::UnicodeNormalization;

/// U+0301 COMBINING ACUTE ACCENT
const COMBINING_ACUTE: char = '\u{301}';

/// U+0300 COMBINING GRAVE ACCENT
const COMBINING_GRAVE: char = '\u{300}';

/// Precomposed letters that NFC produces from a base letter plus grave.
fn fold_precomposed(c: char) -> char {
  match c {
    'ѐ' => 'е',
    'ѝ' => 'и',
    'Ѐ' => 'Е',
    'Ѝ' => 'И',
    other => other,
  }
}

fn is_mapped(c: char) -> bool {
  matches!(c, COMBINING_ACUTE | COMBINING_GRAVE | 'ѐ' | 'ѝ' | 'Ѐ' | 'Ѝ')
}

/// Removes stress marks from Cyrillic text.
///
/// Input without any mapped mark is returned unchanged (no normalization is
/// applied to it), so the function is the identity on unmarked text.
pub fn fold_cyrillic_stress(word: &str) -> String {
  if !word.chars().any(is_mapped) {
    return word.to_string();
  }

  word
    .nfc()
    .filter(|&c| c != COMBINING_ACUTE && c != COMBINING_GRAVE)
    .map(fold_precomposed)
    .collect()
}
