//! Per-language inflection suffix rules
//!
//! Each language has a conservative table (plural and similar endings whose
//! reversal is nearly always right) and a greedy table (verb forms and
//! derivations that may overshoot). Tables are ordered; the first rule whose
//! ending matches and leaves a long enough stem wins.

/// (ending, replacement, minimum stem chars, chars the stem must not end with)
type SuffixRule = (&'static str, &'static str, usize, &'static str);

/// Marks a rule whose stem loses a doubled final consonant (`running` -> `run`).
const UNDOUBLE: &str = "\u{0}";

/// Consonants that are undoubled after `UNDOUBLE` rules.
const DOUBLED: &str = "bgmnpt";

const EN_CONSERVATIVE: &[SuffixRule] = &[
  ("ies", "y", 2, ""),
  ("sses", "ss", 1, ""),
  ("shes", "sh", 1, ""),
  ("ches", "ch", 1, ""),
  ("zzes", "zz", 1, ""),
  ("xes", "x", 1, ""),
  ("s", "", 2, "siu'"),
];

const EN_GREEDY: &[SuffixRule] = &[
  ("ied", "y", 2, ""),
  ("ing", UNDOUBLE, 3, ""),
  ("ed", UNDOUBLE, 3, "e"),
  ("ily", "y", 2, ""),
  ("ness", "", 3, ""),
  ("ly", "", 3, ""),
];

const FR_CONSERVATIVE: &[SuffixRule] =
  &[("eaux", "eau", 1, ""), ("aux", "al", 2, ""), ("s", "", 3, "sux")];

const FR_GREEDY: &[SuffixRule] = &[
  ("aient", "er", 3, ""),
  ("ait", "er", 3, ""),
  ("ées", "é", 2, ""),
  ("ée", "é", 2, ""),
  ("és", "é", 2, ""),
  ("ez", "er", 3, ""),
];

const DE_CONSERVATIVE: &[SuffixRule] = &[
  ("innen", "in", 2, ""),
  ("ungen", "ung", 1, ""),
  ("heiten", "heit", 1, ""),
  ("keiten", "keit", 1, ""),
  ("schaften", "schaft", 1, ""),
  ("nisse", "nis", 1, ""),
];

const DE_GREEDY: &[SuffixRule] = &[
  ("äuser", "aus", 1, ""),
  ("ern", "", 3, ""),
  ("er", "", 3, "e"),
  ("en", "", 3, "e"),
  ("es", "", 3, "e"),
  ("e", "", 3, "e"),
  ("s", "", 3, "s"),
];

const ES_CONSERVATIVE: &[SuffixRule] = &[
  ("iones", "ión", 2, ""),
  ("ces", "z", 2, ""),
  ("es", "", 3, "aeiousc"),
  ("s", "", 2, "s"),
];

const ES_GREEDY: &[SuffixRule] =
  &[("iendo", "er", 2, ""), ("ando", "ar", 2, ""), ("ado", "ar", 2, ""), ("ido", "er", 2, "")];

const IT_CONSERVATIVE: &[SuffixRule] =
  &[("chi", "co", 2, ""), ("ghi", "go", 2, ""), ("che", "ca", 2, ""), ("ghe", "ga", 2, "")];

const IT_GREEDY: &[SuffixRule] =
  &[("ando", "are", 2, ""), ("ato", "are", 2, ""), ("i", "o", 3, ""), ("e", "a", 3, "")];

const PT_CONSERVATIVE: &[SuffixRule] = &[
  ("ões", "ão", 1, ""),
  ("ães", "ão", 1, ""),
  ("ais", "al", 2, ""),
  ("éis", "el", 1, ""),
  ("ns", "m", 2, ""),
  ("res", "r", 2, ""),
  ("s", "", 2, "s"),
];

const PT_GREEDY: &[SuffixRule] = &[("ando", "ar", 2, ""), ("ado", "ar", 2, "")];

const NL_CONSERVATIVE: &[SuffixRule] = &[("'s", "", 1, "")];

const NL_GREEDY: &[SuffixRule] = &[("en", "", 3, "e"), ("s", "", 3, "s")];

/// Conservative and greedy tables of `language`; empty when it has none.
fn tables(language: &str) -> (&'static [SuffixRule], &'static [SuffixRule]) {
  match language {
    "en" => (EN_CONSERVATIVE, EN_GREEDY),
    "fr" => (FR_CONSERVATIVE, FR_GREEDY),
    "de" => (DE_CONSERVATIVE, DE_GREEDY),
    "es" => (ES_CONSERVATIVE, ES_GREEDY),
    "it" => (IT_CONSERVATIVE, IT_GREEDY),
    "pt" => (PT_CONSERVATIVE, PT_GREEDY),
    "nl" => (NL_CONSERVATIVE, NL_GREEDY),
    _ => (&[][..], &[][..]),
  }
}

/// Inflection rules of one language
#[derive(Debug, Clone, Copy)]
pub struct SuffixRules {
  conservative: &'static [SuffixRule],
  greedy: &'static [SuffixRule],
}

impl SuffixRules {
  /// Rules for `language`; languages without tables never match.
  pub fn for_language(language: &str) -> Self {
    let (conservative, greedy) = tables(language);
    Self { conservative, greedy }
  }

  /// Whether the language has any rules at all.
  pub fn is_empty(&self) -> bool {
    self.conservative.is_empty() && self.greedy.is_empty()
  }

  /// Base form of `word` by the first matching rule, if any.
  ///
  /// Greedy rules are tried before conservative ones. The stem keeps the
  /// casing of `word`.
  pub fn apply(&self, word: &str, greedy: bool) -> Option<String> {
    let lower = word.to_lowercase();
    let greedy_rules: &[SuffixRule] = if greedy { self.greedy } else { &[] };
    greedy_rules.iter().chain(self.conservative).find_map(|rule| strip(word, &lower, rule))
  }
}

fn strip(
  word: &str,
  lower: &str,
  &(ending, replacement, min_stem, not_after): &SuffixRule,
) -> Option<String> {
  let stem = lower.strip_suffix(ending)?;
  if stem.chars().count() < min_stem {
    return None;
  }
  if stem.chars().last().is_some_and(|last| not_after.contains(last)) {
    return None;
  }
  // keep the caller's casing when lowercasing did not shift byte offsets
  let mut base = if lower.len() == word.len() && word.is_char_boundary(stem.len()) {
    word[..stem.len()].to_string()
  } else {
    stem.to_string()
  };
  if replacement == UNDOUBLE {
    undouble(&mut base);
  } else {
    base.push_str(replacement);
  }
  Some(base)
}

fn undouble(stem: &mut String) {
  let mut tail = stem.chars().rev();
  if let (Some(last), Some(before)) = (tail.next(), tail.next()) {
    if last == before && DOUBLED.contains(last.to_ascii_lowercase()) {
      stem.pop();
    }
  }
}
