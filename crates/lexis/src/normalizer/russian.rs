//! Rule-based Russian morphology
//!
//! Every ending rule that matches the word yields a candidate parse with a
//! confidence. The normal form of the best parse is returned; ties go to the
//! longer ending.

use super::lemmatizer::Lemmatizer;

/// A possible analysis of a word form
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
  /// Dictionary (normal) form
  pub normal_form: String,
  /// Grammatical description of the rule that produced this parse
  pub tag: &'static str,
  /// Confidence in 0.0..=1.0
  pub confidence: f32,
  ending_len: usize,
}

/// (ending, replacement, tag, confidence)
type EndingRule = (&'static str, &'static str, &'static str, f32);

const RULES: &[EndingRule] = &[
  // verbs, present tense
  ("аешь", "ать", "VERB,pres,2sg", 0.8),
  ("яешь", "ять", "VERB,pres,2sg", 0.8),
  ("ает", "ать", "VERB,pres,3sg", 0.75),
  ("яет", "ять", "VERB,pres,3sg", 0.75),
  ("аем", "ать", "VERB,pres,1pl", 0.7),
  ("аете", "ать", "VERB,pres,2pl", 0.8),
  ("ают", "ать", "VERB,pres,3pl", 0.75),
  ("яют", "ять", "VERB,pres,3pl", 0.75),
  ("ует", "овать", "VERB,pres,3sg", 0.8),
  ("уешь", "овать", "VERB,pres,2sg", 0.8),
  ("уют", "овать", "VERB,pres,3pl", 0.8),
  ("ишь", "ить", "VERB,pres,2sg", 0.7),
  ("ит", "ить", "VERB,pres,3sg", 0.45),
  ("ят", "ить", "VERB,pres,3pl", 0.45),
  // verbs, past tense
  ("ал", "ать", "VERB,past,masc", 0.55),
  ("ала", "ать", "VERB,past,femn", 0.6),
  ("ало", "ать", "VERB,past,neut", 0.55),
  ("али", "ать", "VERB,past,plur", 0.6),
  ("ил", "ить", "VERB,past,masc", 0.55),
  ("ила", "ить", "VERB,past,femn", 0.6),
  ("или", "ить", "VERB,past,plur", 0.6),
  ("овал", "овать", "VERB,past,masc", 0.75),
  ("овала", "овать", "VERB,past,femn", 0.75),
  // reflexive verbs
  ("ается", "аться", "VERB,refl,3sg", 0.85),
  ("аются", "аться", "VERB,refl,3pl", 0.85),
  ("ался", "аться", "VERB,refl,past", 0.8),
  ("алась", "аться", "VERB,refl,past", 0.8),
  ("ится", "иться", "VERB,refl,3sg", 0.75),
  ("ился", "иться", "VERB,refl,past", 0.75),
  ("илась", "иться", "VERB,refl,past", 0.75),
  // adjectives, hard stem
  ("ая", "ый", "ADJF,femn,nomn", 0.6),
  ("ую", "ый", "ADJF,femn,accs", 0.55),
  ("ое", "ый", "ADJF,neut,nomn", 0.55),
  ("ые", "ый", "ADJF,plur,nomn", 0.6),
  ("ых", "ый", "ADJF,plur,gent", 0.6),
  ("ыми", "ый", "ADJF,plur,ablt", 0.65),
  ("ого", "ый", "ADJF,masc,gent", 0.6),
  ("ому", "ый", "ADJF,masc,datv", 0.6),
  ("ым", "ый", "ADJF,masc,ablt", 0.5),
  ("ой", "ый", "ADJF,femn,gent", 0.4),
  // adjectives, soft stem
  ("яя", "ий", "ADJF,femn,nomn", 0.6),
  ("юю", "ий", "ADJF,femn,accs", 0.6),
  ("ие", "ий", "ADJF,plur,nomn", 0.5),
  ("их", "ий", "ADJF,plur,gent", 0.5),
  ("ими", "ий", "ADJF,plur,ablt", 0.55),
  ("его", "ий", "ADJF,masc,gent", 0.5),
  ("ему", "ий", "ADJF,masc,datv", 0.5),
  // nouns
  ("ости", "ость", "NOUN,femn,gent", 0.7),
  ("остью", "ость", "NOUN,femn,ablt", 0.85),
  ("остей", "ость", "NOUN,plur,gent", 0.8),
  ("ии", "ия", "NOUN,femn,gent", 0.5),
  ("ию", "ия", "NOUN,femn,accs", 0.6),
  ("ией", "ия", "NOUN,femn,ablt", 0.7),
  ("ами", "", "NOUN,plur,ablt", 0.45),
  ("ах", "", "NOUN,plur,loct", 0.45),
  ("ов", "", "NOUN,plur,gent", 0.5),
  ("ом", "", "NOUN,masc,ablt", 0.45),
  ("у", "а", "NOUN,femn,accs", 0.42),
  ("ы", "а", "NOUN,femn,gent", 0.41),
];

/// Confidence given to reading the word as its own normal form.
const IDENTITY_CONFIDENCE: f32 = 0.4;

/// Shortest stem (in characters) a rule may leave behind.
const MIN_STEM_CHARS: usize = 2;

/// Rule-based morphological analyzer for Russian.
#[derive(Debug, Clone, Default)]
pub struct RussianMorphology;

impl RussianMorphology {
  /// Constructor for RussianMorphology
  pub fn new() -> Self {
    Self
  }

  /// All candidate parses of `word`, best first.
  ///
  /// The word itself is always among the candidates.
  pub fn parse(&self, word: &str) -> Vec<Parse> {
    let word = word.to_lowercase();
    let mut parses = vec![Parse {
      normal_form: word.clone(),
      tag: "UNKN",
      confidence: IDENTITY_CONFIDENCE,
      ending_len: 0,
    }];

    for &(ending, replacement, tag, confidence) in RULES {
      let Some(stem) = word.strip_suffix(ending) else {
        continue;
      };
      if stem.chars().count() < MIN_STEM_CHARS {
        continue;
      }
      parses.push(Parse {
        normal_form: format!("{stem}{replacement}"),
        tag,
        confidence,
        ending_len: ending.chars().count(),
      });
    }

    // stable sort keeps table order for full ties
    parses.sort_by(|a, b| {
      b.confidence.total_cmp(&a.confidence).then_with(|| b.ending_len.cmp(&a.ending_len))
    });
    parses
  }
}

impl Lemmatizer for RussianMorphology {
  fn lemmatize(&self, word: &str, _greedy: bool) -> String {
    self
      .parse(word)
      .into_iter()
      .next()
      .map(|parse| parse.normal_form)
      .unwrap_or_else(|| word.to_lowercase())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lemma(word: &str) -> String {
    RussianMorphology::new().lemmatize(word, false)
  }

  #[test]
  fn verbs_reduce_to_infinitive() {
    assert_eq!(lemma("читаешь"), "читать");
    assert_eq!(lemma("рисует"), "рисовать");
    assert_eq!(lemma("занимается"), "заниматься");
  }

  #[test]
  fn adjectives_reduce_to_masculine_nominative() {
    assert_eq!(lemma("красивая"), "красивый");
    assert_eq!(lemma("синюю"), "синий");
  }

  #[test]
  fn nouns_reduce_to_nominative() {
    assert_eq!(lemma("радостью"), "радость");
  }

  #[test]
  fn feminine_case_forms_reduce_to_nominative() {
    assert_eq!(lemma("книгу"), "книга");
    assert_eq!(lemma("ракеты"), "ракета");
    assert_eq!(lemma("красивую"), "красивый");
  }

  #[test]
  fn every_rule_can_outrank_the_word_itself() {
    assert!(RULES.iter().all(|&(.., confidence)| confidence >= IDENTITY_CONFIDENCE));
  }

  #[test]
  fn unknown_shapes_keep_the_word() {
    assert_eq!(lemma("стол"), "стол");
    assert_eq!(lemma("Москва"), "москва");
  }

  #[test]
  fn short_stems_are_not_stripped() {
    // "ах" would leave a one-letter stem
    assert_eq!(lemma("мах"), "мах");
  }

  #[test]
  fn parse_orders_by_confidence() {
    let parses = RussianMorphology::new().parse("читаешь");

    assert_eq!(parses[0].tag, "VERB,pres,2sg");
    assert!(parses.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    assert!(parses.iter().any(|p| p.tag == "UNKN"));
  }
}
