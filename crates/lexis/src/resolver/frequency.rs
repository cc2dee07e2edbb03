//! Frequency ranking against imported frequency lists

use tracing::{debug, warn};

use crate::models::Frequency;
use crate::resolver::Resolver;

impl Resolver {
  /// Rank of `word` in frequency list `dictionary`.
  ///
  /// The word is looked up as given, then lower-cased. `None` if neither form
  /// is listed or the stored rank is not a number.
  pub fn frequency(&self, word: &str, language: &str, dictionary: &str) -> Option<Frequency> {
    let lower = word.to_lowercase();
    let forms = if lower == word { vec![word] } else { vec![word, lower.as_str()] };

    let mut payload = None;
    for form in forms {
      match self.store.lookup(form, dictionary) {
        Ok(Some(found)) => {
          payload = Some(found);
          break;
        }
        Ok(None) => {}
        Err(e) => {
          warn!(word = form, dictionary, error = %e, "frequency lookup failed");
          return None;
        }
      }
    }

    let Some(payload) = payload else {
      debug!(word, language, dictionary, "word not in frequency list");
      return None;
    };
    let Ok(rank) = payload.trim().parse::<u64>() else {
      warn!(word, dictionary, payload = %payload, "frequency rank is not a number");
      return None;
    };

    match self.store.count_entries(dictionary) {
      Ok(corpus_size) => Some(Frequency { rank, corpus_size }),
      Err(e) => {
        warn!(dictionary, error = %e, "frequency list size unavailable");
        None
      }
    }
  }
}
