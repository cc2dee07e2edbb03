//! Markup conversion for imported articles: XDXF and DSL to HTML

use std::sync::LazyLock;

use regex::{Captures, Regex};

static XDXF_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"<(/?)([A-Za-z_][\w-]*)((?:\s+[^>]*?)?)\s*(/?)>"#).expect("XDXF tag pattern")
});

static XDXF_COLOR_ATTR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"c\s*=\s*["']([^"']*)["']"#).expect("XDXF color pattern"));

static DSL_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[(/?)([A-Za-z!*']+\d*)(?:\s+([^\]]*))?\]").expect("DSL tag pattern")
});

static DSL_COMMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{\{.*?\}\}").expect("DSL comment pattern"));

// ─────────────────────────────────────────────────────────────────────────────
// XDXF
// ─────────────────────────────────────────────────────────────────────────────

fn xdxf_tag(caps: &Captures<'_>) -> String {
  let closing = !caps[1].is_empty();
  let name = caps[2].to_ascii_lowercase();
  let attrs = &caps[3];
  let self_closing = !caps[4].is_empty();

  let (open, close): (String, &str) = match name.as_str() {
    "b" | "i" | "u" | "sub" | "sup" | "blockquote" => (format!("<{name}>"), ""),
    "k" => ("<b>".to_string(), "</b>"),
    "c" => {
      let color = XDXF_COLOR_ATTR
        .captures(attrs)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "green".to_string());
      (format!("<span style=\"color:{color}\">"), "</span>")
    }
    "tr" => ("<span class=\"tr\">[".to_string(), "]</span>"),
    "ex" => ("<span class=\"ex\" style=\"color:#808080\">".to_string(), "</span>"),
    "abr" | "abbr" => ("<i class=\"abr\" style=\"color:green\">".to_string(), "</i>"),
    "kref" | "iref" => ("<i class=\"kref\">".to_string(), "</i>"),
    "co" | "dtrn" | "gr" | "pos" | "tense" | "etm" => {
      (format!("<span class=\"{name}\">"), "</span>")
    }
    "def" | "ar" => (format!("<div class=\"{name}\">"), "</div>"),
    "br" => return "<br>".to_string(),
    _ => return String::new(),
  };

  if self_closing {
    String::new()
  } else if closing {
    if close.is_empty() { format!("</{name}>") } else { close.to_string() }
  } else {
    open
  }
}

/// Converts an XDXF article to HTML.
///
/// Known visual tags are mapped to HTML, unknown tags are dropped with their
/// text kept, and line breaks become `<br>`.
pub fn xdxf_to_html(article: &str) -> String {
  let html = XDXF_TAG.replace_all(article.trim(), xdxf_tag);
  html.replace("\r\n", "\n").replace('\n', "<br>")
}

// ─────────────────────────────────────────────────────────────────────────────
// DSL
// ─────────────────────────────────────────────────────────────────────────────

const ESCAPE_PLACEHOLDERS: [(&str, &str); 5] = [
  ("\\[", "\u{e000}"),
  ("\\]", "\u{e001}"),
  ("\\{", "\u{e002}"),
  ("\\}", "\u{e003}"),
  ("\\~", "\u{e004}"),
];

fn protect_escapes(line: &str) -> String {
  let mut out = line.to_string();
  for (escaped, placeholder) in ESCAPE_PLACEHOLDERS {
    out = out.replace(escaped, placeholder);
  }
  out.replace("\\\\", "\\")
}

fn restore_escapes(line: &str) -> String {
  let mut out = line.to_string();
  for (escaped, placeholder) in ESCAPE_PLACEHOLDERS {
    out = out.replace(placeholder, &escaped[1..]);
  }
  out
}

fn dsl_tag(caps: &Captures<'_>) -> String {
  let closing = !caps[1].is_empty();
  let name = &caps[2];
  let argument = caps.get(3).map(|m| m.as_str().trim());

  match (name, closing) {
    ("b" | "i" | "u" | "sub" | "sup", false) => format!("<{name}>"),
    ("b" | "i" | "u" | "sub" | "sup", true) => format!("</{name}>"),
    ("c", false) => format!("<span style=\"color:{}\">", argument.unwrap_or("green")),
    ("c", true) => "</span>".to_string(),
    ("p", false) => "<i class=\"p\" style=\"color:green\">".to_string(),
    ("p", true) => "</i>".to_string(),
    ("ex", false) => "<span class=\"ex\" style=\"color:#808080\">".to_string(),
    ("ex", true) => "</span>".to_string(),
    ("ref", false) => "<i class=\"ref\">".to_string(),
    ("ref", true) => "</i>".to_string(),
    ("'", false) => "<u>".to_string(),
    ("'", true) => "</u>".to_string(),
    // [mN] is handled per line; trn, !trs, com, *, lang, s, url: text only
    _ => String::new(),
  }
}

/// Indentation level of a DSL body line from its leading `[mN]` tag.
fn margin_level(line: &str) -> Option<u32> {
  let rest = line.trim_start().strip_prefix("[m")?;
  let (digits, _) = rest.split_once(']')?;
  if digits.is_empty() { Some(0) } else { digits.parse().ok() }
}

/// Converts one body line: text is HTML-escaped, tags are mapped.
fn dsl_line_to_html(line: &str) -> String {
  let text = DSL_COMMENT.replace_all(line, "");
  let text = protect_escapes(text.trim());

  let mut html = String::with_capacity(text.len());
  let mut last = 0;
  for caps in DSL_TAG.captures_iter(&text) {
    let Some(tag) = caps.get(0) else {
      continue;
    };
    html.push_str(&htmlescape::encode_minimal(&text[last..tag.start()]));
    html.push_str(&dsl_tag(&caps));
    last = tag.end();
  }
  html.push_str(&htmlescape::encode_minimal(&text[last..]));
  restore_escapes(&html)
}

/// Converts the body lines of a DSL card to HTML.
///
/// Each line becomes one block; `[mN]` lines are indented by N em.
pub fn dsl_body_to_html<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
  let mut blocks = Vec::new();
  for line in lines {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    let margin = margin_level(line);
    let html = dsl_line_to_html(line);
    match margin {
      Some(level) if level > 0 => {
        blocks.push(format!("<div style=\"margin-left:{level}em\">{html}</div>"))
      }
      Some(_) => blocks.push(format!("<div>{html}</div>")),
      None => blocks.push(html),
    }
  }
  blocks.join("<br>")
}

/// Removes DSL headword decorations: `{unsorted parts}` and escapes.
pub fn dsl_headword(raw: &str) -> String {
  let protected = protect_escapes(raw.trim());
  let mut out = String::with_capacity(protected.len());
  let mut depth = 0u32;
  for c in protected.chars() {
    match c {
      '{' => depth += 1,
      '}' => depth = depth.saturating_sub(1),
      _ if depth == 0 => out.push(c),
      _ => {}
    }
  }
  restore_escapes(out.trim())
}

/// Expands `(optional)` parts of a DSL headword into every variant.
///
/// `"ask(ed)"` yields `["ask", "asked"]`.
pub fn dsl_headword_variants(headword: &str) -> Vec<String> {
  let Some(open) = headword.find('(') else {
    return vec![headword.to_string()];
  };
  let Some(close_rel) = headword[open..].find(')') else {
    return vec![headword.to_string()];
  };
  let close = open + close_rel;
  let (before, optional, after) =
    (&headword[..open], &headword[open + 1..close], &headword[close + 1..]);

  let mut variants = Vec::new();
  for rest in dsl_headword_variants(after) {
    for candidate in [format!("{before}{rest}"), format!("{before}{optional}{rest}")] {
      let candidate = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
      if !candidate.is_empty() && !variants.contains(&candidate) {
        variants.push(candidate);
      }
    }
  }
  variants
}
