//! The declarative extraction rule set.
//!
//! The scan in [`crate::extract`] is fixed; everything tunable about what
//! counts as a title or a showtime lives here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::Element;

/// `H:MM` / `HH:MM` anywhere in the text. Deliberately unanchored; the
/// length ceiling in [`ExtractionRules::match_time`] keeps sentences that
/// merely contain a time from matching.
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());

/// Tunable title/time heuristics.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
  /// Tags treated as title-bearing regardless of class.
  pub title_tags:           &'static [&'static str],
  /// Substring of the `class` attribute that marks a title-bearing element.
  pub title_class_fragment: &'static str,
  /// Titles shorter than this (in chars) are noise.
  pub min_title_chars:      usize,
  /// Time-bearing text must be shorter than this; longer text is prose.
  pub max_time_text_chars:  usize,
  /// Highest accepted hour. Hours of 24 and up encode post-midnight
  /// showings kept within the same logical day.
  pub max_hour:             u32,
}

impl Default for ExtractionRules {
  fn default() -> Self {
    Self {
      title_tags:           &["h2", "h3"],
      title_class_fragment: "title",
      min_title_chars:      3,
      max_time_text_chars:  10,
      max_hour:             30,
    }
  }
}

impl ExtractionRules {
  /// If `el` looks like it names a movie, return the usable title text.
  ///
  /// Text starting with a digit is never a title — it is a time or a count
  /// that happens to sit in a title-like container.
  pub fn title_text(&self, el: &Element<'_>) -> Option<String> {
    let tag_hit = self.title_tags.contains(&el.tag());
    let class_hit = el
      .class_attr()
      .is_some_and(|c| c.contains(self.title_class_fragment));
    if !tag_hit && !class_hit {
      return None;
    }

    let text = el.text();
    if text.chars().count() < self.min_title_chars {
      return None;
    }
    if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
      return None;
    }
    Some(text)
  }

  /// If `el` looks like a showtime, return the raw matched text and the
  /// parsed hour/minute. Out-of-window values are discarded silently.
  pub fn match_time(&self, el: &Element<'_>) -> Option<TimeMatch> {
    let text = el.text();
    if text.is_empty() || text.chars().count() >= self.max_time_text_chars {
      return None;
    }

    let caps = TIME_RE.captures(&text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if hour > self.max_hour || minute > 59 {
      return None;
    }

    Some(TimeMatch {
      raw: text,
      hour,
      minute,
    })
  }
}

/// A time-like element that passed the validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatch {
  /// The full trimmed element text; part of the per-scan dedup key.
  pub raw:    String,
  pub hour:   u32,
  pub minute: u32,
}
