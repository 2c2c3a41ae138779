//! Best-effort HTML document tree.
//!
//! Source pages are uncontrolled, so parsing must tolerate unmatched and
//! unclosed tags. `scraper`'s html5ever backend recovers from malformed
//! markup the way browsers do, which makes [`MarkupTree::parse`] infallible.

use scraper::{ElementRef, Html};

/// A parsed HTML document, traversable in document order.
///
/// Parsing is referentially transparent: the same input text always yields a
/// structurally equivalent tree.
pub struct MarkupTree {
  doc: Html,
}

impl MarkupTree {
  pub fn parse(html: &str) -> Self {
    Self {
      doc: Html::parse_document(html),
    }
  }

  /// Every element in the document, in document order.
  pub fn elements(&self) -> impl Iterator<Item = Element<'_>> {
    self
      .doc
      .root_element()
      .descendants()
      .filter_map(ElementRef::wrap)
      .map(Element)
  }
}

/// One element of the tree: tag name, class attribute, text content.
#[derive(Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
  /// Lowercase tag name.
  pub fn tag(&self) -> &'a str {
    self.0.value().name()
  }

  /// The raw `class` attribute, if any.
  pub fn class_attr(&self) -> Option<&'a str> {
    self.0.value().attr("class")
  }

  /// Concatenated, trimmed text content of the element and its descendants.
  pub fn text(&self) -> String {
    self.0.text().collect::<String>().trim().to_string()
  }
}
