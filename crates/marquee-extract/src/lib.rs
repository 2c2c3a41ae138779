//! Heuristic showtime extraction from uncontrolled theater pages.
//!
//! There is no page-specific grammar here: structure is inferred from
//! generic cues — heading tags, `"title"` class fragments, `HH:MM` text —
//! by a single scan in document order. The cues live in a declarative
//! [`ExtractionRules`] value so they can be tested against synthetic trees
//! and tuned without touching the scan itself.

pub mod extract;
pub mod markup;
pub mod rules;

pub use extract::{ScanContext, ScheduleCandidate, extract_schedules};
pub use markup::MarkupTree;
pub use rules::ExtractionRules;
