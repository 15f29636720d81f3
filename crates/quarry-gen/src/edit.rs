//! Single-pass rewriting of statement text.
//!
//! The visitor collects position-indexed rules against the original SQL. [`Edits::apply`]
//! sorts them, walks the source once and reports where every recorded range ended up in
//! the rewritten text. Those final ranges are what the emitted builder steps cite.

use indexmap::IndexMap;
use quarry_core::Span;

/// One rewrite primitive, addressed in source offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Substitute `span` with `text`.
    Replace { span: Span, text: String },
    /// Insert `text` before offset `at`.
    Insert { at: usize, text: String },
    /// Remove `span`.
    Delete(Span),
}

impl Edit {
    /// The source range this rule consumes; empty for insertions.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Replace { span, .. } | Self::Delete(span) => *span,
            Self::Insert { at, .. } => Span::point(*at),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Insert { .. } => 0,
            Self::Replace { .. } | Self::Delete(_) => 1,
        }
    }
}

/// The rules could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Two rules consume overlapping source ranges.
    #[error("edit {second} overlaps edit {first}")]
    Overlap { first: Span, second: Span },

    /// A recorded range begins or ends strictly inside an edited range.
    #[error("recorded range {0} cannot be mapped through the edits")]
    Unmappable(Span),

    /// A rule points outside the source or splits a character.
    #[error("edit {0} is outside the source text")]
    OutOfBounds(Span),
}

impl EditError {
    /// The source range the error refers to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Overlap { second, .. } => *second,
            Self::Unmappable(span) | Self::OutOfBounds(span) => *span,
        }
    }
}

/// A piece of the rewritten text and the source range it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub source: Span,
    pub output: Span,
    /// `false` when the output is a verbatim copy of the source.
    pub edited: bool,
}

/// The outcome of [`Edits::apply`].
#[derive(Debug, Clone, Default)]
pub struct Edited {
    /// The rewritten text.
    pub text: String,
    /// Every copied and edited piece, in output order.
    pub segments: Vec<Segment>,
    positions: IndexMap<Span, Span>,
}

impl Edited {
    /// Where a recorded source range ended up, relative to the start of [`Edited::text`].
    #[must_use]
    pub fn position(&self, original: Span) -> Option<Span> {
        self.positions.get(&original).copied()
    }

    /// Recorded ranges in the order they were recorded.
    #[must_use]
    pub fn positions(&self) -> impl Iterator<Item = (Span, Span)> + '_ {
        self.positions.iter().map(|(k, v)| (*k, *v))
    }

    fn map_offset(&self, at: usize) -> Option<usize> {
        self.segments
            .iter()
            .filter(|s| !s.edited)
            .find(|s| s.source.start <= at && at <= s.source.end)
            .map(|s| s.output.start + (at - s.source.start))
    }
}

/// An ordered collection of rewrite rules and recorded ranges.
#[derive(Debug, Clone, Default)]
pub struct Edits {
    rules: Vec<Edit>,
    records: Vec<Span>,
}

impl Edits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.push(Edit::Replace {
            span,
            text: text.into(),
        });
    }

    /// Insertions at the same offset keep the order they were added in.
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.push(Edit::Insert {
            at,
            text: text.into(),
        });
    }

    pub fn delete(&mut self, span: Span) {
        self.push(Edit::Delete(span));
    }

    /// Asks for the post-edit position of `span`.
    pub fn record(&mut self, span: Span) {
        if !self.records.contains(&span) {
            self.records.push(span);
        }
    }

    /// Whether a replacement over exactly `span` is already queued.
    #[must_use]
    pub fn replaces(&self, span: Span) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r, Edit::Replace { span: s, .. } if *s == span))
    }

    fn push(&mut self, edit: Edit) {
        if !self.rules.contains(&edit) {
            self.rules.push(edit);
        }
    }

    /// Rewrites `source[range]`, ignoring rules that fall outside `range`.
    ///
    /// Offsets in the result are relative to the start of the rewritten text.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Overlap`] when two rules consume the same bytes,
    /// [`EditError::OutOfBounds`] when a rule does not address valid text and
    /// [`EditError::Unmappable`] when a recorded range is cut by an edit.
    pub fn apply(&self, source: &str, range: Span) -> Result<Edited, EditError> {
        let mut rules: Vec<&Edit> = self
            .rules
            .iter()
            .filter(|r| range.contains(r.span()))
            .collect();
        rules.sort_by_key(|r| {
            let span = r.span();
            (span.start, r.rank(), std::cmp::Reverse(span.len()))
        });

        let slice = |span: Span| {
            source
                .get(span.start..span.end)
                .ok_or(EditError::OutOfBounds(span))
        };

        let mut edited = Edited::default();
        let mut cursor = range.start;
        let mut previous: Option<Span> = None;

        for rule in rules {
            let span = rule.span();
            if span.start < cursor {
                return Err(EditError::Overlap {
                    first: previous.unwrap_or(span),
                    second: span,
                });
            }
            copy(&mut edited, slice(Span::new(cursor, span.start))?, cursor);

            let text = match rule {
                Edit::Replace { text, .. } | Edit::Insert { text, .. } => text.as_str(),
                Edit::Delete(_) => "",
            };
            slice(span)?;
            let start = edited.text.len();
            edited.text.push_str(text);
            edited.segments.push(Segment {
                source: span,
                output: Span::new(start, edited.text.len()),
                edited: true,
            });
            cursor = span.end;
            previous = Some(span);
        }
        copy(&mut edited, slice(Span::new(cursor, range.end))?, cursor);

        for &record in &self.records {
            if !range.contains(record) {
                continue;
            }
            let start = edited
                .map_offset(record.start)
                .ok_or(EditError::Unmappable(record))?;
            let end = edited
                .map_offset(record.end)
                .ok_or(EditError::Unmappable(record))?;
            edited.positions.insert(record, Span::new(start, end));
        }
        Ok(edited)
    }
}

fn copy(edited: &mut Edited, text: &str, from: usize) {
    let start = edited.text.len();
    edited.text.push_str(text);
    edited.segments.push(Segment {
        source: Span::new(from, from + text.len()),
        output: Span::new(start, edited.text.len()),
        edited: false,
    });
}
