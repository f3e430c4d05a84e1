//! Formatted inline text: spans, format sets, and line editing.
//!
//! A `Line` is an ordered run of `Span`s. Each span carries plain text plus
//! inline attributes (format set, optional link target, optional variable
//! marker). All offsets in this module are char offsets, not byte offsets.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::ops::Range;

/// Inline format applied to a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
    Code,
    Highlight,
}

impl Format {
    /// All formats, in bit order.
    pub const ALL: [Format; 8] = [
        Format::Bold,
        Format::Italic,
        Format::Underline,
        Format::Strikethrough,
        Format::Superscript,
        Format::Subscript,
        Format::Code,
        Format::Highlight,
    ];

    fn bit(self) -> u8 {
        match self {
            Format::Bold => 1 << 0,
            Format::Italic => 1 << 1,
            Format::Underline => 1 << 2,
            Format::Strikethrough => 1 << 3,
            Format::Superscript => 1 << 4,
            Format::Subscript => 1 << 5,
            Format::Code => 1 << 6,
            Format::Highlight => 1 << 7,
        }
    }
}

/// A set of inline formats, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FormatSet(u8);

impl FormatSet {
    pub const EMPTY: FormatSet = FormatSet(0);

    /// All eight formats set.
    pub fn all() -> Self {
        FormatSet(u8::MAX)
    }

    pub fn single(fmt: Format) -> Self {
        FormatSet(fmt.bit())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, fmt: Format) -> bool {
        self.0 & fmt.bit() != 0
    }

    pub fn insert(&mut self, fmt: Format) {
        self.0 |= fmt.bit();
    }

    pub fn remove(&mut self, fmt: Format) {
        self.0 &= !fmt.bit();
    }

    /// Set or clear a format.
    pub fn set(&mut self, fmt: Format, on: bool) {
        if on {
            self.insert(fmt);
        } else {
            self.remove(fmt);
        }
    }

    pub fn toggle(&mut self, fmt: Format) {
        self.0 ^= fmt.bit();
    }

    /// Formats present in both sets.
    pub fn intersection(&self, other: FormatSet) -> FormatSet {
        FormatSet(self.0 & other.0)
    }

    /// Iterate over the formats in this set.
    pub fn iter(&self) -> impl Iterator<Item = Format> + '_ {
        Format::ALL.iter().copied().filter(|f| self.contains(*f))
    }
}

impl FromIterator<Format> for FormatSet {
    fn from_iter<T: IntoIterator<Item = Format>>(iter: T) -> Self {
        let mut set = FormatSet::EMPTY;
        for fmt in iter {
            set.insert(fmt);
        }
        set
    }
}

/// A run of text with uniform inline attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: SmolStr,
    #[serde(default, skip_serializing_if = "FormatSet::is_empty")]
    pub formats: FormatSet,
    /// Link target URL, if this span is a link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<SmolStr>,
    /// Variable name, if this span is a variable placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<SmolStr>,
}

impl Span {
    pub fn plain(text: impl Into<SmolStr>) -> Self {
        Self {
            text: text.into(),
            formats: FormatSet::EMPTY,
            link: None,
            variable: None,
        }
    }

    pub fn formatted(text: impl Into<SmolStr>, formats: FormatSet) -> Self {
        Self {
            text: text.into(),
            formats,
            link: None,
            variable: None,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether two spans carry identical attributes (and can merge).
    fn same_attrs(&self, other: &Span) -> bool {
        self.formats == other.formats && self.link == other.link && self.variable == other.variable
    }

    /// Clone this span's attributes onto new text.
    fn with_text(&self, text: impl Into<SmolStr>) -> Span {
        Span {
            text: text.into(),
            formats: self.formats,
            link: self.link.clone(),
            variable: self.variable.clone(),
        }
    }

    /// Split at a char offset into (left, right).
    fn split_at(&self, offset: usize) -> (Span, Span) {
        let byte = char_to_byte(&self.text, offset);
        (
            self.with_text(&self.text[..byte]),
            self.with_text(&self.text[byte..]),
        )
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// One line of formatted text within a block.
///
/// Kept normalized: no empty spans, no adjacent spans with identical
/// attributes. An empty line has zero spans.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Line {
    spans: Vec<Span>,
}

impl Line {
    pub fn empty() -> Self {
        Self { spans: Vec::new() }
    }

    pub fn plain(text: impl Into<SmolStr>) -> Self {
        Self::from_spans(vec![Span::plain(text)])
    }

    pub fn from_spans(spans: Vec<Span>) -> Self {
        let mut line = Self { spans };
        line.normalize();
        line
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.spans.iter().map(Span::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Merge adjacent same-attribute spans and drop empty ones.
    fn normalize(&mut self) {
        let spans = std::mem::take(&mut self.spans);
        for span in spans {
            if span.text.is_empty() {
                continue;
            }
            match self.spans.last_mut() {
                Some(last) if last.same_attrs(&span) => {
                    let mut text = String::with_capacity(last.text.len() + span.text.len());
                    text.push_str(&last.text);
                    text.push_str(&span.text);
                    last.text = text.into();
                }
                _ => self.spans.push(span),
            }
        }
    }

    /// Split spans at a char offset, clamped to the line length.
    fn split_spans(&self, offset: usize) -> (Vec<Span>, Vec<Span>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut pos = 0;
        for span in &self.spans {
            let len = span.char_len();
            if pos + len <= offset {
                left.push(span.clone());
            } else if pos >= offset {
                right.push(span.clone());
            } else {
                let (l, r) = span.split_at(offset - pos);
                left.push(l);
                right.push(r);
            }
            pos += len;
        }
        (left, right)
    }

    /// Split the line at a char offset into (left, right).
    pub fn split_at(&self, offset: usize) -> (Line, Line) {
        let (left, right) = self.split_spans(offset);
        (Line::from_spans(left), Line::from_spans(right))
    }

    /// Copy of a char range as its own line.
    pub fn slice(&self, range: Range<usize>) -> Line {
        let (_, rest) = self.split_spans(range.start);
        let tail = Line { spans: rest };
        let (mid, _) = tail.split_spans(range.end.saturating_sub(range.start));
        Line::from_spans(mid)
    }

    /// Insert plain text at a char offset.
    ///
    /// The inserted text inherits the attributes of the span the caret sits
    /// in (the span containing the character before the offset), matching
    /// how typing continues the surrounding formatting.
    pub fn insert_text(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.spans.is_empty() {
            self.spans.push(Span::plain(text));
            return;
        }
        let at = offset.min(self.char_len());
        // Attribute donor: span containing char at-1, else the span at the offset.
        let donor_offset = at.saturating_sub(1);
        let donor = self.span_at(donor_offset).map(|(i, _)| i).unwrap_or(0);
        let donor_span = self.spans[donor].with_text(text);
        let (mut left, right) = self.split_spans(at);
        left.push(donor_span);
        left.extend(right);
        self.spans = left;
        self.normalize();
    }

    /// Insert a pre-built span at a char offset (links, variables).
    pub fn insert_span(&mut self, offset: usize, span: Span) {
        let at = offset.min(self.char_len());
        let (mut left, right) = self.split_spans(at);
        left.push(span);
        left.extend(right);
        self.spans = left;
        self.normalize();
    }

    /// Delete a char range.
    pub fn delete(&mut self, range: Range<usize>) {
        let (left, rest) = self.split_spans(range.start);
        let tail = Line { spans: rest };
        let (_, right) = tail.split_spans(range.end.saturating_sub(range.start));
        let mut spans = left;
        spans.extend(right);
        self.spans = spans;
        self.normalize();
    }

    /// Append another line's spans onto this one.
    pub fn append(&mut self, other: Line) {
        self.spans.extend(other.spans);
        self.normalize();
    }

    /// Index of the span containing the given char offset, plus the offset
    /// within that span. The end of the line maps to the last span.
    fn span_at(&self, offset: usize) -> Option<(usize, usize)> {
        let mut pos = 0;
        for (i, span) in self.spans.iter().enumerate() {
            let len = span.char_len();
            if offset < pos + len {
                return Some((i, offset - pos));
            }
            pos += len;
        }
        self.spans.len().checked_sub(1).map(|i| (i, self.spans[i].char_len()))
    }

    /// Apply or clear a format over a char range.
    pub fn set_format(&mut self, range: Range<usize>, fmt: Format, on: bool) {
        self.map_range(range, |span| span.formats.set(fmt, on));
    }

    /// Set or clear the link target over a char range.
    pub fn set_link(&mut self, range: Range<usize>, link: Option<&str>) {
        let link: Option<SmolStr> = link.map(SmolStr::new);
        self.map_range(range, |span| span.link = link.clone());
    }

    fn map_range(&mut self, range: Range<usize>, mut f: impl FnMut(&mut Span)) {
        if range.start >= range.end {
            return;
        }
        let (left, rest) = self.split_spans(range.start);
        let tail = Line { spans: rest };
        let (mut mid, right) = tail.split_spans(range.end - range.start);
        for span in &mut mid {
            f(span);
        }
        let mut spans = left;
        spans.extend(mid);
        spans.extend(right);
        self.spans = spans;
        self.normalize();
    }

    /// Whether every char in the range carries the format. Empty ranges and
    /// empty lines report false.
    pub fn format_active(&self, range: Range<usize>, fmt: Format) -> bool {
        if range.start >= range.end {
            return false;
        }
        let mut pos = 0;
        let mut covered = false;
        for span in &self.spans {
            let len = span.char_len();
            let overlap = pos < range.end && pos + len > range.start;
            if overlap {
                if !span.formats.contains(fmt) {
                    return false;
                }
                covered = true;
            }
            pos += len;
        }
        covered
    }

    /// Intersection of the format sets across all chars in the range.
    pub fn formats_in(&self, range: Range<usize>) -> FormatSet {
        let mut acc = FormatSet::all();
        let mut pos = 0;
        let mut covered = false;
        for span in &self.spans {
            let len = span.char_len();
            if pos < range.end && pos + len > range.start {
                acc = acc.intersection(span.formats);
                covered = true;
            }
            pos += len;
        }
        if covered { acc } else { FormatSet::EMPTY }
    }

    /// Link target at a char offset, if the caret sits inside a link span.
    pub fn link_at(&self, offset: usize) -> Option<SmolStr> {
        let probe = offset.min(self.char_len().saturating_sub(1));
        self.span_at(probe)
            .and_then(|(i, _)| self.spans[i].link.clone())
    }

    /// Char range of the whole span containing the offset.
    pub fn span_range_at(&self, offset: usize) -> Option<Range<usize>> {
        let (idx, _) = self.span_at(offset)?;
        let start: usize = self.spans[..idx].iter().map(Span::char_len).sum();
        Some(start..start + self.spans[idx].char_len())
    }
}
