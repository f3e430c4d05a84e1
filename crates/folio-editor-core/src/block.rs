//! Document blocks: typed tree nodes with lines, children, and metadata.
//!
//! A block's flattened content is its lines joined by a virtual `\n`; all
//! offsets into a block are char offsets within that flattened string.

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};
use std::collections::BTreeMap;
use std::ops::Range;

use crate::line::{Format, FormatSet, Line, Span};

/// Maximum indent level for a block.
pub const MAX_INDENT: u8 = 5;

/// Block metadata keys persisted inside documents.
pub mod meta {
    /// Header-row count for tables (integer).
    pub const HEADERS: &str = "headers";
    /// Comma-separated per-column alignment ("L"/"C"/"R").
    pub const ALIGN: &str = "align";
    /// Comma-separated integer column width percentages.
    pub const COLWIDTHS: &str = "colwidths";
    /// Caption text (tables, diagrams).
    pub const CAPTION: &str = "caption";
}

/// The type of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    OrderedList,
    Table,
    TableRow,
    TableCell,
    Diagram,
    Equation,
}

impl BlockKind {
    /// Blocks whose content is directly editable text addressed by the
    /// document-level selection (tables edit through cells instead).
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph
                | BlockKind::Heading1
                | BlockKind::Heading2
                | BlockKind::Heading3
                | BlockKind::BulletList
                | BlockKind::OrderedList
        )
    }

    pub fn is_heading(self) -> bool {
        matches!(
            self,
            BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3
        )
    }

    pub fn is_list(self) -> bool {
        matches!(self, BlockKind::BulletList | BlockKind::OrderedList)
    }
}

/// Per-column alignment for tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl ColAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            ColAlign::Left => "L",
            ColAlign::Center => "C",
            ColAlign::Right => "R",
        }
    }

    pub fn parse(s: &str) -> ColAlign {
        match s.trim() {
            "C" => ColAlign::Center,
            "R" => ColAlign::Right,
            _ => ColAlign::Left,
        }
    }
}

/// Even integer percentage split for `cols` columns (floor division).
pub fn even_widths(cols: usize) -> Vec<u32> {
    if cols == 0 {
        return Vec::new();
    }
    vec![(100 / cols) as u32; cols]
}

/// A structural unit of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    #[serde(default)]
    pub indent: u8,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<SmolStr, SmolStr>,
}

impl Block {
    /// A block of the given kind with one empty line.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            indent: 0,
            lines: vec![Line::empty()],
            children: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn paragraph() -> Self {
        Self::new(BlockKind::Paragraph)
    }

    pub fn with_text(kind: BlockKind, text: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            indent: 0,
            lines: vec![Line::plain(text)],
            children: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn from_lines(kind: BlockKind, lines: Vec<Line>) -> Self {
        let lines = if lines.is_empty() {
            vec![Line::empty()]
        } else {
            lines
        };
        Self {
            kind,
            indent: 0,
            lines,
            children: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    /// A table block: `rows` × `cols` with default metadata (one header
    /// row, even column widths, left alignment).
    pub fn table(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let children = (0..rows)
            .map(|_| {
                let cells = (0..cols).map(|_| Block::new(BlockKind::TableCell)).collect();
                Block {
                    kind: BlockKind::TableRow,
                    indent: 0,
                    lines: Vec::new(),
                    children: cells,
                    meta: BTreeMap::new(),
                }
            })
            .collect();
        let mut meta = BTreeMap::new();
        meta.insert(SmolStr::new(meta::HEADERS), SmolStr::new("1"));
        meta.insert(SmolStr::new(meta::COLWIDTHS), join_nums(&even_widths(cols)));
        meta.insert(
            SmolStr::new(meta::ALIGN),
            SmolStr::new(vec!["L"; cols].join(",")),
        );
        Block {
            kind: BlockKind::Table,
            indent: 0,
            lines: Vec::new(),
            children,
            meta,
        }
    }

    // === Flattened content addressing ===

    /// Lines joined by a virtual newline.
    pub fn content(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.text());
        }
        out
    }

    /// Char length of the flattened content (virtual newlines included).
    pub fn char_len(&self) -> usize {
        let text: usize = self.lines.iter().map(Line::char_len).sum();
        text + self.lines.len().saturating_sub(1)
    }

    /// Map a flattened char offset to (line index, offset within line).
    /// Clamps past-the-end offsets to the end of the last line.
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let mut pos = 0;
        for (i, line) in self.lines.iter().enumerate() {
            let len = line.char_len();
            if offset <= pos + len {
                return (i, offset - pos);
            }
            pos += len + 1; // virtual newline
        }
        let last = self.lines.len().saturating_sub(1);
        (last, self.lines.get(last).map_or(0, Line::char_len))
    }

    /// Insert text at a flattened offset. Embedded `\n` split into lines.
    pub fn insert_text(&mut self, offset: usize, text: &str) {
        if self.lines.is_empty() {
            self.lines.push(Line::empty());
        }
        let (li, lo) = self.locate(offset);
        if !text.contains('\n') {
            self.lines[li].insert_text(lo, text);
            return;
        }
        let (head, tail) = self.lines[li].split_at(lo);
        let mut segments = text.split('\n');
        let mut current = head;
        current.insert_text(current.char_len(), segments.next().unwrap_or(""));
        let mut new_lines = Vec::new();
        for seg in segments {
            new_lines.push(std::mem::replace(&mut current, Line::plain(seg)));
        }
        current.append(tail);
        new_lines.push(current);
        self.lines.splice(li..=li, new_lines);
    }

    /// Delete a flattened char range, joining lines across virtual newlines.
    pub fn delete_range(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let (sl, so) = self.locate(range.start);
        let (el, eo) = self.locate(range.end);
        if sl == el {
            self.lines[sl].delete(so..eo);
            return;
        }
        let (head, _) = self.lines[sl].split_at(so);
        let (_, tail) = self.lines[el].split_at(eo);
        let mut joined = head;
        joined.append(tail);
        self.lines.splice(sl..=el, [joined]);
    }

    /// Split the lines at a flattened offset into (left, right) line lists.
    pub fn split_lines_at(&self, offset: usize) -> (Vec<Line>, Vec<Line>) {
        let (li, lo) = self.locate(offset);
        let (head, tail) = self.lines[li].split_at(lo);
        let mut left: Vec<Line> = self.lines[..li].to_vec();
        left.push(head);
        let mut right = vec![tail];
        right.extend_from_slice(&self.lines[li + 1..]);
        (left, right)
    }

    // === Formatting over flattened ranges ===

    /// Apply or clear a format over a flattened char range.
    pub fn set_format(&mut self, range: Range<usize>, fmt: Format, on: bool) {
        self.for_line_ranges(range, |line, r| line.set_format(r, fmt, on));
    }

    /// Whether the format is active over the whole flattened range.
    pub fn format_active(&self, range: Range<usize>, fmt: Format) -> bool {
        if range.start >= range.end {
            return false;
        }
        let (sl, so) = self.locate(range.start);
        let (el, eo) = self.locate(range.end);
        for li in sl..=el {
            let len = self.lines[li].char_len();
            let start = if li == sl { so } else { 0 };
            let end = if li == el { eo } else { len };
            if start < end && !self.lines[li].format_active(start..end, fmt) {
                return false;
            }
        }
        true
    }

    /// Intersection of formats over the flattened range.
    pub fn formats_in(&self, range: Range<usize>) -> FormatSet {
        let (sl, so) = self.locate(range.start);
        let (el, eo) = self.locate(range.end);
        let mut acc = FormatSet::all();
        let mut covered = false;
        for li in sl..=el {
            let len = self.lines[li].char_len();
            let start = if li == sl { so } else { 0 };
            let end = if li == el { eo } else { len };
            if start < end {
                acc = acc.intersection(self.lines[li].formats_in(start..end));
                covered = true;
            }
        }
        if covered { acc } else { FormatSet::EMPTY }
    }

    /// Set or clear a link over a flattened range.
    pub fn set_link(&mut self, range: Range<usize>, link: Option<&str>) {
        self.for_line_ranges(range, |line, r| line.set_link(r, link));
    }

    /// Link at a flattened offset.
    pub fn link_at(&self, offset: usize) -> Option<SmolStr> {
        let (li, lo) = self.locate(offset);
        self.lines.get(li).and_then(|l| l.link_at(lo))
    }

    /// Insert a pre-built span at a flattened offset.
    pub fn insert_span(&mut self, offset: usize, span: Span) {
        if self.lines.is_empty() {
            self.lines.push(Line::empty());
        }
        let (li, lo) = self.locate(offset);
        self.lines[li].insert_span(lo, span);
    }

    fn for_line_ranges(&mut self, range: Range<usize>, mut f: impl FnMut(&mut Line, Range<usize>)) {
        if range.start >= range.end {
            return;
        }
        let (sl, so) = self.locate(range.start);
        let (el, eo) = self.locate(range.end);
        for li in sl..=el {
            let len = self.lines[li].char_len();
            let start = if li == sl { so } else { 0 };
            let end = if li == el { eo } else { len };
            if start < end {
                f(&mut self.lines[li], start..end);
            }
        }
    }

    // === Table accessors ===

    pub fn row_count(&self) -> usize {
        self.children.len()
    }

    pub fn col_count(&self) -> usize {
        self.children.first().map_or(0, |row| row.children.len())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Block> {
        self.children.get(row).and_then(|r| r.children.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Block> {
        self.children.get_mut(row).and_then(|r| r.children.get_mut(col))
    }

    // === Metadata ===

    pub fn meta_get(&self, key: &str) -> Option<&SmolStr> {
        self.meta.get(key)
    }

    /// Set or remove a metadata entry, returning the previous value.
    pub fn set_meta(&mut self, key: &str, value: Option<SmolStr>) -> Option<SmolStr> {
        match value {
            Some(v) => self.meta.insert(SmolStr::new(key), v),
            None => self.meta.remove(key),
        }
    }

    /// Number of header rows (tables), defaulting to 1.
    pub fn header_rows(&self) -> usize {
        self.meta_get(meta::HEADERS)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }

    /// Column width percentages, defaulting to an even split.
    pub fn col_widths(&self) -> Vec<u32> {
        let cols = self.col_count();
        let parsed: Option<Vec<u32>> = self
            .meta_get(meta::COLWIDTHS)
            .map(|v| v.split(',').filter_map(|w| w.trim().parse().ok()).collect());
        match parsed {
            Some(widths) if widths.len() == cols => widths,
            _ => even_widths(cols),
        }
    }

    /// Per-column alignments, defaulting to left.
    pub fn alignments(&self) -> Vec<ColAlign> {
        let cols = self.col_count();
        let mut out: Vec<ColAlign> = self
            .meta_get(meta::ALIGN)
            .map(|v| v.split(',').map(ColAlign::parse).collect())
            .unwrap_or_default();
        out.resize(cols, ColAlign::Left);
        out
    }

    pub fn caption(&self) -> Option<&str> {
        self.meta_get(meta::CAPTION).map(|s| s.as_str())
    }
}

/// Join integers into the comma-separated metadata form.
pub fn join_nums(nums: &[u32]) -> SmolStr {
    let mut out = String::new();
    for (i, n) in nums.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format_smolstr!("{n}"));
    }
    SmolStr::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_content() {
        let block = Block::from_lines(
            BlockKind::Paragraph,
            vec![Line::plain("ab"), Line::plain("cd")],
        );
        assert_eq!(block.content(), "ab\ncd");
        assert_eq!(block.char_len(), 5);
        assert_eq!(block.locate(0), (0, 0));
        assert_eq!(block.locate(2), (0, 2));
        assert_eq!(block.locate(3), (1, 0));
        assert_eq!(block.locate(5), (1, 2));
        assert_eq!(block.locate(99), (1, 2));
    }

    #[test]
    fn test_insert_text_plain() {
        let mut block = Block::with_text(BlockKind::Paragraph, "held");
        block.insert_text(3, "lo worl");
        assert_eq!(block.content(), "hello world");
    }

    #[test]
    fn test_insert_text_with_newlines() {
        let mut block = Block::with_text(BlockKind::Paragraph, "ad");
        block.insert_text(1, "b\nc");
        assert_eq!(block.content(), "ab\ncd");
        assert_eq!(block.lines.len(), 2);
    }

    #[test]
    fn test_delete_range_across_lines() {
        let mut block = Block::from_lines(
            BlockKind::Paragraph,
            vec![Line::plain("abc"), Line::plain("def")],
        );
        // Delete "c\nd" (offsets 2..5).
        block.delete_range(2..5);
        assert_eq!(block.content(), "abef");
        assert_eq!(block.lines.len(), 1);
    }

    #[test]
    fn test_split_lines_at() {
        let block = Block::from_lines(
            BlockKind::Paragraph,
            vec![Line::plain("abc"), Line::plain("def")],
        );
        let (left, right) = block.split_lines_at(2);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].text(), "ab");
        assert_eq!(right.len(), 2);
        assert_eq!(right[0].text(), "c");
        assert_eq!(right[1].text(), "def");
    }

    #[test]
    fn test_format_over_lines() {
        let mut block = Block::from_lines(
            BlockKind::Paragraph,
            vec![Line::plain("abc"), Line::plain("def")],
        );
        block.set_format(1..5, Format::Bold, true);
        assert!(block.format_active(1..5, Format::Bold));
        assert!(!block.format_active(0..5, Format::Bold));
        assert!(block.formats_in(1..5).contains(Format::Bold));
    }

    #[test]
    fn test_table_construction() {
        let table = Block::table(2, 2);
        assert_eq!(table.kind, BlockKind::Table);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.col_count(), 2);
        for row in &table.children {
            assert_eq!(row.kind, BlockKind::TableRow);
            assert_eq!(row.children.len(), 2);
            for cell in &row.children {
                assert_eq!(cell.kind, BlockKind::TableCell);
            }
        }
        assert_eq!(table.meta_get(meta::COLWIDTHS).unwrap(), "50,50");
        assert_eq!(table.header_rows(), 1);
        assert_eq!(table.alignments(), vec![ColAlign::Left, ColAlign::Left]);
    }

    #[test]
    fn test_col_widths_default_and_parse() {
        let mut table = Block::table(2, 4);
        assert_eq!(table.col_widths(), vec![25, 25, 25, 25]);
        table.set_meta(meta::COLWIDTHS, Some(SmolStr::new("40,20,20,20")));
        assert_eq!(table.col_widths(), vec![40, 20, 20, 20]);
        // Stale metadata (wrong arity) falls back to an even split.
        table.set_meta(meta::COLWIDTHS, Some(SmolStr::new("50,50")));
        assert_eq!(table.col_widths(), vec![25, 25, 25, 25]);
    }

    #[test]
    fn test_set_meta_returns_old() {
        let mut block = Block::table(1, 1);
        let old = block.set_meta(meta::CAPTION, Some(SmolStr::new("fig 1")));
        assert_eq!(old, None);
        let old = block.set_meta(meta::CAPTION, None);
        assert_eq!(old, Some(SmolStr::new("fig 1")));
        assert_eq!(block.caption(), None);
    }

    #[test]
    fn test_even_widths() {
        assert_eq!(even_widths(2), vec![50, 50]);
        assert_eq!(even_widths(3), vec![33, 33, 33]);
        assert_eq!(even_widths(0), Vec::<u32>::new());
    }
}
