//! Source cursors and indentation tracking
//!
//! A [`Cursor`] is an immutable snapshot of "the parser is at this character of
//! the source", together with the indentation state of the line being read.
//!
//! Cursors of one source form a single chain that only ever grows forward from
//! index 0. The successor of a cursor is materialized the first time it is asked
//! for and cached, so every later walk over the same stretch of source is free.
//! Because the chain is shared, a cursor is a cheap handle (`Clone` is two words).
//!
//! ## Zero-width characters
//!
//! Form-feed (`\f`) and carriage-return (`\r`) never become the character of a
//! cursor. They are stepped over while reading, so they do not advance the logical
//! index or the column, but [`Cursor::to`] still returns them as part of the
//! literal source text. Leading ones belong to spans that start at the origin.
//!
//! ## Indentation
//!
//! While the leading whitespace of a line is read, every space or tab extends the
//! line's list of indent levels, comparing it against the levels of the previous
//! line:
//!
//! - past the previous line's depth, characters accumulate into the last level;
//! - inside a level, a character matching the previous line's continues it;
//! - at a level boundary, a new level is opened;
//! - any disagreement marks the line as no longer aligned with the previous one,
//!   opens a new level, and from then on characters simply accumulate.
//!
//! The first non-whitespace character freezes the line's levels.

use crate::astra::diagnostics::{DiagnosticSink, LogSink};
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::location::Location;
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

const READ_INDENTS: [&str; 3] = ["CURSOR", "READ", "INDENTS"];

/// One finished line's indent levels, linked to the lines before it
#[derive(Debug, PartialEq, Eq)]
pub struct LineIndents {
    levels: Vec<String>,
    earlier: Option<Rc<LineIndents>>,
}

impl LineIndents {
    pub fn levels(&self) -> &[String] {
        &self.levels
    }
}

/// Indentation state attached to every cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indents {
    current: Vec<String>,
    previous: Option<Rc<LineIndents>>,
    is_reading: bool,
    aligns_with_previous: bool,
}

impl Indents {
    fn origin(first: Option<char>) -> Self {
        let mut indents = Indents {
            current: Vec::new(),
            previous: None,
            is_reading: true,
            aligns_with_previous: true,
        };
        match first {
            Some(indent @ (' ' | '\t')) => indents.current.push(indent.to_string()),
            Some('\n') | None => {}
            Some(_) => indents.is_reading = false,
        }
        indents
    }

    /// Indent levels of the line being read, outermost first
    pub fn current(&self) -> &[String] {
        &self.current
    }

    /// Indent levels of the previous line (empty on the first line)
    pub fn previous(&self) -> &[String] {
        self.previous
            .as_deref()
            .map(LineIndents::levels)
            .unwrap_or(&[])
    }

    /// Levels of every earlier line, most recent first
    pub fn history(&self) -> impl Iterator<Item = &[String]> {
        std::iter::successors(self.previous.as_deref(), |line| line.earlier.as_deref())
            .map(LineIndents::levels)
    }

    pub fn depth(&self) -> usize {
        self.current.len()
    }

    pub fn previous_depth(&self) -> usize {
        self.previous().len()
    }

    /// Still consuming the leading whitespace of the line
    pub fn is_reading(&self) -> bool {
        self.is_reading
    }

    pub fn aligns_with_previous(&self) -> bool {
        self.aligns_with_previous
    }

    fn begin_line(&self) -> Indents {
        Indents {
            current: Vec::new(),
            previous: Some(Rc::new(LineIndents {
                levels: self.current.clone(),
                earlier: self.previous.clone(),
            })),
            is_reading: true,
            aligns_with_previous: true,
        }
    }

    fn finish_reading(&self) -> Indents {
        Indents {
            is_reading: false,
            ..self.clone()
        }
    }

    fn read(&self, indent: char, line: usize, sink: &dyn DiagnosticSink) -> Result<Indents, Defect> {
        let mut next = self.clone();
        if !next.aligns_with_previous {
            next.append(indent, line, sink);
            return Ok(next);
        }

        let previous = self.previous();
        let depth = next.current.len();
        if depth == 0 {
            match previous.first() {
                Some(level) if !level.starts_with(indent) => next.mismatch(indent, line, sink),
                _ => next.open(indent, line, sink),
            }
            return Ok(next);
        }

        let Some(matching) = previous.get(depth - 1) else {
            // deeper than the previous line
            next.append(indent, line, sink);
            return Ok(next);
        };

        let read = next.current[depth - 1].len();
        match read.cmp(&matching.len()) {
            std::cmp::Ordering::Greater => {
                return Err(Defect::IndentationOverrun {
                    line,
                    level: depth - 1,
                })
            }
            std::cmp::Ordering::Less => {
                if matching[read..].starts_with(indent) {
                    next.append(indent, line, sink);
                } else {
                    next.mismatch(indent, line, sink);
                }
            }
            std::cmp::Ordering::Equal => match previous.get(depth) {
                Some(following) if !following.starts_with(indent) => {
                    next.mismatch(indent, line, sink)
                }
                _ => next.open(indent, line, sink),
            },
        }

        Ok(next)
    }

    fn open(&mut self, indent: char, line: usize, sink: &dyn DiagnosticSink) {
        self.current.push(indent.to_string());
        if sink.is_enabled() {
            sink.record(
                &READ_INDENTS,
                format_args!("line {line}: open level {} with {indent:?}", self.current.len()),
            );
        }
    }

    fn append(&mut self, indent: char, line: usize, sink: &dyn DiagnosticSink) {
        let depth = self.current.len();
        match self.current.last_mut() {
            Some(level) => {
                level.push(indent);
                if sink.is_enabled() {
                    sink.record(
                        &READ_INDENTS,
                        format_args!("line {line}: level {depth} is now {level:?}"),
                    );
                }
            }
            None => self.open(indent, line, sink),
        }
    }

    fn mismatch(&mut self, indent: char, line: usize, sink: &dyn DiagnosticSink) {
        if sink.is_enabled() {
            sink.record(
                &READ_INDENTS,
                format_args!(
                    "line {line}: {indent:?} breaks alignment at level {}",
                    self.current.len()
                ),
            );
        }
        self.aligns_with_previous = false;
        self.open(indent, line, sink);
    }
}

#[derive(Debug, Clone)]
struct Node {
    location: Location,
    byte: usize,
    char: Option<char>,
    indents: Rc<Indents>,
}

struct Chain {
    source: Rc<str>,
    nodes: RefCell<Vec<Node>>,
    reads: Cell<usize>,
    sink: Rc<dyn DiagnosticSink>,
}

fn is_zero_width(c: char) -> bool {
    c == '\r' || c == '\x0c'
}

fn skip_zero_width(source: &str, mut byte: usize) -> usize {
    while source[byte..].starts_with(is_zero_width) {
        byte += 1;
    }
    byte
}

impl Chain {
    fn read_after(&self, previous: &Node, char: char) -> Result<Node, Defect> {
        let byte = skip_zero_width(&self.source, previous.byte + char.len_utf8());
        let next_char = self.source[byte..].chars().next();
        let location = previous.location;
        let (line, column, indents) = if char == '\n' {
            (location.line + 1, 0, Rc::new(previous.indents.begin_line()))
        } else {
            (location.line, location.column + 1, previous.indents.clone())
        };

        let indents = match next_char {
            Some(indent @ (' ' | '\t')) if indents.is_reading => {
                Rc::new(indents.read(indent, line, self.sink.as_ref())?)
            }
            Some('\n') | None => indents,
            Some(_) if indents.is_reading => Rc::new(indents.finish_reading()),
            Some(_) => indents,
        };

        self.reads.set(self.reads.get() + 1);
        Ok(Node {
            location: Location::new(location.index + 1, line, column),
            byte,
            char: next_char,
            indents,
        })
    }
}

/// An immutable read position in a source
#[derive(Clone)]
pub struct Cursor {
    chain: Rc<Chain>,
    position: usize,
}

impl Cursor {
    /// The first cursor of a new chain over `source`
    pub fn origin(source: impl Into<Rc<str>>) -> Self {
        Cursor::origin_with(source, Rc::new(LogSink))
    }

    /// Like [`Cursor::origin`], reporting indentation events to `sink`
    pub fn origin_with(source: impl Into<Rc<str>>, sink: Rc<dyn DiagnosticSink>) -> Self {
        let source: Rc<str> = source.into();
        let byte = skip_zero_width(&source, 0);
        let char = source[byte..].chars().next();
        let node = Node {
            location: Location::default(),
            byte,
            char,
            indents: Rc::new(Indents::origin(char)),
        };
        Cursor {
            chain: Rc::new(Chain {
                source,
                nodes: RefCell::new(vec![node]),
                reads: Cell::new(0),
                sink,
            }),
            position: 0,
        }
    }

    fn node(&self) -> Node {
        self.chain.nodes.borrow()[self.position].clone()
    }

    fn sibling(&self, position: usize) -> Cursor {
        Cursor {
            chain: Rc::clone(&self.chain),
            position,
        }
    }

    pub fn source(&self) -> &str {
        &self.chain.source
    }

    pub fn index(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> usize {
        self.chain.nodes.borrow()[self.position].location.line
    }

    pub fn column(&self) -> usize {
        self.chain.nodes.borrow()[self.position].location.column
    }

    pub fn location(&self) -> Location {
        self.chain.nodes.borrow()[self.position].location
    }

    /// The character under the cursor; `None` at the end of the source
    pub fn char(&self) -> Option<char> {
        self.chain.nodes.borrow()[self.position].char
    }

    pub fn indents(&self) -> Rc<Indents> {
        Rc::clone(&self.chain.nodes.borrow()[self.position].indents)
    }

    /// Byte offset of this cursor in the raw source
    pub fn byte_offset(&self) -> usize {
        self.chain.nodes.borrow()[self.position].byte
    }

    pub fn eof(&self) -> bool {
        self.char().is_none()
    }

    /// How many successors have been materialized on this cursor's chain
    pub fn materialized(&self) -> usize {
        self.chain.reads.get()
    }

    /// The following cursor, read and cached on first access
    ///
    /// `Ok(None)` only at the end of the source.
    pub fn next(&self) -> Result<Option<Cursor>, Defect> {
        let following = self.position + 1;
        if following < self.chain.nodes.borrow().len() {
            return Ok(Some(self.sibling(following)));
        }

        let node = self.node();
        let Some(char) = node.char else {
            return Ok(None);
        };

        let read = self.chain.read_after(&node, char)?;
        self.chain.nodes.borrow_mut().push(read);
        Ok(Some(self.sibling(following)))
    }

    /// The preceding cursor
    ///
    /// Every cursor but the origin has one; asking the origin is a defect.
    pub fn previous(&self) -> Result<Cursor, Defect> {
        match self.position {
            0 => Err(Defect::MissingPredecessor { index: 0 }),
            position => Ok(self.sibling(position - 1)),
        }
    }

    /// The cursor at an absolute logical index
    ///
    /// Walks forward one character at a time, materializing as it goes.
    pub fn at(&self, index: usize) -> Result<Cursor, Defect> {
        if index <= self.position {
            return Ok(self.sibling(index));
        }

        let mut cursor = self.clone();
        while cursor.position < index {
            cursor = match cursor.next()? {
                Some(next) => next,
                None => {
                    return Err(Defect::IndexOutOfRange {
                        index,
                        length: cursor.position,
                    })
                }
            };
        }
        Ok(cursor)
    }

    pub fn at_location(&self, location: &Location) -> Result<Cursor, Defect> {
        self.at(location.index)
    }

    /// The cursor `count` characters further on
    pub fn advance(&self, count: usize) -> Result<Cursor, Defect> {
        self.at(self.position + count)
    }

    /// The cursor just past `text`, which is expected to start here
    pub fn after(&self, text: &str) -> Result<Cursor, Defect> {
        let target = self.byte_offset() + text.len();
        let mut cursor = self.clone();
        while cursor.byte_offset() < target {
            cursor = match cursor.next()? {
                Some(next) => next,
                None => break,
            };
        }
        Ok(cursor)
    }

    /// The end-of-source cursor
    pub fn last(&self) -> Result<Cursor, Defect> {
        let mut cursor = self.clone();
        while let Some(next) = cursor.next()? {
            cursor = next;
        }
        Ok(cursor)
    }

    /// Literal source text between this cursor and `end`
    ///
    /// Zero-width characters in between are part of the returned text, and a
    /// span starting at the origin also covers any the source starts with.
    pub fn to(&self, end: usize) -> Result<&str, Defect> {
        let end = self.at(end)?;
        let (first, last) = if end.position < self.position {
            (&end, self)
        } else {
            (self, &end)
        };
        if first.position == last.position {
            return Ok("");
        }
        Ok(&self.chain.source[first.text_start()..last.byte_offset()])
    }

    fn text_start(&self) -> usize {
        match self.position {
            0 => 0,
            _ => self.byte_offset(),
        }
    }

    /// Lookahead of `count` raw characters (behind the cursor when negative)
    ///
    /// `None` when the source does not have that many characters left.
    pub fn peek(&self, count: isize) -> Option<&str> {
        let source: &str = &self.chain.source;
        let byte = self.byte_offset();
        if count >= 0 {
            let rest = &source[byte..];
            let count = count.unsigned_abs();
            if count == 0 {
                return Some("");
            }
            let mut ends = rest.char_indices().map(|(at, c)| at + c.len_utf8());
            ends.nth(count - 1).map(|end| &rest[..end])
        } else {
            let before = &source[..byte];
            let count = count.unsigned_abs();
            before
                .char_indices()
                .rev()
                .nth(count - 1)
                .map(|(start, _)| &before[start..])
        }
    }

    /// The text matched by `pattern` when it matches right at the cursor
    pub fn peek_pattern(&self, pattern: &Regex) -> Option<&str> {
        let rest = &self.chain.source[self.byte_offset()..];
        pattern
            .find(rest)
            .filter(|found| found.start() == 0)
            .map(|found| found.as_str())
    }

    /// Raw source text from the cursor to the end
    pub fn rest(&self) -> &str {
        &self.chain.source[self.byte_offset()..]
    }

    /// `literal` itself when the source continues with it
    pub fn peek_str(&self, literal: &str) -> Option<&str> {
        let byte = self.byte_offset();
        self.chain.source[byte..]
            .starts_with(literal)
            .then(|| &self.chain.source[byte..byte + literal.len()])
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.chain, &other.chain) && self.position == other.position
    }
}

impl Eq for Cursor {}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        f.debug_struct("Cursor")
            .field("index", &node.location.index)
            .field("line", &node.location.line)
            .field("column", &node.location.column)
            .field("char", &node.char)
            .field("indents", &node.indents.current)
            .finish()
    }
}

impl From<&Cursor> for Location {
    fn from(cursor: &Cursor) -> Self {
        cursor.location()
    }
}

impl From<Cursor> for Location {
    fn from(cursor: Cursor) -> Self {
        cursor.location()
    }
}

impl From<&str> for Cursor {
    fn from(source: &str) -> Self {
        Cursor::origin(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::diagnostics::NullSink;

    fn depth_at(source: &str, index: usize) -> (usize, usize) {
        let cursor = Cursor::origin(source).at(index).unwrap();
        let indents = cursor.indents();
        (indents.depth(), indents.previous_depth())
    }

    #[test]
    fn origin_starts_at_zero() {
        let cursor = Cursor::origin("abc");
        assert_eq!(cursor.location(), Location::new(0, 0, 0));
        assert_eq!(cursor.char(), Some('a'));
        assert!(!cursor.eof());
    }

    #[test]
    fn next_materializes_once() {
        let origin = Cursor::origin("ab");
        let first = origin.next().unwrap().unwrap();
        let again = origin.next().unwrap().unwrap();
        assert_eq!(first, again);
        assert_eq!(origin.materialized(), 1);
    }

    #[test]
    fn end_of_source_has_a_cursor() {
        let end = Cursor::origin("ab").last().unwrap();
        assert_eq!(end.index(), 2);
        assert!(end.eof());
        assert!(end.next().unwrap().is_none());
    }

    #[test]
    fn empty_source_is_immediately_at_eof() {
        let cursor = Cursor::origin("");
        assert!(cursor.eof());
        assert_eq!(cursor.to(0).unwrap(), "");
    }

    #[test]
    fn newline_starts_the_next_line() {
        let cursor = Cursor::origin("ab\ncd").at(3).unwrap();
        assert_eq!(cursor.char(), Some('c'));
        assert_eq!(cursor.line(), 1);
        assert_eq!(cursor.column(), 0);

        let newline = cursor.previous().unwrap();
        assert_eq!(newline.char(), Some('\n'));
        assert_eq!(newline.line(), 0);
        assert_eq!(newline.column(), 2);
    }

    #[test]
    fn origin_has_no_predecessor() {
        let error = Cursor::origin("a").previous().unwrap_err();
        assert_eq!(error, Defect::MissingPredecessor { index: 0 });
    }

    #[test]
    fn seeking_past_the_end_fails() {
        let error = Cursor::origin("abc").at(7).unwrap_err();
        assert_eq!(
            error,
            Defect::IndexOutOfRange {
                index: 7,
                length: 3
            }
        );
    }

    #[test]
    fn seeking_backwards_reuses_the_chain() {
        let origin = Cursor::origin("abcdef");
        let end = origin.at(5).unwrap();
        let reads = origin.materialized();
        let back = end.at(2).unwrap();
        assert_eq!(back.char(), Some('c'));
        assert_eq!(origin.materialized(), reads);
    }

    #[test]
    fn carriage_return_and_form_feed_are_zero_width() {
        let origin = Cursor::origin("a\r\nb\x0cc");
        let chars: Vec<_> = (0..4)
            .map(|index| origin.at(index).unwrap().char())
            .collect();
        assert_eq!(chars, vec![Some('a'), Some('\n'), Some('b'), Some('c')]);

        let b = origin.at(2).unwrap();
        assert_eq!(b.line(), 1);
        assert_eq!(b.column(), 0);
        assert_eq!(origin.at(3).unwrap().column(), 1);
    }

    #[test]
    fn to_keeps_zero_width_characters_in_the_text() {
        let origin = Cursor::origin("a\r\nb\x0cc");
        assert_eq!(origin.to(2).unwrap(), "a\r\n");
        assert_eq!(origin.at(2).unwrap().to(4).unwrap(), "b\x0cc");
    }

    #[test]
    fn leading_carriage_return_is_skipped_at_the_origin() {
        let origin = Cursor::origin("\rx");
        assert_eq!(origin.char(), Some('x'));
        assert_eq!(origin.byte_offset(), 1);
        assert_eq!(origin.to(1).unwrap(), "\rx");
        assert_eq!(origin.to(0).unwrap(), "");
    }

    #[test]
    fn spans_from_the_origin_keep_leading_zero_width_characters() {
        let origin = Cursor::origin("\r\x0cab");
        let end = origin.last().unwrap();
        assert_eq!(origin.to(end.index()).unwrap(), "\r\x0cab");
        assert_eq!(end.to(0).unwrap(), "\r\x0cab");
        assert_eq!(origin.at(1).unwrap().to(2).unwrap(), "b");
    }

    #[test]
    fn to_backwards_returns_the_same_span() {
        let cursor = Cursor::origin("hello").at(4).unwrap();
        assert_eq!(cursor.to(1).unwrap(), "ell");
    }

    #[test]
    fn to_past_the_end_fails() {
        assert!(Cursor::origin("abc").to(4).is_err());
    }

    #[test]
    fn peek_forward_and_backward() {
        let cursor = Cursor::origin("héllo").at(2).unwrap();
        assert_eq!(cursor.peek(2), Some("ll"));
        assert_eq!(cursor.peek(0), Some(""));
        assert_eq!(cursor.peek(-2), Some("hé"));
        assert_eq!(cursor.peek(4), None);
        assert_eq!(cursor.peek(-3), None);
    }

    #[test]
    fn peek_pattern_is_anchored() {
        let cursor = Cursor::origin("key: value");
        let word = Regex::new(r"[a-z]+").unwrap();
        assert_eq!(cursor.peek_pattern(&word), Some("key"));

        let colon = Regex::new(r":").unwrap();
        assert_eq!(cursor.peek_pattern(&colon), None);
        assert_eq!(cursor.at(3).unwrap().peek_pattern(&colon), Some(":"));
    }

    #[test]
    fn peek_str_matches_literals() {
        let cursor = Cursor::origin("key: value");
        assert_eq!(cursor.peek_str("key"), Some("key"));
        assert_eq!(cursor.peek_str("value"), None);
    }

    #[test]
    fn after_steps_over_the_text() {
        let cursor = Cursor::origin("ab\r\ncd");
        assert_eq!(cursor.after("ab\r").unwrap().char(), Some('\n'));
        assert_eq!(cursor.after("ab\r\n").unwrap().char(), Some('c'));
    }

    #[test]
    fn deeper_line_opens_a_level() {
        // "a\n\tb": the tab deepens line 1
        assert_eq!(depth_at("a\n\tb", 3), (1, 0));
    }

    #[test]
    fn repeated_indentation_past_the_previous_line_is_one_level() {
        assert_eq!(depth_at("a\n\t\tb", 4), (1, 0));
    }

    #[test]
    fn matching_indentation_keeps_the_depth() {
        assert_eq!(depth_at("\ta\n\tb", 4), (1, 1));
        assert!(Cursor::origin("\ta\n\tb")
            .at(4)
            .unwrap()
            .indents()
            .aligns_with_previous());
    }

    #[test]
    fn indenting_past_a_complete_level_opens_another() {
        assert_eq!(depth_at("\ta\n\t\tb", 5), (2, 1));
        assert_eq!(depth_at("  a\n    b", 8), (2, 1));
    }

    #[test]
    fn shallower_line_has_fewer_levels() {
        assert_eq!(depth_at("\ta\n\t\tb\n\tc", 8), (1, 2));
        assert_eq!(depth_at("\ta\nb", 3), (0, 1));
    }

    #[test]
    fn mismatched_characters_break_alignment() {
        let cursor = Cursor::origin("\ta\n  b").at(5).unwrap();
        let indents = cursor.indents();
        assert!(!indents.aligns_with_previous());
        assert_eq!(indents.current(), &["  ".to_string()]);
    }

    #[test]
    fn mismatch_inside_a_level_opens_a_new_one() {
        // previous level is two spaces, this line starts a space then a tab
        let cursor = Cursor::origin("  a\n \tb").at(6).unwrap();
        let indents = cursor.indents();
        assert!(!indents.aligns_with_previous());
        assert_eq!(indents.current(), &[" ".to_string(), "\t".to_string()]);
    }

    #[test]
    fn levels_freeze_at_the_first_visible_character() {
        let cursor = Cursor::origin("\ta b").at(3).unwrap();
        assert_eq!(cursor.char(), Some('b'));
        assert_eq!(cursor.indents().depth(), 1);
        assert!(!cursor.indents().is_reading());
    }

    #[test]
    fn history_keeps_every_line() {
        let cursor = Cursor::origin("a\n\tb\n\t\tc").last().unwrap();
        let history: Vec<usize> = cursor.indents().history().map(|line| line.len()).collect();
        assert_eq!(history, vec![1, 0]);
    }

    #[test]
    fn overrun_of_a_matched_level_is_a_defect() {
        let indents = Indents {
            current: vec!["\t\t".to_string()],
            previous: Some(Rc::new(LineIndents {
                levels: vec!["\t".to_string()],
                earlier: None,
            })),
            is_reading: true,
            aligns_with_previous: true,
        };
        assert_eq!(
            indents.read('\t', 4, &NullSink),
            Err(Defect::IndentationOverrun { line: 4, level: 0 })
        );
    }
}
