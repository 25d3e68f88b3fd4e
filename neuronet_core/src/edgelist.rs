//! Line-oriented `origin destination` edge-list reader.

use anyhow::{Context, Result};
use std::io::BufRead;

use crate::id_map::NodeId;

/// Pairs read from a text source, plus the number of lines that were not
/// blank, not comments, and still failed to parse.
#[derive(Debug, Default)]
pub struct EdgeList {
    pub pairs: Vec<(NodeId, NodeId)>,
    pub skipped: usize,
}

/// Outcome of a single line.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Edge(NodeId, NodeId),
    /// Empty line or `#` comment.
    Ignored,
    Malformed,
}

/// Parses one line. Only the first two whitespace separated tokens are
/// read; anything after them is ignored.
pub fn parse_line(line: &str) -> Line {
    if line.is_empty() || line.starts_with('#') {
        return Line::Ignored;
    }

    let mut tokens = line.split_whitespace();
    let origin = tokens.next().map(str::parse::<NodeId>);
    let destination = tokens.next().map(str::parse::<NodeId>);

    match (origin, destination) {
        (Some(Ok(origin)), Some(Ok(destination))) => Line::Edge(origin, destination),
        // Whitespace-only lines read like empty ones.
        (None, _) => Line::Ignored,
        _ => Line::Malformed,
    }
}

/// Reads every edge from `reader`. Malformed lines are counted and skipped;
/// only an I/O error while reading fails.
pub fn read_pairs<R: BufRead>(reader: R) -> Result<EdgeList> {
    let mut list = EdgeList::default();

    for (line_no, raw) in reader.split(b'\n').enumerate() {
        let raw = raw.with_context(|| format!("failed reading edge list at line {}", line_no + 1))?;
        let line = String::from_utf8_lossy(&raw);
        match parse_line(line.trim_end_matches('\r')) {
            Line::Edge(origin, destination) => list.pairs.push((origin, destination)),
            Line::Ignored => {}
            Line::Malformed => list.skipped += 1,
        }
    }

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    #[test]
    fn test_parse_edge() {
        assert_eq!(parse_line("1 2"), Line::Edge(1, 2));
        assert_eq!(parse_line("  -4\t17  "), Line::Edge(-4, 17));
        assert_eq!(parse_line("1 2 3"), Line::Edge(1, 2));
    }

    #[test]
    fn test_parse_ignored() {
        assert_eq!(parse_line(""), Line::Ignored);
        assert_eq!(parse_line("# FromNodeId ToNodeId"), Line::Ignored);
        assert_eq!(parse_line("   "), Line::Ignored);
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_line("1"), Line::Malformed);
        assert_eq!(parse_line("a b"), Line::Malformed);
        assert_eq!(parse_line("1 x"), Line::Malformed);
        assert_eq!(parse_line("99999999999999999999 1"), Line::Malformed);
    }

    #[test]
    fn test_read_pairs() {
        let input = "# comment\n1 2\n\n2 3\r\nbad line\n3 1";
        let list = read_pairs(Cursor::new(input)).unwrap();
        assert_eq!(list.pairs, vec![(1, 2), (2, 3), (3, 1)]);
        assert_eq!(list.skipped, 1);
    }

    #[test]
    fn test_read_empty() {
        let list = read_pairs(Cursor::new("")).unwrap();
        assert!(list.pairs.is_empty());
        assert_eq!(list.skipped, 0);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk gone"))
        }
    }

    #[test]
    fn test_read_error_is_reported() {
        let result = read_pairs(io::BufReader::new(FailingReader));
        assert!(result.is_err());
    }
}
