use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::{Georeference, Vertex};

/// Whitespace-separated token stream with line tracking for error reports.
pub(crate) struct Tokens<'a> {
    items: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let items = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |tok| (i + 1, tok)))
            .collect();
        Self { items, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.items.len() - self.pos
    }

    pub(crate) fn next_raw(&mut self) -> Option<&'a str> {
        let tok = self.items.get(self.pos).map(|(_, tok)| *tok);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn next<T: FromStr>(&mut self, what: &'static str) -> Result<T> {
        let (line, tok) = *self.items.get(self.pos).ok_or(Error::UnexpectedEof(what))?;
        self.pos += 1;
        tok.parse().map_err(|_| Error::Parse {
            line,
            token: tok.to_string(),
        })
    }

    /// Reads one absolute-millimeter "x y" pair and maps it to pixel space.
    pub(crate) fn next_vertex(&mut self, georef: &Georeference, what: &'static str) -> Result<Vertex> {
        let x: i64 = self.next(what)?;
        let y: i64 = self.next(what)?;
        georef.to_pixel(x, y)
    }
}

pub(crate) fn write_vertex(out: &mut String, georef: &Georeference, v: Vertex) {
    use std::fmt::Write;
    let (x, y) = georef.to_absolute(v);
    // Writing into a String cannot fail
    let _ = writeln!(out, "{} {}", x, y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_line_of_bad_token() {
        let mut t = Tokens::new("3\n12 abc\n");
        assert_eq!(t.next::<usize>("count").unwrap(), 3);
        assert_eq!(t.next::<i64>("x").unwrap(), 12);
        match t.next::<i64>("y") {
            Err(Error::Parse { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn eof_is_reported() {
        let mut t = Tokens::new("  \n");
        assert_eq!(t.remaining(), 0);
        assert!(matches!(t.next::<i64>("count"), Err(Error::UnexpectedEof("count"))));
        assert_eq!(t.next_raw(), None);
    }
}
