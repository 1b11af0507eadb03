//! Chopro tokenizer — turns chopro text into a lazy stream of [`Token`]s.
//!
//! One input line is read and classified per call to `next()`, so arbitrarily
//! long songbooks never sit in memory as a whole.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Segments, Token};

static STATEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\{([a-z_]+)(:? *(.*))?\}\s*").expect("statement regex is valid")
});

static CHORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").expect("chord regex is valid"));

static CODING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)-\*- +(?:en)?coding: ([a-z0-9_-]+) +-\*-").expect("coding regex is valid")
});

/// Text encoding of a chopro file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    /// Look up an encoding by the name used in a coding mark.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "utf_8" => Some(Encoding::Utf8),
            "latin-1" | "latin1" | "latin_1" | "iso-8859-1" | "iso8859-1" | "iso_8859_1" => {
                Some(Encoding::Latin1)
            }
            _ => None,
        }
    }
}

/// Opens chopro sources and hands out token streams.
#[derive(Debug, Clone)]
pub struct ChoproParser {
    default_encoding: Encoding,
}

impl Default for ChoproParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoproParser {
    pub fn new() -> Self {
        Self {
            default_encoding: Encoding::Utf8,
        }
    }

    /// Encoding assumed when a file carries no coding mark.
    pub fn with_default_encoding(mut self, encoding: Encoding) -> Self {
        self.default_encoding = encoding;
        self
    }

    /// Open a chopro file from disk.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<Tokens<BufReader<File>>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.from_reader(BufReader::new(file), path.display().to_string())
    }

    /// Tokenize any buffered reader. `name` is used in diagnostics.
    pub fn from_reader<R: BufRead>(&self, reader: R, name: impl Into<String>) -> Result<Tokens<R>> {
        let mut tokens = Tokens {
            reader,
            name: name.into(),
            encoding: self.default_encoding,
            pending: VecDeque::new(),
            line_no: 0,
            tab_mode: false,
            done: false,
        };

        // The coding mark may only appear in the first two lines.
        for _ in 0..2 {
            match tokens.read_raw()? {
                Some(raw) => tokens.pending.push_back(raw),
                None => break,
            }
        }
        let head: Vec<u8> = tokens.pending.iter().flatten().copied().collect();
        let head = String::from_utf8_lossy(&head);
        if let Some(name) = CODING_RE.captures(&head).and_then(|c| c.get(1)) {
            tokens.encoding = Encoding::from_name(name.as_str()).ok_or_else(|| Error::Encoding {
                file: tokens.name.clone(),
                encoding: name.as_str().to_string(),
            })?;
        }

        Ok(tokens)
    }

    /// Tokenize a string held in memory.
    pub fn parse_str<'a>(&self, text: &'a str, name: &str) -> Result<Tokens<&'a [u8]>> {
        self.from_reader(text.as_bytes(), name)
    }
}

/// Lazy, single-pass token stream over one chopro source.
pub struct Tokens<R> {
    reader: R,
    name: String,
    encoding: Encoding,
    pending: VecDeque<Vec<u8>>,
    line_no: usize,
    tab_mode: bool,
    done: bool,
}

impl<R: BufRead> Tokens<R> {
    /// Name of the source, as given when it was opened.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn read_raw(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf).map_err(|source| Error::Io {
            path: self.name.clone().into(),
            source,
        })?;
        Ok(if n == 0 { None } else { Some(buf) })
    }

    fn next_raw(&mut self) -> Result<Option<Vec<u8>>> {
        match self.pending.pop_front() {
            Some(raw) => Ok(Some(raw)),
            None => self.read_raw(),
        }
    }

    fn decode(&self, raw: Vec<u8>) -> Result<String> {
        let mut text = match self.encoding {
            Encoding::Utf8 => String::from_utf8(raw).map_err(|e| Error::Parse {
                file: self.name.clone(),
                line: self.line_no,
                message: format!("invalid UTF-8: {e}"),
            })?,
            Encoding::Latin1 => raw.into_iter().map(char::from).collect(),
        };
        if self.line_no == 1 && text.starts_with('\u{feff}') {
            text.remove(0);
        }
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        Ok(text)
    }

    fn tokenize(&mut self, line: &str) -> Result<Option<Token>> {
        if let Some(caps) = STATEMENT_RE.captures(line) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let arg = caps.get(3).map_or("", |m| m.as_str().trim_end());
            return self.statement(name, arg);
        }

        if line.is_empty() {
            return Ok(Some(Token::Blank));
        }

        let stripped = line.trim_start();
        if let Some(rest) = stripped.strip_prefix('#') {
            return Ok(Some(Token::SourceComment(rest.trim_start().to_string())));
        }

        if self.tab_mode {
            return Ok(Some(Token::TabLine(line.to_string())));
        }

        Ok(Some(Token::Line(split_chords(line))))
    }

    fn statement(&mut self, name: &str, arg: &str) -> Result<Option<Token>> {
        let name = name.to_ascii_lowercase();
        let canonical = match name.as_str() {
            "t" => "title",
            "st" => "subtitle",
            "c" | "ci" => "comment",
            "soc" => "start_of_chorus",
            "eoc" => "end_of_chorus",
            "sot" => "start_of_tab",
            "eot" => "end_of_tab",
            "col" | "cols" => "columns",
            "colb" => "column_break",
            "np" => "new_page",
            "ng" => "no_grid",
            other => other,
        };

        let token = match canonical {
            "title" => Token::Title(arg.to_string()),
            "subtitle" => Token::SubTitle(arg.to_string()),
            "comment" => Token::Comment(arg.to_string()),
            "columns" => Token::Columns(self.int_arg(canonical, arg)?),
            "define" => {
                let mut words = arg.split_whitespace().map(String::from);
                let name = words.next().unwrap_or_default();
                Token::ChordDefine {
                    name,
                    spec: words.collect(),
                }
            }
            "start_of_tab" => {
                self.no_arg(canonical, arg);
                if self.tab_mode {
                    warn!("{}:{}: ignoring unmatched start_of_tab", self.name, self.line_no);
                    return Ok(None);
                }
                self.tab_mode = true;
                Token::StartOfTab
            }
            "end_of_tab" => {
                self.no_arg(canonical, arg);
                if !self.tab_mode {
                    warn!("{}:{}: ignoring unmatched end_of_tab", self.name, self.line_no);
                    return Ok(None);
                }
                self.tab_mode = false;
                Token::EndOfTab
            }
            "start_of_chorus" | "end_of_chorus" | "column_break" | "new_page" | "new_song"
            | "no_grid" => {
                self.no_arg(canonical, arg);
                match canonical {
                    "start_of_chorus" => Token::StartOfChorus,
                    "end_of_chorus" => Token::EndOfChorus,
                    "column_break" => Token::ColumnBreak,
                    "new_page" => Token::NewPage,
                    "new_song" => Token::NewSong,
                    _ => Token::NoGrid,
                }
            }
            _ => {
                warn!(
                    "{}:{}: unknown statement '{}' (arg: {:?})",
                    self.name, self.line_no, name, arg
                );
                return Ok(None);
            }
        };
        Ok(Some(token))
    }

    fn no_arg(&self, statement: &str, arg: &str) {
        if !arg.is_empty() {
            warn!(
                "{}:{}: statement {} expects no arg, got '{}'",
                self.name, self.line_no, statement, arg
            );
        }
    }

    fn int_arg(&self, statement: &str, arg: &str) -> Result<i32> {
        arg.trim().parse::<i32>().map_err(|_| Error::Parse {
            file: self.name.clone(),
            line: self.line_no,
            message: format!("statement {statement} expects an integer, got '{arg}'"),
        })
    }
}

impl<R: BufRead> Iterator for Tokens<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let raw = match self.next_raw() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            self.line_no += 1;

            let result = self.decode(raw).and_then(|line| self.tokenize(&line));
            match result {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Split a lyrics line on `[chord]` brackets into alternating segments.
pub fn split_chords(line: &str) -> Segments {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in CHORD_RE.captures_iter(line) {
        let (Some(whole), Some(chord)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        parts.push(line[last..whole.start()].to_string());
        parts.push(chord.as_str().to_string());
        last = whole.end();
    }
    parts.push(line[last..].to_string());
    Segments::new(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(text: &str) -> Vec<Token> {
        ChoproParser::new()
            .parse_str(text, "test.chopro")
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn title_and_chord_line() {
        let toks = tokens("{title: Test}\n[C]Hello [G]world\n");
        assert_eq!(
            toks,
            vec![
                Token::Title("Test".into()),
                Token::Line(["", "C", "Hello ", "G", "world"].into_iter().collect()),
            ]
        );
    }

    #[test]
    fn aliases_and_blank_lines() {
        let toks = tokens("{soc}\n\n{eoc}\n{c: note}\n{np}\n{ng}\n");
        assert_eq!(
            toks,
            vec![
                Token::StartOfChorus,
                Token::Blank,
                Token::EndOfChorus,
                Token::Comment("note".into()),
                Token::NewPage,
                Token::NoGrid,
            ]
        );
    }

    #[test]
    fn tab_mode_produces_tab_lines() {
        let toks = tokens("{sot}\ne|---0---|\n{eot}\n{eot}\nplain\n");
        assert_eq!(
            toks,
            vec![
                Token::StartOfTab,
                Token::TabLine("e|---0---|".into()),
                Token::EndOfTab,
                Token::Line(["plain"].into_iter().collect()),
            ]
        );
    }

    #[test]
    fn define_splits_words() {
        let toks = tokens("{define: Am7 base-fret 1 frets x 0 2 0 1 0}\n");
        assert_eq!(
            toks,
            vec![Token::ChordDefine {
                name: "Am7".into(),
                spec: "base-fret 1 frets x 0 2 0 1 0"
                    .split_whitespace()
                    .map(String::from)
                    .collect(),
            }]
        );
    }

    #[test]
    fn source_comments_and_unknown_statements() {
        let toks = tokens("  # a note\n{bogus: 1}\n");
        assert_eq!(toks, vec![Token::SourceComment("a note".into())]);
    }

    #[test]
    fn bad_columns_is_fatal() {
        let result: Result<Vec<Token>> = ChoproParser::new()
            .parse_str("{title: x}\n{columns: two}\n", "bad.chopro")
            .unwrap()
            .collect();
        match result {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn latin1_coding_mark() {
        let bytes: &[u8] = b"# -*- coding: latin-1 -*-\n{title: Caf\xe9}\n";
        let toks: Vec<Token> = ChoproParser::new()
            .from_reader(bytes, "latin.chopro")
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(toks[1], Token::Title("Café".into()));
    }

    #[test]
    fn default_encoding_without_a_mark() {
        let parser = ChoproParser::new().with_default_encoding(Encoding::Latin1);
        let mut toks = parser.from_reader(&b"{title: Caf\xe9}\n"[..], "cafe.chopro").unwrap();
        assert_eq!(toks.name(), "cafe.chopro");
        assert_eq!(toks.encoding(), Encoding::Latin1);
        assert_eq!(toks.next().unwrap().unwrap(), Token::Title("Café".into()));
    }

    #[test]
    fn unknown_coding_mark_is_rejected() {
        let bytes: &[u8] = b"# -*- coding: klingon -*-\n";
        assert!(matches!(
            ChoproParser::new().from_reader(bytes, "k.chopro"),
            Err(Error::Encoding { .. })
        ));
    }
}
