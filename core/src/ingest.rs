//! Ingestion adapters that turn a corpus file into documents.
//!
//! Every adapter implements [`DocumentSource`]; the index only sees the
//! resulting rows, so line-per-document text files and tabular lyric dumps
//! share one engine.

use crate::error::{IngestError, Result};
use crate::DocMeta;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_TEXT_FIELD: &str = "lyrics";
const ARTIST_FIELD: &str = "artist";
const TITLE_FIELD: &str = "title";

/// Raw text plus optional metadata for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub meta: Option<DocMeta>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), meta: None }
    }

    pub fn with_meta(text: impl Into<String>, meta: DocMeta) -> Self {
        Self { text: text.into(), meta: Some(meta) }
    }
}

/// One record read from a source. A malformed record still occupies a
/// document slot so identifiers stay aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Parsed(Document),
    Malformed { line: u64, reason: String },
}

/// Anything that can yield rows until exhausted.
pub trait DocumentSource {
    /// Next row, `Ok(None)` at end of input. An `Err` aborts the whole build.
    fn next_row(&mut self) -> Result<Option<Row>>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        (**self).next_row()
    }
}

/// Options applied to every parsed document before indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Drop the first whitespace-delimited word of each document's raw text,
    /// for corpora whose lines start with an identifier. Hyphens inside that
    /// word do not split it. Applies to both document frequency and term
    /// frequency.
    pub strip_leading_token: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Lines,
    Csv,
}

impl SourceFormat {
    /// `.csv` files are tabular, everything else is one document per line.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => SourceFormat::Csv,
            _ => SourceFormat::Lines,
        }
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lines" | "line" | "txt" => Ok(SourceFormat::Lines),
            "csv" => Ok(SourceFormat::Csv),
            other => Err(format!("unknown source format: {other}")),
        }
    }
}

/// One document per line; line `n` (0-based) becomes document `n`.
pub struct LineSource<R> {
    reader: R,
    line: u64,
    buf: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: 0, buf: Vec::new() }
    }
}

impl<R: BufRead> DocumentSource for LineSource<R> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        let row = match std::str::from_utf8(&self.buf) {
            Ok(text) => Row::Parsed(Document::new(text)),
            Err(e) => Row::Malformed { line: self.line, reason: e.to_string() },
        };
        Ok(Some(row))
    }
}

/// Tabular source with a header row. The text column is required;
/// `artist` and `title` columns, when present, become metadata.
pub struct CsvSource<R> {
    reader: csv::Reader<R>,
    text_idx: usize,
    artist_idx: Option<usize>,
    title_idx: Option<usize>,
    record: StringRecord,
}

impl<R: Read> CsvSource<R> {
    pub fn new(reader: R, text_field: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = reader.headers()?.clone();
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let text_idx = find(text_field)
            .ok_or_else(|| IngestError::MissingColumn { column: text_field.to_string() })?;
        let artist_idx = find(ARTIST_FIELD);
        let title_idx = find(TITLE_FIELD);

        Ok(Self { reader, text_idx, artist_idx, title_idx, record: StringRecord::new() })
    }

    fn meta(&self) -> Option<DocMeta> {
        if self.artist_idx.is_none() && self.title_idx.is_none() {
            return None;
        }
        let field = |idx: Option<usize>| {
            idx.and_then(|i| self.record.get(i)).map(|s| s.trim().to_string()).unwrap_or_default()
        };
        Some(DocMeta { artist: field(self.artist_idx), title: field(self.title_idx) })
    }
}

impl<R: Read> DocumentSource for CsvSource<R> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        // Line numbers come from the reader: quoted fields may span lines.
        match self.reader.read_record(&mut self.record) {
            Ok(false) => Ok(None),
            Ok(true) => match self.record.get(self.text_idx) {
                Some(text) => Ok(Some(Row::Parsed(Document { text: text.to_string(), meta: self.meta() }))),
                None => {
                    let line = self.record.position().map_or(0, |p| p.line());
                    Ok(Some(Row::Malformed { line, reason: "missing text field".into() }))
                }
            },
            Err(e) if e.is_io_error() => Err(e.into()),
            Err(e) => {
                let line = e.position().map_or_else(|| self.reader.position().line(), |p| p.line());
                Ok(Some(Row::Malformed { line, reason: e.to_string() }))
            }
        }
    }
}

/// Open a corpus file with the adapter for `format`.
pub fn open_source(path: &Path, format: SourceFormat, text_field: &str) -> Result<Box<dyn DocumentSource>> {
    let file = File::open(path)?;
    let source: Box<dyn DocumentSource> = match format {
        SourceFormat::Lines => Box::new(LineSource::new(BufReader::new(file))),
        SourceFormat::Csv => Box::new(CsvSource::new(BufReader::new(file), text_field)?),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain(mut source: impl DocumentSource) -> Vec<Row> {
        let mut rows = Vec::new();
        while let Some(row) = source.next_row().unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn lines_keep_blank_lines_as_documents() {
        let rows = drain(LineSource::new(Cursor::new("cat dog\n\nbird")));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], Row::Parsed(Document::new("\n")));
        assert_eq!(rows[2], Row::Parsed(Document::new("bird")));
    }

    #[test]
    fn invalid_utf8_line_is_malformed() {
        let bytes: &[u8] = b"ok\n\xff\xfe\nfine\n";
        let rows = drain(LineSource::new(Cursor::new(bytes)));
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[1], Row::Malformed { line: 2, .. }));
    }

    #[test]
    fn csv_reads_metadata() {
        let data = "Artist,Title,tag,lyrics\nABBA,Waterloo,pop,My my at Waterloo\n";
        let rows = drain(CsvSource::new(Cursor::new(data), DEFAULT_TEXT_FIELD).unwrap());
        let meta = DocMeta { artist: "ABBA".into(), title: "Waterloo".into() };
        assert_eq!(rows, vec![Row::Parsed(Document::with_meta("My my at Waterloo", meta))]);
    }

    #[test]
    fn csv_short_record_is_malformed() {
        let data = "artist,title,lyrics\na,b,c\nonly-one\nd,e,f\n";
        let rows = drain(CsvSource::new(Cursor::new(data), DEFAULT_TEXT_FIELD).unwrap());
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[1], Row::Malformed { line: 3, .. }));
        assert!(matches!(rows[2], Row::Parsed(_)));
    }

    #[test]
    fn csv_malformed_line_counts_physical_lines() {
        let data = "artist,title,lyrics\na,b,\"one\ntwo\nthree\"\nbroken\nd,e,f\n";
        let rows = drain(CsvSource::new(Cursor::new(data), DEFAULT_TEXT_FIELD).unwrap());
        assert_eq!(rows.len(), 3);
        match &rows[0] {
            Row::Parsed(doc) => assert_eq!(doc.text, "one\ntwo\nthree"),
            other => panic!("unexpected row {other:?}"),
        }
        assert!(matches!(rows[1], Row::Malformed { line: 5, .. }), "{:?}", rows[1]);
    }

    #[test]
    fn csv_without_text_column_fails() {
        let err = CsvSource::new(Cursor::new("artist,title\na,b\n"), "lyrics").err().unwrap();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }

    #[test]
    fn format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("songs.CSV")), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("corpus.txt")), SourceFormat::Lines);
        assert_eq!("csv".parse::<SourceFormat>(), Ok(SourceFormat::Csv));
        assert!("xml".parse::<SourceFormat>().is_err());
    }
}
