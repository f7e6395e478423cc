//! Deck files: one card per line, `term|definition|errorCount`.
//!
//! Fields holding `|` or `"` are written double-quoted with inner quotes
//! doubled. On import a line is only read as quoted when it is exactly what
//! export would have written; any other line is split on `|` as is, so
//! bare decks load unchanged and a stray quote only affects its own line.

use crate::card::{Card, CardRecord};
use crate::store::CardStore;
use anyhow::Context;
use anyhow::Result;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

const FIELDS: usize = 3;

/// A line that was not imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub loaded: usize,
    pub skipped: Vec<Skipped>,
}

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .delimiter(b'|')
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'));
    builder
}

pub fn export_to<W: Write>(store: &CardStore, sink: W) -> Result<usize> {
    let mut wtr = writer_builder().from_writer(sink);
    for card in store.cards() {
        wtr.serialize(CardRecord::from(card))?;
    }
    wtr.flush()?;
    Ok(store.len())
}

pub fn export_file(store: &CardStore, path: &Path) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let n = export_to(store, file).with_context(|| format!("Failed to write {:?}", path))?;
    info!("exported {n} cards to {:?}", path);
    Ok(n)
}

pub fn import_from<R: BufRead>(store: &mut CardStore, source: R) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (i, bytes) in source.split(b'\n').enumerate() {
        let line = i as u64 + 1;
        let mut bytes = bytes.context("Failed to read deck")?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        if bytes.is_empty() {
            continue;
        }
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                skip(&mut report, line, format!("not valid UTF-8 ({})", e.utf8_error()));
                continue;
            }
        };
        match parse_line(&text) {
            Ok(card) => match store.upsert(card) {
                Ok(()) => report.loaded += 1,
                Err(e) => skip(&mut report, line, e.to_string()),
            },
            Err(reason) => skip(&mut report, line, reason),
        }
    }
    Ok(report)
}

/// `Ok(None)` when the file does not exist
pub fn import_file(store: &mut CardStore, path: &Path) -> Result<Option<ImportReport>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("{:?} not found", path);
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to open {:?}", path)),
    };
    let report = import_from(store, BufReader::new(file))?;
    info!(
        "imported {} cards from {:?}, skipped {}",
        report.loaded,
        path,
        report.skipped.len()
    );
    Ok(Some(report))
}

fn split_fields(line: &str) -> StringRecord {
    if line.contains('"') {
        if let Some(record) = quoted_fields(line) {
            return record;
        }
    }
    StringRecord::from(line.split('|').collect::<Vec<_>>())
}

/// the quoted reading of `line`, if export writes it back byte for byte
fn quoted_fields(line: &str) -> Option<StringRecord> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let record = rdr.records().next()?.ok()?;

    let mut wtr = writer_builder().from_writer(Vec::new());
    wtr.write_record(&record).ok()?;
    let written = wtr.into_inner().ok()?;
    (written.strip_suffix(b"\n") == Some(line.as_bytes())).then_some(record)
}

fn parse_line(line: &str) -> std::result::Result<Card, String> {
    let record = split_fields(line);
    if record.len() != FIELDS {
        return Err(format!(
            "expected {FIELDS} fields separated by '|', found {}",
            record.len()
        ));
    }
    let record: CardRecord = record.deserialize(None).map_err(|e| match e.kind() {
        csv::ErrorKind::Deserialize { err, .. } => format!("bad error count ({err})"),
        _ => e.to_string(),
    })?;
    Ok(record.into())
}

fn skip(report: &mut ImportReport, line: u64, reason: String) {
    warn!("skipping line {line}: {reason}");
    report.skipped.push(Skipped { line, reason });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exported(store: &CardStore) -> String {
        let mut buf = Vec::new();
        export_to(store, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_cards_use_bare_format() {
        let mut store = CardStore::new();
        store.add("France", "Paris").unwrap();
        store.add("Japan", "Tokyo").unwrap();
        store.record_failure(1);
        assert_eq!(exported(&store), "France|Paris|0\nJapan|Tokyo|1\n");
    }

    #[test]
    fn pipes_are_quoted() {
        let mut store = CardStore::new();
        store.add("a|b", "say \"hi\"").unwrap();
        let text = exported(&store);
        assert_eq!(text, "\"a|b\"|\"say \"\"hi\"\"\"|0\n");

        let mut back = CardStore::new();
        let report = import_from(&mut back, text.as_bytes()).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(back.cards(), store.cards());
    }

    #[test]
    fn import_upserts_by_term() {
        let mut store = CardStore::new();
        store.add("a", "1").unwrap();
        store.add("b", "2").unwrap();
        let report = import_from(&mut store, "a|one|4\nc|3|0\n".as_bytes()).unwrap();
        assert_eq!(report.loaded, 2);
        let terms: Vec<_> = store.cards().iter().map(|c| c.term.as_str()).collect();
        assert_eq!(terms, ["a", "b", "c"]);
        assert_eq!(store.cards()[0], Card::new("a", "one").with_errors(4));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut store = CardStore::new();
        let text = "a|1|0\nbroken line\nb|2|x\nc|3|0|extra\nd|4|-1\ne|5|2\n";
        let report = import_from(&mut store, text.as_bytes()).unwrap();
        assert_eq!(report.loaded, 2);
        let lines: Vec<_> = report.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, [2, 3, 4, 5]);
        assert!(report.skipped[0].reason.contains("found 1"));
        assert!(report.skipped[1].reason.starts_with("bad error count"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn stray_quote_only_affects_its_line() {
        let mut store = CardStore::new();
        let text = "a|1|0\n\"oops|2|0\nb|3|0\nc|4|0\nd|5|0\n";
        let report = import_from(&mut store, text.as_bytes()).unwrap();
        assert_eq!(report.loaded, 5);
        assert!(report.skipped.is_empty());
        let terms: Vec<_> = store.cards().iter().map(|c| c.term.as_str()).collect();
        assert_eq!(terms, ["a", "\"oops", "b", "c", "d"]);
    }

    #[test]
    fn unbalanced_quote_with_wrong_field_count_is_skipped_alone() {
        let mut store = CardStore::new();
        let text = "\"a|1\nb|2|0\n";
        let report = import_from(&mut store, text.as_bytes()).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 1);
        assert_eq!(store.cards()[0].term, "b");
    }

    #[test]
    fn bare_field_starting_with_quote_is_kept_verbatim() {
        let mut store = CardStore::new();
        let report = import_from(&mut store, "quote|\"To be\" or not|0\n".as_bytes()).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(store.cards()[0], Card::new("quote", "\"To be\" or not"));
    }

    #[test]
    fn crlf_and_blank_lines() {
        let mut store = CardStore::new();
        let report = import_from(&mut store, "a|1|0\r\n\r\nb|2|3\r\n".as_bytes()).unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(store.cards()[1], Card::new("b", "2").with_errors(3));
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let mut store = CardStore::new();
        let report = import_from(&mut store, &b"a|\xff|0\nb|2|0\n"[..]).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped[0].line, 1);
        assert!(report.skipped[0].reason.starts_with("not valid UTF-8"));
    }

    #[test]
    fn duplicate_definition_on_import_is_skipped() {
        let mut store = CardStore::new();
        store.add("a", "1").unwrap();
        let report = import_from(&mut store, "b|1|0\n".as_bytes()).unwrap();
        assert_eq!(report.loaded, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CardStore::new();
        let report = import_file(&mut store, &dir.path().join("nope.txt")).unwrap();
        assert_eq!(report, None);
    }
}
