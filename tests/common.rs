#![cfg(feature = "std")]

use std::path::Path;

use anodyne::{
    avec::{Event, FromDigits, RawStream, ReaderSource, SliceSource},
    sans::{Config, Digit, ModuleId},
};
use csv::ReaderBuilder;

fn config() -> Config {
    Config::new().with_thresholds([2, 0])
}

/// Load a captured word stream, grouped into runs of words from one link.
fn load_segments(path: impl AsRef<Path>) -> Vec<(i32, Vec<u32>)> {
    let mut reader = ReaderBuilder::new().from_path(path).unwrap();
    let mut segments: Vec<(i32, Vec<u32>)> = vec![];

    for record in reader.records() {
        let record = record.unwrap();
        let link: i32 = record[0].parse().unwrap();
        let word = u32::from_str_radix(record[1].trim_start_matches("0x"), 16).unwrap();

        match segments.last_mut() {
            Some((current, words)) if *current == link => words.push(word),
            _ => segments.push((link, vec![word])),
        }
    }

    segments
}

#[test]
fn decode_slice_two_links() {
    const PATH: &str = "fixtures/two-links.csv";
    let segments = load_segments(PATH);
    let segments: Vec<_> = segments.iter().map(|(l, w)| (*l, w.as_slice())).collect();
    assert_eq!(segments.len(), 3);

    let mut source = SliceSource::from_segments(&segments);
    let mut validator = Validator::new(PATH);
    anodyne::avec::decode(&mut source, config(), &mut validator).unwrap();
    validator.finish();
}

#[test]
fn decode_reader_single_link() {
    const PATH: &str = "fixtures/link-8.raw";
    let file = std::fs::File::open(PATH).unwrap();
    let mut source = ReaderSource::new(std::io::BufReader::new(file), 8);
    let mut validator = Validator::new(PATH);
    anodyne::avec::decode(&mut source, config(), &mut validator).unwrap();
    validator.finish();
    assert_eq!(source.words(), 115);
}

#[test]
fn stream_two_links() {
    const PATH: &str = "fixtures/two-links.csv";
    let segments = load_segments(PATH);
    let segments: Vec<_> = segments.iter().map(|(l, w)| (*l, w.as_slice())).collect();

    let source = SliceSource::from_segments(&segments);
    let mut stream = RawStream::new(source, config()).unwrap();
    let mut validator = Validator::new(PATH);

    loop {
        match stream.next_event() {
            Event::Digit(digit) => validator.add_digit(digit),
            Event::ModuleComplete(module) => validator.complete_module(module),
            Event::Error(err) => panic!("{err}"),
            Event::EndOfStream => break,
        }
    }

    validator.finish();
    assert_eq!(stream.decoder().link(), Some(15));
    assert!(matches!(stream.next_event(), Event::EndOfStream));
}

struct Validator(Vec<Vec<String>>);

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("expected.csv");

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_path(path)
            .unwrap();

        let expected = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self(expected)
    }

    fn next(&mut self) -> Vec<String> {
        assert!(!self.0.is_empty(), "more output than expected");
        self.0.remove(0)
    }

    fn finish(&self) {
        assert!(self.0.is_empty(), "{} expected records missing", self.0.len());
    }
}

impl FromDigits for Validator {
    fn add_digit(&mut self, digit: Digit) {
        let found = [
            "digit".to_string(),
            digit.module.to_string(),
            digit.lane.to_string(),
            digit.anode.to_string(),
            digit.time_bin.to_string(),
            digit.signal.to_string(),
        ];
        assert_eq!(self.next(), found);
    }

    fn complete_module(&mut self, module: ModuleId) {
        let mut found = vec!["complete".to_string(), module.to_string()];
        found.resize(6, String::new());
        assert_eq!(self.next(), found);
    }
}
