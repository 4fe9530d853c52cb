use std::fs::File;
use std::io::{self, BufReader};
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{Bar, Series};

// column order of the exported history files
const DATE: usize = 0;
const CLOSE: usize = 1;
const VOLUME: usize = 2;
const OPEN: usize = 3;
const HIGH: usize = 4;
const LOW: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("Row {row}: missing `{field}` field")]
    MissingField { row: usize, field: &'static str },
    #[error("Row {row}: invalid `{field}` value {value:?}: {source}")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("No bars found")]
    Empty,
}

pub fn load_series(path: impl AsRef<Path>) -> Result<Series, LoadError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let series = parse_series(BufReader::new(file))?;

    log::info!("Loaded {} bars from {}", series.len(), path.display());

    Ok(series)
}

/// Parses newest-first rows of `date, close, volume, open, high, low` into a
/// chronological series. Any malformed row aborts the whole load.
pub fn parse_series<R: io::Read>(reader: R) -> Result<Series, LoadError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        // header is row 1
        let row = index + 2;
        bars.push(parse_bar(&record?, row)?);
    }

    bars.reverse();

    Series::new(bars).ok_or(LoadError::Empty)
}

fn parse_bar(record: &StringRecord, row: usize) -> Result<Bar, LoadError> {
    let field = |column: usize, name: &'static str| {
        record
            .get(column)
            .ok_or(LoadError::MissingField { row, field: name })
    };

    let number = |value: &str, name: &'static str| {
        value
            .parse::<f32>()
            .map_err(|source| LoadError::InvalidNumber {
                row,
                field: name,
                value: value.to_string(),
                source,
            })
    };

    let price = |column: usize, name: &'static str| {
        field(column, name).and_then(|value| number(strip_currency(value), name))
    };

    Ok(Bar {
        date: field(DATE, "date")?.to_string(),
        close: price(CLOSE, "close")?,
        volume: field(VOLUME, "volume").and_then(|value| number(value, "volume"))?,
        open: price(OPEN, "open")?,
        high: price(HIGH, "high")?,
        low: price(LOW, "low")?,
    })
}

fn strip_currency(value: &str) -> &str {
    match value.chars().next() {
        Some(marker) if !(marker.is_ascii_digit() || matches!(marker, '-' | '+' | '.')) => {
            &value[marker.len_utf8()..]
        }
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Close/Last,Volume,Open,High,Low
10/16/2024,$135.72,264879700,$133.98,$136.62,$131.58
10/15/2024,$131.60,377831000,$137.87,$138.57,$128.74
10/14/2024,$138.07,232347700,$136.47,$139.60,$136.30
";

    #[test]
    fn rows_are_reversed_into_chronological_order() {
        let series = parse_series(SAMPLE.as_bytes()).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.bars()[0].date, "10/14/2024");
        assert_eq!(series.bars()[2].date, "10/16/2024");
    }

    #[test]
    fn currency_marker_is_stripped_from_prices_only() {
        let series = parse_series(SAMPLE.as_bytes()).unwrap();
        let latest = &series.bars()[2];

        assert_eq!(latest.close, 135.72);
        assert_eq!(latest.open, 133.98);
        assert_eq!(latest.high, 136.62);
        assert_eq!(latest.low, 131.58);
        assert_eq!(latest.volume, 264_879_700.0);
    }

    #[test]
    fn unprefixed_prices_are_accepted() {
        let csv = "Date,Close,Volume,Open,High,Low\n01/02/2024,10.5,100,10,11,9.5\n";
        let series = parse_series(csv.as_bytes()).unwrap();

        assert_eq!(series.bars()[0].close, 10.5);
    }

    #[test]
    fn malformed_number_aborts_the_load() {
        let csv = "Date,Close,Volume,Open,High,Low\n\
                   01/03/2024,$10.5,100,$10,$11,$9.5\n\
                   01/02/2024,$abc,100,$10,$11,$9.5\n";

        match parse_series(csv.as_bytes()) {
            Err(LoadError::InvalidNumber { row, field, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(field, "close");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn short_row_reports_the_missing_field() {
        let csv = "Date,Close,Volume,Open,High,Low\n01/02/2024,$10.5,100,$10\n";

        assert!(matches!(
            parse_series(csv.as_bytes()),
            Err(LoadError::MissingField { field: "high", .. })
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let csv = "Date,Close,Volume,Open,High,Low\n";

        assert!(matches!(parse_series(csv.as_bytes()), Err(LoadError::Empty)));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let result = load_series("/definitely/not/here.csv");

        assert!(matches!(result, Err(LoadError::Open { .. })));
    }
}
