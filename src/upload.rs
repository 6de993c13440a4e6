// src/upload.rs
//! CSV upload parsing into [`BatchRecord`]s.
//!
//! Header names are matched case-insensitively after trimming. Only the
//! `comment` column is required.

use thiserror::Error;

use crate::analysis::BatchRecord;

const COMMENT_COLUMN: &str = "comment";
const NAME_COLUMN: &str = "name";
const TRUE_LABEL_COLUMN: &str = "true_label";
const LABEL_COLUMN: &str = "label";
/// Tried in this order; the first present column wins.
pub const SPLIT_COLUMNS: &[&str] = &[
    "split",
    "set",
    "subset",
    "type",
    "partition",
    "stage",
    "split_label",
    "is_train",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("CSV must contain a 'comment' column")]
    MissingCommentColumn,
    #[error("CSV has no data rows")]
    Empty,
    #[error("CSV has {got} rows, limit is {max}")]
    TooManyRows { got: usize, max: usize },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parsed upload. `split_column` is set when the header names a split
/// column, whatever its values.
#[derive(Debug, Clone, Default)]
pub struct CsvBatch {
    pub records: Vec<BatchRecord>,
    pub split_column: bool,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    comment: usize,
    name: Option<usize>,
    true_label: Option<usize>,
    label: Option<usize>,
    split: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, UploadError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |wanted: &str| names.iter().position(|h| h == wanted);
        let first_of = |list: &[&str]| list.iter().find_map(|c| find(*c));

        Ok(Self {
            comment: find(COMMENT_COLUMN).ok_or(UploadError::MissingCommentColumn)?,
            name: find(NAME_COLUMN),
            true_label: find(TRUE_LABEL_COLUMN),
            label: find(LABEL_COLUMN),
            split: first_of(SPLIT_COLUMNS),
        })
    }
}

/// Parse `body` into records, refusing more than `max_rows` data rows.
pub fn parse_csv(body: &str, max_rows: usize) -> Result<CsvBatch, UploadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let cols = Columns::locate(reader.headers()?)?;

    let mut records = Vec::new();
    let mut rows = reader.records();
    while let Some(row) = rows.next() {
        let row = row?;
        if records.len() == max_rows {
            return Err(UploadError::TooManyRows {
                got: max_rows + 1 + rows.count(),
                max: max_rows,
            });
        }
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        records.push(BatchRecord {
            comment: row.get(cols.comment).unwrap_or_default().to_string(),
            name: field(cols.name),
            true_label: field(cols.true_label),
            label: field(cols.label),
            split: field(cols.split),
        });
    }

    if records.is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(CsvBatch {
        records,
        split_column: cols.split.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_optional_columns() {
        let csv = "Name,Comment,True_Label,Set\nBudi,saya senang,happy,train\n,sedih,,test\n";
        let batch = parse_csv(csv, 10).unwrap();
        assert!(batch.split_column);
        let rows = batch.records;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name.as_deref(), Some("Budi"));
        assert_eq!(rows[0].comment, "saya senang");
        assert_eq!(rows[0].truth(), Some("happy"));
        assert_eq!(rows[0].split.as_deref(), Some("train"));
        assert!(rows[1].name.is_none());
        assert!(rows[1].truth().is_none());
    }

    #[test]
    fn split_column_priority() {
        let csv = "comment,stage,split\nx,test,train\n";
        let rows = parse_csv(csv, 10).unwrap().records;
        assert_eq!(rows[0].split.as_deref(), Some("train"));
    }

    #[test]
    fn missing_comment_column_is_rejected() {
        let err = parse_csv("text,label\nhalo,happy\n", 10).unwrap_err();
        assert!(matches!(err, UploadError::MissingCommentColumn));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(parse_csv("comment\n", 10), Err(UploadError::Empty)));
    }

    #[test]
    fn row_limit_is_enforced() {
        let err = parse_csv("comment\na\nb\nc\n", 2).unwrap_err();
        match err {
            UploadError::TooManyRows { got, max } => assert_eq!((got, max), (3, 2)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn both_label_columns_are_kept() {
        let csv = "comment,label,true_label,split\nsenang,sad,happy,\nsedih,sad,,\n";
        let batch = parse_csv(csv, 10).unwrap();
        assert!(batch.split_column);
        assert!(batch.records.iter().all(|r| r.split.is_none()));
        assert_eq!(batch.records[0].truth(), Some("happy"));
        assert_eq!(batch.records[1].truth(), Some("sad"));
    }

    #[test]
    fn short_rows_yield_blank_comment() {
        let batch = parse_csv("name,comment\nSiti\n", 10).unwrap();
        assert!(!batch.split_column);
        let rows = batch.records;
        assert_eq!(rows[0].comment, "");
        assert_eq!(rows[0].name.as_deref(), Some("Siti"));
    }
}
