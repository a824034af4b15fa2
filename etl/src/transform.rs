use common::models::MovieRow;
use common::{Error, Result};
use serde_json::Value;

use crate::models::RawMovieRecord;

/// Maps raw provider records onto canonical rows, one per record and in
/// the same order.
///
/// No filtering, deduplication or range checks happen here. The first
/// record that lacks a field fails the whole batch and nothing is returned.
pub fn transform(raw_records: &[RawMovieRecord]) -> Result<Vec<MovieRow>> {
    raw_records
        .iter()
        .enumerate()
        .map(|(index, record)| transform_record(index, record))
        .collect()
}

fn transform_record(index: usize, record: &RawMovieRecord) -> Result<MovieRow> {
    let fields = FieldReader { index, record };

    Ok(MovieRow {
        imdb_id: fields.required_string("id")?,
        primary_title: fields.string("primaryTitle")?,
        original_title: fields.string("originalTitle")?,
        genre: fields.string_list("genres")?,
        start_year: fields.int32("startYear")?,
        average_rating: fields.float("averageRating")?,
        num_votes: fields.int64("numVotes")?,
    })
}

/// Typed lookups into one raw record. An absent key is a `MissingField`;
/// a JSON null passes through as `None`.
struct FieldReader<'a> {
    index: usize,
    record: &'a RawMovieRecord,
}

impl<'a> FieldReader<'a> {
    fn value(&self, field: &str) -> Result<Option<&'a Value>> {
        match self.record.get(field) {
            None => Err(Error::MissingField {
                index: self.index,
                field: field.to_string(),
            }),
            Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(value)),
        }
    }

    fn invalid(&self, field: &str, expected: &'static str) -> Error {
        Error::InvalidField {
            index: self.index,
            field: field.to_string(),
            expected,
        }
    }

    fn required_string(&self, field: &str) -> Result<String> {
        self.string(field)?
            .ok_or_else(|| self.invalid(field, "non-null string"))
    }

    fn string(&self, field: &str) -> Result<Option<String>> {
        match self.value(field)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(field, "string")),
        }
    }

    fn string_list(&self, field: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.value(field)? else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.invalid(field, "array of strings"))?;

        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(field, "array of strings"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn int32(&self, field: &str) -> Result<Option<i32>> {
        self.value(field)?
            .map(|value| {
                value
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| self.invalid(field, "32-bit integer"))
            })
            .transpose()
    }

    fn int64(&self, field: &str) -> Result<Option<i64>> {
        self.value(field)?
            .map(|value| value.as_i64().ok_or_else(|| self.invalid(field, "integer")))
            .transpose()
    }

    fn float(&self, field: &str) -> Result<Option<f64>> {
        self.value(field)?
            .map(|value| value.as_f64().ok_or_else(|| self.invalid(field, "number")))
            .transpose()
    }
}
