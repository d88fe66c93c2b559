//! Tolerant parsers for the positional JSON rows of bank files.
//!
//! Archives in the wild disagree about scalar types (scores as strings,
//! readings as numbers, nulls everywhere). Every field goes through
//! [`FlexScalar`] once, here, and comes out as the declared Rust type.

use std::marker::PhantomData;

use serde_json::{Number, Value};

use crate::error::{BankError, ImportError};
use crate::types::Definition;

/// A JSON value as found in a scalar slot, before coercion
#[derive(Debug, Clone, PartialEq)]
pub enum FlexScalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Object or array where a scalar was expected
    Compound(Value),
}

impl From<Value> for FlexScalar {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FlexScalar::Null,
            Value::Bool(b) => FlexScalar::Bool(b),
            Value::Number(n) => FlexScalar::Number(n),
            Value::String(s) => FlexScalar::Text(s),
            other => FlexScalar::Compound(other),
        }
    }
}

impl FlexScalar {
    pub fn into_string(self) -> String {
        match self {
            FlexScalar::Null => String::new(),
            FlexScalar::Bool(b) => b.to_string(),
            FlexScalar::Number(n) => n.to_string(),
            FlexScalar::Text(s) => s,
            FlexScalar::Compound(v) => v.to_string(),
        }
    }

    /// Integer view; anything unparseable is 0
    pub fn as_int(&self) -> i64 {
        match self {
            FlexScalar::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e18).map(|f| f as i64))
                .unwrap_or(0),
            FlexScalar::Text(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            FlexScalar::Bool(b) => *b,
            FlexScalar::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            FlexScalar::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
            _ => false,
        }
    }

    pub fn into_optional_string(self) -> Option<String> {
        match self {
            FlexScalar::Null => None,
            other => Some(other.into_string()),
        }
    }
}

/// Positional reader over one row; missing trailing fields read as zero
/// values and extra fields are never looked at.
struct Fields(std::vec::IntoIter<Value>);

impl Fields {
    fn value(&mut self) -> Value {
        self.0.next().unwrap_or(Value::Null)
    }

    fn scalar(&mut self) -> FlexScalar {
        FlexScalar::from(self.value())
    }

    fn string(&mut self) -> String {
        self.scalar().into_string()
    }

    fn int(&mut self) -> i64 {
        self.scalar().as_int()
    }
}

/// A record type decodable from one bank row
pub trait BankRecord: Sized {
    fn from_row(row: Vec<Value>) -> Self;
}

/// `[expression, reading, tags, rules, score, glossary, sequence, term-tags?]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRecord {
    pub expression: String,
    pub reading: String,
    pub tags: String,
    pub rules: String,
    pub score: i64,
    pub definitions: Vec<Definition>,
    pub sequence: i64,
    pub term_tags: String,
}

impl BankRecord for TermRecord {
    fn from_row(row: Vec<Value>) -> Self {
        let mut f = Fields(row.into_iter());
        Self {
            expression: f.string(),
            reading: f.string(),
            tags: f.string(),
            rules: f.string(),
            score: f.int(),
            definitions: parse_glossary(f.value()),
            sequence: f.int(),
            term_tags: f.string(),
        }
    }
}

/// `[character, onyomi, kunyomi, tags, meanings, stats]`; stats are dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiRecord {
    pub character: String,
    pub onyomi: String,
    pub kunyomi: String,
    pub tags: String,
    pub meanings: Vec<String>,
}

impl BankRecord for KanjiRecord {
    fn from_row(row: Vec<Value>) -> Self {
        let mut f = Fields(row.into_iter());
        Self {
            character: f.string(),
            onyomi: f.string(),
            kunyomi: f.string(),
            tags: f.string(),
            meanings: match f.value() {
                Value::Array(items) => items
                    .into_iter()
                    .map(|v| FlexScalar::from(v).into_string())
                    .collect(),
                Value::Null => Vec::new(),
                other => vec![FlexScalar::from(other).into_string()],
            },
        }
    }
}

/// `[key, mode, data]` for both term and kanji meta banks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRecord {
    pub key: String,
    pub mode: String,
    /// Scalars as text, structures as serialized JSON
    pub data: String,
}

impl BankRecord for MetaRecord {
    fn from_row(row: Vec<Value>) -> Self {
        let mut f = Fields(row.into_iter());
        Self {
            key: f.string(),
            mode: f.string(),
            data: f.string(),
        }
    }
}

/// `[name, category, order, notes, score]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub name: String,
    pub category: String,
    pub order: i64,
    pub notes: String,
    pub score: i64,
}

impl BankRecord for TagRecord {
    fn from_row(row: Vec<Value>) -> Self {
        let mut f = Fields(row.into_iter());
        Self {
            name: f.string(),
            category: f.string(),
            order: f.int(),
            notes: f.string(),
            score: f.int(),
        }
    }
}

/// Plain strings are text glosses; anything else is kept as serialized JSON.
pub fn parse_glossary(value: Value) -> Vec<Definition> {
    fn one(value: Value) -> Option<Definition> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Definition::text(s)),
            other => Some(Definition::structured(other.to_string())),
        }
    }

    match value {
        Value::Array(items) => items.into_iter().filter_map(one).collect(),
        other => one(other).into_iter().collect(),
    }
}

/// Contents of `index.json`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRecord {
    pub title: String,
    pub revision: String,
    pub format: i64,
    pub sequenced: bool,
    pub author: Option<String>,
    pub description: Option<String>,
    pub attribution: Option<String>,
    pub url: Option<String>,
}

impl IndexRecord {
    pub fn parse(bytes: &[u8]) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_slice(strip_bom(bytes))
            .map_err(|e| ImportError::MalformedIndex(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(ImportError::MalformedIndex(
                "index.json is not a JSON object".to_string(),
            ));
        };

        let mut index = IndexRecord::default();
        for (key, value) in map {
            let value = FlexScalar::from(value);
            match key.as_str() {
                "title" => index.title = value.into_string(),
                "revision" => index.revision = value.into_string(),
                "format" | "version" => index.format = value.as_int(),
                "sequenced" => index.sequenced = value.as_bool(),
                "author" => index.author = value.into_optional_string(),
                "description" => index.description = value.into_optional_string(),
                "attribution" => index.attribution = value.into_optional_string(),
                "url" => index.url = value.into_optional_string(),
                _ => {}
            }
        }
        Ok(index)
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

enum Position {
    Start,
    First,
    Next,
    Done,
}

/// Lazy iterator over the records of one bank file.
///
/// Rows are decoded one at a time from the underlying bytes. A row that is
/// valid JSON but not an array is skipped and counted; broken JSON ends the
/// iteration with an error since there is no way to resynchronize.
pub struct BankRecords<'a, T> {
    bytes: &'a [u8],
    pos: usize,
    index: usize,
    skipped: usize,
    position: Position,
    _record: PhantomData<T>,
}

impl<'a, T: BankRecord> BankRecords<'a, T> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes: strip_bom(bytes),
            pos: 0,
            index: 0,
            skipped: 0,
            position: Position::Start,
            _record: PhantomData,
        }
    }

    /// Rows dropped because they were not arrays
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn skip_whitespace(&mut self) -> Option<u8> {
        while let Some(&b) = self.bytes.get(self.pos) {
            if !is_json_whitespace(b) {
                return Some(b);
            }
            self.pos += 1;
        }
        None
    }

    fn fail(&mut self, err: BankError) -> Option<Result<T, BankError>> {
        self.position = Position::Done;
        Some(Err(err))
    }

    fn next_row(&mut self) -> Option<Result<Value, BankError>> {
        loop {
            match self.position {
                Position::Done => return None,
                Position::Start => match self.skip_whitespace() {
                    Some(b'[') => {
                        self.pos += 1;
                        self.position = Position::First;
                    }
                    _ => {
                        self.position = Position::Done;
                        return Some(Err(BankError::NotAnArray));
                    }
                },
                Position::First | Position::Next => {
                    let first = matches!(self.position, Position::First);
                    match self.skip_whitespace() {
                        Some(b']') => {
                            self.position = Position::Done;
                            return None;
                        }
                        Some(b',') if !first => {
                            self.pos += 1;
                        }
                        Some(_) if first => {}
                        Some(other) => {
                            self.position = Position::Done;
                            return Some(Err(BankError::UnexpectedByte {
                                index: self.index,
                                found: other as char,
                            }));
                        }
                        None => {
                            self.position = Position::Done;
                            return Some(Err(BankError::UnexpectedEnd { index: self.index }));
                        }
                    }

                    let mut stream =
                        serde_json::Deserializer::from_slice(&self.bytes[self.pos..]).into_iter::<Value>();
                    let row = match stream.next() {
                        Some(Ok(row)) => row,
                        Some(Err(source)) => {
                            self.position = Position::Done;
                            return Some(Err(BankError::Json {
                                index: self.index,
                                source,
                            }));
                        }
                        None => {
                            self.position = Position::Done;
                            return Some(Err(BankError::UnexpectedEnd { index: self.index }));
                        }
                    };
                    self.pos += stream.byte_offset();
                    self.index += 1;
                    self.position = Position::Next;
                    return Some(Ok(row));
                }
            }
        }
    }
}

impl<T: BankRecord> Iterator for BankRecords<'_, T> {
    type Item = Result<T, BankError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_row()? {
                Ok(Value::Array(row)) => return Some(Ok(T::from_row(row))),
                Ok(other) => {
                    tracing::debug!("Skipping non-array record {}: {}", self.index, other);
                    self.skipped += 1;
                }
                Err(err) => return self.fail(err),
            }
        }
    }
}
