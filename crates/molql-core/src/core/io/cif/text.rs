//! In-memory CIF data built from text.
//!
//! The tokenizer understands `data_` headers, `loop_` tables, tag/value pairs, single- and
//! double-quoted values (a quote only closes when followed by whitespace) and
//! semicolon-delimited text fields. `save_` frames and `global_` sections are skipped.

use super::{Category, Column, ColumnRef, DataBlock, ValuePresence};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CifError {
    #[error("Unterminated quoted value starting on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("Unterminated text field starting on line {line}")]
    UnterminatedTextField { line: usize },
    #[error("Tag '{tag}' on line {line} appears outside of a data block")]
    TagOutsideBlock { tag: String, line: usize },
    #[error("Tag '{tag}' on line {line} has no value")]
    MissingValue { tag: String, line: usize },
    #[error("Value on line {line} does not belong to any tag")]
    UnexpectedValue { line: usize },
    #[error("Loop starting on line {line} has {values} values for {columns} columns")]
    RaggedLoop {
        line: usize,
        values: usize,
        columns: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextValue {
    Present(String),
    NotSpecified,
    Unknown,
}

impl TextValue {
    fn from_bare(token: &str) -> Self {
        match token {
            "." => Self::NotSpecified,
            "?" => Self::Unknown,
            _ => Self::Present(token.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    DataBlock(String),
    Loop,
    Skip,
    Tag(String),
    Value(TextValue),
}

#[derive(Debug, Clone, Default)]
pub struct TextColumn {
    values: Vec<TextValue>,
}

impl TextColumn {
    pub fn new(values: Vec<TextValue>) -> Self {
        Self { values }
    }
}

impl Column for TextColumn {
    fn is_defined(&self) -> bool {
        true
    }

    fn row_count(&self) -> usize {
        self.values.len()
    }

    fn get_string(&self, row: usize) -> Option<&str> {
        match self.values.get(row)? {
            TextValue::Present(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn get_value_presence(&self, row: usize) -> ValuePresence {
        match self.values.get(row) {
            Some(TextValue::Present(_)) => ValuePresence::Present,
            Some(TextValue::Unknown) => ValuePresence::Unknown,
            Some(TextValue::NotSpecified) | None => ValuePresence::NotSpecified,
        }
    }

    fn are_values_equal(&self, row_a: usize, row_b: usize) -> bool {
        self.values.get(row_a) == self.values.get(row_b)
    }
}

#[derive(Debug, Clone)]
pub struct TextCategory {
    name: String,
    row_count: usize,
    columns: HashMap<String, Arc<TextColumn>>,
}

impl Category for TextCategory {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn column(&self, name: &str) -> Option<ColumnRef> {
        self.columns
            .get(&name.to_ascii_lowercase())
            .map(|c| c.clone() as ColumnRef)
    }
}

#[derive(Debug, Clone)]
pub struct TextBlock {
    header: String,
    categories: HashMap<String, Arc<TextCategory>>,
}

impl DataBlock for TextBlock {
    fn header(&self) -> &str {
        &self.header
    }

    fn get_category(&self, name: &str) -> Option<Arc<dyn Category>> {
        let key = name.trim_start_matches('_').to_ascii_lowercase();
        self.categories
            .get(&key)
            .map(|c| c.clone() as Arc<dyn Category>)
    }
}

/// A parsed CIF file: an ordered list of data blocks.
#[derive(Debug, Clone, Default)]
pub struct CifFile {
    blocks: Vec<Arc<TextBlock>>,
}

impl CifFile {
    pub fn parse(text: &str) -> Result<Self, CifError> {
        let tokens = tokenize(text)?;
        build_blocks(tokens)
    }

    pub fn blocks(&self) -> &[Arc<TextBlock>] {
        &self.blocks
    }

    pub fn first_block(&self) -> Option<&Arc<TextBlock>> {
        self.blocks.first()
    }

    pub fn block(&self, header: &str) -> Option<&Arc<TextBlock>> {
        self.blocks
            .iter()
            .find(|b| b.header.eq_ignore_ascii_case(header))
    }
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, CifError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line = 1;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c == b'\n' {
            line += 1;
            pos += 1;
            continue;
        }
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if c == b'#' {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }

        let at_line_start = pos == 0 || bytes[pos - 1] == b'\n';
        if c == b';' && at_line_start {
            let start_line = line;
            let body_start = pos + 1;
            let close = text[body_start..]
                .find("\n;")
                .ok_or(CifError::UnterminatedTextField { line: start_line })?;
            let body = &text[body_start..body_start + close];
            line += body.matches('\n').count() + 1;
            let body = body.strip_prefix("\r\n").or(body.strip_prefix('\n')).unwrap_or(body);
            tokens.push((
                Token::Value(TextValue::Present(body.trim_end_matches('\r').to_string())),
                start_line,
            ));
            pos = body_start + close + 2;
            continue;
        }

        if c == b'\'' || c == b'"' {
            let mut end = pos + 1;
            loop {
                match bytes.get(end) {
                    None | Some(b'\n') => return Err(CifError::UnterminatedQuote { line }),
                    Some(&q)
                        if q == c
                            && bytes
                                .get(end + 1)
                                .is_none_or(|next| next.is_ascii_whitespace()) =>
                    {
                        break;
                    }
                    Some(_) => end += 1,
                }
            }
            tokens.push((
                Token::Value(TextValue::Present(text[pos + 1..end].to_string())),
                line,
            ));
            pos = end + 1;
            continue;
        }

        let start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let word = &text[start..pos];
        let lower = word.to_ascii_lowercase();
        let token = if lower.starts_with("data_") {
            Token::DataBlock(word[5..].to_string())
        } else if lower == "loop_" {
            Token::Loop
        } else if lower.starts_with("save_") || lower == "global_" || lower == "stop_" {
            Token::Skip
        } else if word.starts_with('_') {
            Token::Tag(word.to_string())
        } else {
            Token::Value(TextValue::from_bare(word))
        };
        tokens.push((token, line));
    }

    Ok(tokens)
}

#[derive(Debug, Default)]
struct CategoryBuilder {
    name: String,
    fields: Vec<(String, Vec<TextValue>)>,
}

impl CategoryBuilder {
    fn push(&mut self, field: &str, values: Vec<TextValue>) {
        match self
            .fields
            .iter_mut()
            .find(|(f, _)| f.eq_ignore_ascii_case(field))
        {
            Some((_, existing)) => *existing = values,
            None => self.fields.push((field.to_string(), values)),
        }
    }

    fn build(self) -> TextCategory {
        let row_count = self.fields.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        let columns = self
            .fields
            .into_iter()
            .map(|(f, v)| (f.to_ascii_lowercase(), Arc::new(TextColumn::new(v))))
            .collect();
        TextCategory {
            name: self.name,
            row_count,
            columns,
        }
    }
}

#[derive(Debug, Default)]
struct BlockBuilder {
    header: String,
    categories: Vec<CategoryBuilder>,
}

impl BlockBuilder {
    fn category(&mut self, name: &str) -> &mut CategoryBuilder {
        let idx = match self
            .categories
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
        {
            Some(idx) => idx,
            None => {
                self.categories.push(CategoryBuilder {
                    name: name.to_string(),
                    fields: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        &mut self.categories[idx]
    }

    fn build(self) -> TextBlock {
        let categories = self
            .categories
            .into_iter()
            .map(|c| (c.name.to_ascii_lowercase(), Arc::new(c.build())))
            .collect();
        TextBlock {
            header: self.header,
            categories,
        }
    }
}

/// Splits `_category.field` into its parts; tags without a dot form a category of their own.
fn split_tag(tag: &str) -> (&str, &str) {
    let tag = tag.trim_start_matches('_');
    match tag.split_once('.') {
        Some((category, field)) => (category, field),
        None => (tag, ""),
    }
}

fn build_blocks(tokens: Vec<(Token, usize)>) -> Result<CifFile, CifError> {
    let mut blocks = Vec::new();
    let mut current: Option<BlockBuilder> = None;
    let mut iter = tokens.into_iter().peekable();

    while let Some((token, line)) = iter.next() {
        match token {
            Token::DataBlock(header) => {
                if let Some(done) = current.take() {
                    blocks.push(Arc::new(done.build()));
                }
                current = Some(BlockBuilder {
                    header,
                    categories: Vec::new(),
                });
            }
            Token::Skip => {}
            Token::Tag(tag) => {
                let block = current
                    .as_mut()
                    .ok_or_else(|| CifError::TagOutsideBlock {
                        tag: tag.clone(),
                        line,
                    })?;
                let value = match iter.next() {
                    Some((Token::Value(v), _)) => v,
                    _ => return Err(CifError::MissingValue { tag, line }),
                };
                let (category, field) = split_tag(&tag);
                block.category(category).push(field, vec![value]);
            }
            Token::Loop => {
                let mut tags = Vec::new();
                while let Some((Token::Tag(_), _)) = iter.peek() {
                    if let Some((Token::Tag(tag), _)) = iter.next() {
                        tags.push(tag);
                    }
                }
                let mut values = Vec::new();
                while let Some((Token::Value(_), _)) = iter.peek() {
                    if let Some((Token::Value(v), _)) = iter.next() {
                        values.push(v);
                    }
                }
                if tags.is_empty() {
                    if values.is_empty() {
                        continue;
                    }
                    return Err(CifError::UnexpectedValue { line });
                }
                if values.len() % tags.len() != 0 {
                    return Err(CifError::RaggedLoop {
                        line,
                        values: values.len(),
                        columns: tags.len(),
                    });
                }
                let block = current
                    .as_mut()
                    .ok_or_else(|| CifError::TagOutsideBlock {
                        tag: tags[0].clone(),
                        line,
                    })?;
                let width = tags.len();
                let mut columns: Vec<Vec<TextValue>> =
                    vec![Vec::with_capacity(values.len() / width); width];
                for (i, value) in values.into_iter().enumerate() {
                    columns[i % width].push(value);
                }
                for (tag, column) in tags.iter().zip(columns) {
                    let (category, field) = split_tag(tag);
                    block.category(category).push(field, column);
                }
            }
            Token::Value(_) => return Err(CifError::UnexpectedValue { line }),
        }
    }

    if let Some(done) = current.take() {
        blocks.push(Arc::new(done.build()));
    }
    Ok(CifFile { blocks })
}
