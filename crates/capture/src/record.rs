//! Capture record grammar

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Which factor of the decomposition a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatrixKind {
    /// The input matrix
    A,
    /// The orthogonal (unitary) factor
    Q,
    /// The upper-triangular factor
    R,
}

impl MatrixKind {
    pub const ALL: [MatrixKind; 3] = [MatrixKind::A, MatrixKind::Q, MatrixKind::R];

    pub fn from_tag_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::A),
            'Q' => Some(Self::Q),
            'R' => Some(Self::R),
            _ => None,
        }
    }

    pub fn tag_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::Q => 'Q',
            Self::R => 'R',
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag_char())
    }
}

/// Real or imaginary component of a complex capture row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Part {
    #[default]
    Real,
    Imaginary,
}

/// One capture record: a single matrix row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixBlock {
    pub kind: MatrixKind,
    /// 0-based decomposition instance
    pub instance: usize,
    /// Row index from the descriptor, if recorded
    pub row: Option<usize>,
    /// Declared row count of the matrix, if recorded
    pub rows: Option<usize>,
    pub part: Part,
    /// Raw fixed-point cells
    pub values: Vec<i64>,
    /// 1-based line number in the source
    pub line: usize,
}

impl MatrixBlock {
    /// Parse one line of a capture.
    ///
    /// The tag ends at the first `:` and the cell values start after the last
    /// one; anything in between is the descriptor. The line terminator and a
    /// closing `]` around the values are removed explicitly.
    pub fn parse_line(text: &str, line: usize) -> Result<Self, RecordError> {
        let text = text.trim_end_matches(['\r', '\n']);
        let (tag, rest) = text
            .split_once(':')
            .ok_or_else(|| RecordError::new(preview(text), "missing ':' after the record tag"))?;
        let tag = tag.trim();
        let (kind, instance) = parse_tag(tag)?;

        let (descriptor, values) = rest.rsplit_once(':').unwrap_or(("", rest));

        let mut block = MatrixBlock {
            kind,
            instance,
            row: None,
            rows: None,
            part: Part::Real,
            values: parse_values(values).map_err(|reason| RecordError::new(tag, reason))?,
            line,
        };
        block
            .apply_descriptor(descriptor)
            .map_err(|reason| RecordError::new(tag, reason))?;
        Ok(block)
    }

    /// `A3`, `Q0`, ...
    pub fn tag(&self) -> String {
        format!("{}{}", self.kind, self.instance)
    }

    /// Render the record in capture grammar (without a line terminator)
    pub fn to_line(&self) -> String {
        let mut descriptor = Vec::new();
        if let Some(row) = self.row {
            descriptor.push(format!("row {row}"));
        }
        if let Some(rows) = self.rows {
            descriptor.push(format!("rows {rows}"));
        }
        if self.part == Part::Imaginary {
            descriptor.push("im".to_string());
        }
        let descriptor = if descriptor.is_empty() {
            String::new()
        } else {
            format!(" {}", descriptor.join(" "))
        };
        let values: Vec<String> = self.values.iter().map(i64::to_string).collect();
        format!("{}:{}: {}]", self.tag(), descriptor, values.join(" "))
    }

    fn apply_descriptor(&mut self, descriptor: &str) -> Result<(), String> {
        let mut tokens = descriptor.split_whitespace();
        while let Some(token) = tokens.next() {
            match token {
                "row" => self.row = Some(descriptor_number(token, tokens.next())?),
                "rows" => self.rows = Some(descriptor_number(token, tokens.next())?),
                "re" | "real" => self.part = Part::Real,
                "im" | "imag" => self.part = Part::Imaginary,
                other => return Err(format!("unrecognised descriptor token {other:?}")),
            }
        }
        Ok(())
    }
}

fn parse_tag(tag: &str) -> Result<(MatrixKind, usize), RecordError> {
    let mut chars = tag.chars();
    let kind = chars
        .next()
        .and_then(MatrixKind::from_tag_char)
        .ok_or_else(|| RecordError::new(tag, "tag must start with A, Q or R"))?;
    let index = chars.as_str();
    let bad_index = || RecordError::new(tag, "tag must end in a 0-based instance index");

    // Plain decimal: no sign, no leading zeros
    let canonical = !index.is_empty()
        && index.bytes().all(|b| b.is_ascii_digit())
        && (index == "0" || !index.starts_with('0'));
    if !canonical {
        return Err(bad_index());
    }
    let instance = index.parse().map_err(|_| bad_index())?;
    Ok((kind, instance))
}

fn parse_values(field: &str) -> Result<Vec<i64>, String> {
    let field = field.trim();
    let field = field.strip_suffix(']').unwrap_or(field);
    let field = field.strip_prefix('[').unwrap_or(field);

    let values = field
        .split_whitespace()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| format!("cell {token:?} is not an integer"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err("record has no cell values".to_string());
    }
    Ok(values)
}

fn descriptor_number(key: &str, value: Option<&str>) -> Result<usize, String> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("descriptor '{key}' must be followed by a number"))
}

fn preview(text: &str) -> String {
    text.chars().take(16).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_line() {
        let block = MatrixBlock::parse_line("A12: row 1: 524288 -3 0]\n", 7).unwrap();
        assert_eq!(block.kind, MatrixKind::A);
        assert_eq!(block.instance, 12);
        assert_eq!(block.row, Some(1));
        assert_eq!(block.rows, None);
        assert_eq!(block.part, Part::Real);
        assert_eq!(block.values, vec![524288, -3, 0]);
        assert_eq!(block.line, 7);
    }

    #[test]
    fn test_parse_without_descriptor() {
        let block = MatrixBlock::parse_line("Q0: 1 2 3", 1).unwrap();
        assert_eq!(block.kind, MatrixKind::Q);
        assert_eq!(block.row, None);
        assert_eq!(block.values, vec![1, 2, 3]);

        let block = MatrixBlock::parse_line("R4:: [5 6]\r\n", 1).unwrap();
        assert_eq!(block.values, vec![5, 6]);
    }

    #[test]
    fn test_last_cell_survives_without_closing_bracket() {
        // The legacy two-character strip would have eaten the final digit here
        let block = MatrixBlock::parse_line("A0: row 0: 10 20\n", 1).unwrap();
        assert_eq!(block.values, vec![10, 20]);
    }

    #[test]
    fn test_parse_complex_descriptor() {
        let block = MatrixBlock::parse_line("R3: row 2 rows 4 im: 1 -1]", 9).unwrap();
        assert_eq!(block.row, Some(2));
        assert_eq!(block.rows, Some(4));
        assert_eq!(block.part, Part::Imaginary);
    }

    #[test]
    fn test_to_line_is_parseable() {
        let block = MatrixBlock {
            kind: MatrixKind::R,
            instance: 5,
            row: Some(0),
            rows: Some(2),
            part: Part::Imaginary,
            values: vec![-7, 8],
            line: 1,
        };
        let line = block.to_line();
        assert_eq!(line, "R5: row 0 rows 2 im: -7 8]");
        assert_eq!(MatrixBlock::parse_line(&line, 1).unwrap(), block);
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let err = MatrixBlock::parse_line("B0: row 0: 1 2]", 1).unwrap_err();
        assert_eq!(err.context, "B0");
    }

    #[test]
    fn test_rejects_bad_instance() {
        let err = MatrixBlock::parse_line("Ax: row 0: 1 2]", 1).unwrap_err();
        assert!(err.reason.contains("instance"));
    }

    #[test]
    fn test_instance_index_must_be_plain_decimal() {
        for line in ["A+0: 1]", "A00: 1]", "A01: 1]", "A: 1]", "A-1: 1]", "A 0: 1]"] {
            let err = MatrixBlock::parse_line(line, 1).unwrap_err();
            assert!(err.reason.contains("instance"), "{line}");
        }
        assert_eq!(MatrixBlock::parse_line("Q10: 1]", 1).unwrap().instance, 10);
        assert_eq!(MatrixBlock::parse_line("R0: 1]", 1).unwrap().instance, 0);
    }

    #[test]
    fn test_rejects_bad_cell() {
        let err = MatrixBlock::parse_line("A0: row 0: 1 2.5]", 1).unwrap_err();
        assert_eq!(err.context, "A0");
        assert!(err.reason.contains("2.5"));
    }

    #[test]
    fn test_rejects_missing_colon() {
        let err = MatrixBlock::parse_line("garbage line", 1).unwrap_err();
        assert_eq!(err.context, "garbage line");
    }

    #[test]
    fn test_rejects_empty_values() {
        assert!(MatrixBlock::parse_line("A0: row 0: ]", 1).is_err());
    }

    #[test]
    fn test_rejects_unknown_descriptor() {
        let err = MatrixBlock::parse_line("A0: col 0: 1]", 1).unwrap_err();
        assert!(err.reason.contains("col"));
        assert!(MatrixBlock::parse_line("A0: row x: 1]", 1).is_err());
    }
}
