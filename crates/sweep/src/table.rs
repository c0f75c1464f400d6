//! Result tables and their CSV rendering

use serde::Serialize;

/// One sweep-parameter value and its error per fractional width
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub key: String,
    pub values: Vec<f64>,
}

/// Error statistic tabulated against a swept parameter (rows) and the
/// fractional bit width (columns)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    /// Row parameter name, e.g. `k` or `i`
    pub parameter: String,
    /// Fractional bit widths, one per column
    pub columns: Vec<u8>,
    pub rows: Vec<TableRow>,
}

impl ResultTable {
    pub fn new(parameter: impl Into<String>, columns: Vec<u8>) -> Self {
        Self {
            parameter: parameter.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, key: impl Into<String>, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.push(TableRow {
            key: key.into(),
            values,
        });
    }

    /// Cell for row `key` and fractional width `n`
    pub fn get(&self, key: &str, n: u8) -> Option<f64> {
        let column = self.columns.iter().position(|&c| c == n)?;
        let row = self.rows.iter().find(|r| r.key == key)?;
        row.values.get(column).copied()
    }

    /// Render as CSV.
    ///
    /// The header cell is the parameter name followed by a literal `\n`
    /// (backslash, n), which downstream plotting scripts expect. Every data
    /// row carries a trailing comma and values are printed with 20 decimals.
    pub fn to_csv(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(u8::to_string).collect();
        let mut csv = format!("{}\\n,{}\n", self.parameter, columns.join(","));
        for row in &self.rows {
            csv.push_str(&row.key);
            csv.push(',');
            for value in &row.values {
                csv.push_str(&format!("{value:.20},"));
            }
            csv.push('\n');
        }
        csv
    }
}
