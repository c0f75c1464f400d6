//! Whole-capture parsing and per-instance decoding

use std::collections::BTreeSet;
use std::path::Path;

use num_complex::Complex64;
use qrdcheck_fixed_point::{FixedPointFormat, FixedVector};

use crate::error::{CaptureError, Result};
use crate::matrix::{DecodedMatrix, Matrix};
use crate::record::{MatrixBlock, MatrixKind, Part};

/// All records of one capture log, in file order
#[derive(Debug, Clone)]
pub struct Capture {
    source_name: String,
    blocks: Vec<MatrixBlock>,
}

impl Capture {
    /// Parse capture text. `source_name` is only used in error messages.
    pub fn parse(source_name: impl Into<String>, text: &str) -> Result<Self> {
        let source_name = source_name.into();
        let mut blocks = Vec::new();

        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let block =
                MatrixBlock::parse_line(line, index + 1).map_err(|e| CaptureError::Parse {
                    source_name: source_name.clone(),
                    line: index + 1,
                    context: e.context,
                    reason: e.reason,
                })?;
            blocks.push(block);
        }

        if blocks.is_empty() {
            return Err(CaptureError::Empty { source_name });
        }

        tracing::debug!(
            source = %source_name,
            records = blocks.len(),
            "parsed capture"
        );

        Ok(Self {
            source_name,
            blocks,
        })
    }

    /// Read and parse a capture file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CaptureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path.display().to_string(), &text)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn blocks(&self) -> &[MatrixBlock] {
        &self.blocks
    }

    /// Number of decomposition instances: the final record's instance + 1.
    ///
    /// The producer writes instances in increasing order, so the last line
    /// carries the highest index.
    pub fn instance_count(&self) -> usize {
        self.blocks.last().map_or(0, |b| b.instance + 1)
    }

    /// Group records by instance and matrix kind in one forward pass.
    ///
    /// Rows keep file order. Records of neighbouring instances may be
    /// interleaved; a record whose instance is past the final record's
    /// instance means the producer broke the ordering and is rejected.
    /// An instance index with no records at all is `MissingMatrix`.
    pub fn group(&self) -> Result<Vec<InstanceBlocks<'_>>> {
        let count = self.instance_count();

        if let Some(block) = self.blocks.iter().find(|b| b.instance >= count) {
            return Err(CaptureError::Parse {
                source_name: self.source_name.clone(),
                line: block.line,
                context: block.tag(),
                reason: format!(
                    "instance {} is beyond the final record's instance {}",
                    block.instance,
                    count.saturating_sub(1)
                ),
            });
        }

        // Stops at most one past the number of distinct recorded instances,
        // so a corrupt final index never drives the allocation below
        let recorded: BTreeSet<usize> = self.blocks.iter().map(|b| b.instance).collect();
        if let Some(instance) = (0..count).find(|i| !recorded.contains(i)) {
            return Err(CaptureError::MissingMatrix {
                source_name: self.source_name.clone(),
                instance,
                kind: MatrixKind::A,
            });
        }

        let mut groups: Vec<InstanceBlocks<'_>> = (0..count).map(InstanceBlocks::new).collect();
        for block in &self.blocks {
            groups[block.instance].by_kind[block.kind.index()].push(block);
        }

        Ok(groups)
    }
}

/// The records of one instance, split by matrix kind
#[derive(Debug, Clone)]
pub struct InstanceBlocks<'a> {
    pub instance: usize,
    by_kind: [Vec<&'a MatrixBlock>; 3],
}

impl<'a> InstanceBlocks<'a> {
    fn new(instance: usize) -> Self {
        Self {
            instance,
            by_kind: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    /// Rows recorded for `kind`, in file order
    pub fn of(&self, kind: MatrixKind) -> &[&'a MatrixBlock] {
        &self.by_kind[kind.index()]
    }

    /// Decode A, Q and R for this instance
    pub fn decode(&self, source_name: &str, format: FixedPointFormat) -> Result<DecodedInstance> {
        let decode = |kind| {
            MatrixDecoder {
                source_name,
                instance: self.instance,
                kind,
                format,
            }
            .decode(self.of(kind))
        };

        Ok(DecodedInstance {
            instance: self.instance,
            a: decode(MatrixKind::A)?,
            q: decode(MatrixKind::Q)?,
            r: decode(MatrixKind::R)?,
        })
    }
}

/// Decoded A, Q and R of one instance
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInstance {
    pub instance: usize,
    pub a: DecodedMatrix,
    pub q: DecodedMatrix,
    pub r: DecodedMatrix,
}

impl DecodedInstance {
    /// True when any factor carries imaginary rows
    pub fn is_complex(&self) -> bool {
        self.a.is_complex() || self.q.is_complex() || self.r.is_complex()
    }
}

struct MatrixDecoder<'s> {
    source_name: &'s str,
    instance: usize,
    kind: MatrixKind,
    format: FixedPointFormat,
}

impl MatrixDecoder<'_> {
    fn decode(&self, blocks: &[&MatrixBlock]) -> Result<DecodedMatrix> {
        if blocks.is_empty() {
            return Err(CaptureError::MissingMatrix {
                source_name: self.source_name.to_string(),
                instance: self.instance,
                kind: self.kind,
            });
        }

        let (real, imaginary): (Vec<&MatrixBlock>, Vec<&MatrixBlock>) =
            blocks.iter().copied().partition(|b| b.part == Part::Real);

        if real.is_empty() {
            return Err(self.shape_error("imaginary rows recorded without real rows".to_string()));
        }
        let re = self.stack(&real)?;
        if imaginary.is_empty() {
            return Ok(DecodedMatrix::Real(re));
        }

        let im = self.stack(&imaginary)?;
        re.zip_map(&im, Complex64::new)
            .map(DecodedMatrix::Complex)
            .ok_or_else(|| {
                self.shape_error(format!(
                    "real part is {}x{} but imaginary part is {}x{}",
                    re.rows(),
                    re.cols(),
                    im.rows(),
                    im.cols()
                ))
            })
    }

    /// Stack rows in file order after checking them against the descriptor
    fn stack(&self, blocks: &[&MatrixBlock]) -> Result<Matrix<f64>> {
        if let Some(declared) = blocks[0].rows {
            if declared != blocks.len() {
                return Err(self.shape_error(format!(
                    "declares {declared} rows but {} were captured",
                    blocks.len()
                )));
            }
        }

        for (position, block) in blocks.iter().enumerate() {
            if let Some(row) = block.row {
                if row != position {
                    return Err(self.shape_error(format!(
                        "line {} records row {row} where row {position} was expected",
                        block.line
                    )));
                }
            }
        }

        let rows = blocks
            .iter()
            .map(|b| FixedVector::from_raw(b.values.clone(), self.format).to_f64_vec())
            .collect();
        Matrix::from_rows(rows).map_err(|e| self.shape_error(e.to_string()))
    }

    fn shape_error(&self, reason: String) -> CaptureError {
        CaptureError::Shape {
            source_name: self.source_name.to_string(),
            instance: self.instance,
            kind: self.kind,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_2X2: &str = "\
A0: row 0: 524288 0]
A0: row 1: 0 524288]
Q0: row 0: 524288 0]
Q0: row 1: 0 524288]
R0: row 0: 524288 0]
R0: row 1: 0 524288]
";

    #[test]
    fn test_parse_and_decode_identity() {
        let capture = Capture::parse("identity.txt", IDENTITY_2X2).unwrap();
        assert_eq!(capture.blocks().len(), 6);
        assert_eq!(capture.instance_count(), 1);

        let groups = capture.group().unwrap();
        assert_eq!(groups.len(), 1);
        let decoded = groups[0]
            .decode(capture.source_name(), FixedPointFormat::q3_19())
            .unwrap();

        let expected = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(decoded.a, DecodedMatrix::Real(expected));
        assert!(!decoded.is_complex());
    }

    #[test]
    fn test_interleaved_instances_keep_file_order() {
        let text = "\
A0: row 0: 1 2]
A1: row 0: 5 6]
A0: row 1: 3 4]
A1: row 1: 7 8]
";
        let capture = Capture::parse("interleaved.txt", text).unwrap();
        let groups = capture.group().unwrap();
        assert_eq!(groups.len(), 2);

        let rows: Vec<&Vec<i64>> = groups[0].of(MatrixKind::A).iter().map(|b| &b.values).collect();
        assert_eq!(rows, vec![&vec![1, 2], &vec![3, 4]]);
        let rows: Vec<&Vec<i64>> = groups[1].of(MatrixKind::A).iter().map(|b| &b.values).collect();
        assert_eq!(rows, vec![&vec![5, 6], &vec![7, 8]]);
    }

    #[test]
    fn test_missing_r_matrix() {
        let text = "\
A0: row 0: 1]
Q0: row 0: 1]
";
        let capture = Capture::parse("no_r.txt", text).unwrap();
        let groups = capture.group().unwrap();
        let err = groups[0]
            .decode(capture.source_name(), FixedPointFormat::q3_19())
            .unwrap_err();

        match err {
            CaptureError::MissingMatrix {
                instance,
                kind,
                source_name,
            } => {
                assert_eq!(instance, 0);
                assert_eq!(kind, MatrixKind::R);
                assert_eq!(source_name, "no_r.txt");
            }
            other => panic!("expected MissingMatrix, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_reports_line_and_tag() {
        let text = "A0: row 0: 1 2]\n\nQ0: row 0: 1 x]\n";
        let err = Capture::parse("bad.txt", text).unwrap_err();
        match err {
            CaptureError::Parse {
                source_name,
                line,
                context,
                ..
            } => {
                assert_eq!(source_name, "bad.txt");
                assert_eq!(line, 3);
                assert_eq!(context, "Q0");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_capture() {
        assert!(matches!(
            Capture::parse("empty.txt", "\n\n"),
            Err(CaptureError::Empty { .. })
        ));
    }

    #[test]
    fn test_instance_beyond_final_record() {
        let text = "A3: row 0: 1]\nA0: row 0: 1]\n";
        let capture = Capture::parse("order.txt", text).unwrap();
        assert_eq!(capture.instance_count(), 1);
        assert!(matches!(
            capture.group(),
            Err(CaptureError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_unrecorded_instance_before_huge_final_index() {
        let text = "A0: 1]\nQ0: 1]\nR99999999999999: 1]\n";
        let capture = Capture::parse("gap.txt", text).unwrap();
        assert_eq!(capture.instance_count(), 100_000_000_000_000);

        match capture.group() {
            Err(CaptureError::MissingMatrix {
                instance,
                kind,
                source_name,
            }) => {
                assert_eq!(instance, 1);
                assert_eq!(kind, MatrixKind::A);
                assert_eq!(source_name, "gap.txt");
            }
            other => panic!("expected MissingMatrix, got {other:?}"),
        }
    }

    #[test]
    fn test_skipped_instance_is_missing() {
        let text = "A0: 1]\nQ0: 1]\nR0: 1]\nA2: 1]\nQ2: 1]\nR2: 1]\n";
        let capture = Capture::parse("skip.txt", text).unwrap();
        assert!(matches!(
            capture.group(),
            Err(CaptureError::MissingMatrix { instance: 1, .. })
        ));
    }

    #[test]
    fn test_declared_rows_must_match() {
        let text = "\
A0: row 0 rows 3: 1 2]
A0: row 1: 3 4]
Q0: 1]
R0: 1]
";
        let capture = Capture::parse("rows.txt", text).unwrap();
        let groups = capture.group().unwrap();
        let err = groups[0]
            .decode(capture.source_name(), FixedPointFormat::q3_19())
            .unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Shape {
                kind: MatrixKind::A,
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_order_row_index() {
        let text = "A0: row 1: 1]\nA0: row 0: 2]\nQ0: 1]\nR0: 1]\n";
        let capture = Capture::parse("rows.txt", text).unwrap();
        let groups = capture.group().unwrap();
        assert!(matches!(
            groups[0].decode(capture.source_name(), FixedPointFormat::q3_19()),
            Err(CaptureError::Shape { .. })
        ));
    }

    #[test]
    fn test_ragged_rows_are_shape_errors() {
        let text = "A0: 1 2]\nA0: 3]\nQ0: 1]\nR0: 1]\n";
        let capture = Capture::parse("ragged.txt", text).unwrap();
        let groups = capture.group().unwrap();
        let err = groups[0]
            .decode(capture.source_name(), FixedPointFormat::q3_19())
            .unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 cells"));
    }

    #[test]
    fn test_complex_rows() {
        let text = "\
A0: row 0 re: 524288 0]
A0: row 0 im: 0 262144]
Q0: row 0: 524288]
R0: row 0: 524288 0]
";
        let capture = Capture::parse("complex.txt", text).unwrap();
        let groups = capture.group().unwrap();
        let decoded = groups[0]
            .decode(capture.source_name(), FixedPointFormat::q3_19())
            .unwrap();

        assert!(decoded.is_complex());
        match &decoded.a {
            DecodedMatrix::Complex(m) => {
                assert_eq!(m.get(0, 0), Some(Complex64::new(1.0, 0.0)));
                assert_eq!(m.get(0, 1), Some(Complex64::new(0.0, 0.5)));
            }
            other => panic!("expected complex A, got {other:?}"),
        }
        assert!(!decoded.q.is_complex());
    }

    #[test]
    fn test_complex_part_shape_mismatch() {
        let text = "A0: re: 1 2]\nA0: im: 1]\nQ0: 1]\nR0: 1]\n";
        let capture = Capture::parse("complex.txt", text).unwrap();
        let groups = capture.group().unwrap();
        assert!(matches!(
            groups[0].decode(capture.source_name(), FixedPointFormat::q3_19()),
            Err(CaptureError::Shape { .. })
        ));
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let err = Capture::from_path(&path).unwrap_err();
        assert!(matches!(err, CaptureError::Io { .. }));
        assert!(err.to_string().contains("absent.txt"));
    }

    #[test]
    fn test_from_path_uses_path_as_source_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.txt");
        std::fs::write(&path, IDENTITY_2X2).unwrap();
        let capture = Capture::from_path(&path).unwrap();
        assert!(capture.source_name().ends_with("capture.txt"));
    }
}
