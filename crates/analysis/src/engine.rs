//! Reconstruction and per-capture analysis

use std::path::Path;

use qrdcheck_capture::{Capture, DecodedInstance, DecodedMatrix, Matrix, ShapeMismatch};

use crate::config::{AnalysisConfig, ErrorMode};
use crate::error::{AnalysisError, Result};
use crate::metrics::{absolute_errors, relative_errors};
use crate::report::{ErrorReport, InstanceReport};

/// Everything computed for one instance, handed to an observer before the
/// decoded matrices are dropped
#[derive(Debug)]
pub struct InstanceView<'a> {
    pub decoded: &'a DecodedInstance,
    pub reconstructed: &'a DecodedMatrix,
    pub errors: &'a Matrix<f64>,
    pub report: &'a InstanceReport,
}

/// `Q × R`, in complex arithmetic if either factor is complex
pub fn reconstruct(decoded: &DecodedInstance) -> std::result::Result<DecodedMatrix, ShapeMismatch> {
    match (&decoded.q, &decoded.r) {
        (DecodedMatrix::Real(q), DecodedMatrix::Real(r)) => q.matmul(r).map(DecodedMatrix::Real),
        (q, r) => q
            .to_complex()
            .matmul(&r.to_complex())
            .map(DecodedMatrix::Complex),
    }
}

/// Element errors of `reconstructed` against `original` under `config.mode`.
/// `None` if the shapes differ.
pub fn element_errors(
    original: &DecodedMatrix,
    reconstructed: &DecodedMatrix,
    config: &AnalysisConfig,
) -> Option<Matrix<f64>> {
    match (original, reconstructed, config.mode) {
        (DecodedMatrix::Real(a), DecodedMatrix::Real(a_hat), ErrorMode::Relative) => {
            relative_errors(a, a_hat, config.clamp_divisor)
        }
        (DecodedMatrix::Real(a), DecodedMatrix::Real(a_hat), ErrorMode::Absolute) => {
            absolute_errors(a, a_hat)
        }
        (a, a_hat, ErrorMode::Relative) => {
            relative_errors(&a.to_complex(), &a_hat.to_complex(), config.clamp_divisor)
        }
        (a, a_hat, ErrorMode::Absolute) => absolute_errors(&a.to_complex(), &a_hat.to_complex()),
    }
}

/// Analyse every instance of a capture
pub fn analyze_capture(capture: &Capture, config: &AnalysisConfig) -> Result<ErrorReport> {
    analyze_capture_with(capture, config, |_| {})
}

/// Analyse every instance of a capture, showing each instance to `observer`.
///
/// Any parse, missing-matrix or shape error aborts the whole capture.
pub fn analyze_capture_with<F>(
    capture: &Capture,
    config: &AnalysisConfig,
    mut observer: F,
) -> Result<ErrorReport>
where
    F: FnMut(&InstanceView<'_>),
{
    let source_name = capture.source_name();
    let mut instances = Vec::with_capacity(capture.instance_count());

    for group in capture.group()? {
        let decoded = group.decode(source_name, config.format)?;
        let shape_error = |reason: String| AnalysisError::Shape {
            source_name: source_name.to_string(),
            instance: decoded.instance,
            reason,
        };

        let reconstructed = reconstruct(&decoded).map_err(|e| shape_error(format!("Q x R: {e}")))?;
        if reconstructed.shape() != decoded.a.shape() {
            let (rows, cols) = reconstructed.shape();
            let (a_rows, a_cols) = decoded.a.shape();
            return Err(shape_error(format!(
                "Q x R is {rows}x{cols} but A is {a_rows}x{a_cols}"
            )));
        }

        let errors = element_errors(&decoded.a, &reconstructed, config)
            .ok_or_else(|| shape_error("A and Q x R differ in shape".to_string()))?;
        let report =
            InstanceReport::from_errors(decoded.instance, errors.as_slice().to_vec(), config.mode);

        tracing::debug!(
            source = %source_name,
            instance = report.instance,
            worst = report.worst,
            mean = report.mean,
            "instance analysed"
        );

        observer(&InstanceView {
            decoded: &decoded,
            reconstructed: &reconstructed,
            errors: &errors,
            report: &report,
        });
        instances.push(report);
    }

    Ok(ErrorReport::aggregate(
        source_name,
        config.format,
        config.mode,
        instances,
    ))
}

/// Read, parse and analyse a capture file
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<ErrorReport> {
    let capture = Capture::from_path(path)?;
    analyze_capture(&capture, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrdcheck_capture::{CaptureError, MatrixKind};
    use qrdcheck_fixed_point::FixedPointFormat;

    fn identity_capture(instances: usize) -> String {
        let mut text = String::new();
        for i in 0..instances {
            for kind in ["A", "Q", "R"] {
                text.push_str(&format!("{kind}{i}: row 0: 524288 0]\n"));
                text.push_str(&format!("{kind}{i}: row 1: 0 524288]\n"));
            }
        }
        text
    }

    #[test]
    fn test_identity_reconstruction_is_exact() {
        let capture = Capture::parse("identity.txt", &identity_capture(2)).unwrap();

        for mode in [ErrorMode::Relative, ErrorMode::Absolute] {
            let config = AnalysisConfig::new(FixedPointFormat::q3_19(), mode);
            let report = analyze_capture(&capture, &config).unwrap();

            assert_eq!(report.instance_count(), 2);
            for instance in &report.instances {
                assert_eq!(instance.worst, 0.0);
                assert_eq!(instance.mean, 0.0);
            }
            assert_eq!(report.worst, 0.0);
            assert_eq!(report.mean, 0.0);
        }
    }

    #[test]
    fn test_observer_sees_every_instance() {
        let capture = Capture::parse("identity.txt", &identity_capture(3)).unwrap();
        let mut seen = Vec::new();
        analyze_capture_with(&capture, &AnalysisConfig::default(), |view| {
            assert_eq!(view.reconstructed, &view.decoded.a);
            assert_eq!(view.errors.shape(), (2, 2));
            seen.push(view.report.instance);
        })
        .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_rectangular_absolute_error() {
        // Q = I (2x2), R = [[1, 0.5, 0], [0, 1, 0.25]], A off by 2^-19 in one cell
        let text = "\
A0: row 0: 524288 262144 1]
A0: row 1: 0 524288 131072]
Q0: row 0: 524288 0]
Q0: row 1: 0 524288]
R0: row 0: 524288 262144 0]
R0: row 1: 0 524288 131072]
";
        let capture = Capture::parse("rect.txt", text).unwrap();
        let config = AnalysisConfig::new(FixedPointFormat::q3_19(), ErrorMode::Absolute);
        let report = analyze_capture(&capture, &config).unwrap();

        let lsb = FixedPointFormat::q3_19().resolution();
        assert_eq!(report.worst, lsb);
        assert!((report.mean - lsb / 6.0).abs() < 1e-18);
        assert!(report.std_dev.unwrap() > 0.0);
    }

    #[test]
    fn test_complex_reconstruction() {
        // Q = [i], R = [-i, 1] so Q x R = [1, i]
        let text = "\
A0: row 0 re: 524288 0]
A0: row 0 im: 0 524288]
Q0: row 0 re: 0]
Q0: row 0 im: 524288]
R0: row 0 re: 0 524288]
R0: row 0 im: -524288 0]
";
        let capture = Capture::parse("complex.txt", text).unwrap();
        let config = AnalysisConfig::new(FixedPointFormat::q3_19(), ErrorMode::Absolute);
        let mut complex = false;
        let report = analyze_capture_with(&capture, &config, |view| {
            complex = view.reconstructed.is_complex();
        })
        .unwrap();

        assert!(complex);
        assert_eq!(report.worst, 0.0);
        assert_eq!(report.std_dev, Some(0.0));
    }

    #[test]
    fn test_all_zero_r_reports_nan_worst() {
        // A = Q = I, R = 0: the near-zero floor collapses to 0 and 0/0 appears
        let text = "\
A0: row 0: 524288 0]
A0: row 1: 0 524288]
Q0: row 0: 524288 0]
Q0: row 1: 0 524288]
R0: row 0: 0 0]
R0: row 1: 0 0]
";
        let capture = Capture::parse("zero_r.txt", text).unwrap();
        let report = analyze_capture(&capture, &AnalysisConfig::default()).unwrap();

        assert!(report.instances[0].worst.is_nan());
        assert!(report.instances[0].mean.is_nan());
        assert!(report.worst.is_nan());
        assert!(report.mean.is_nan());
    }

    #[test]
    fn test_inner_dimension_mismatch_is_shape_error() {
        let text = "A0: 1 2]\nQ0: 1 2]\nR0: 1 2]\n";
        let capture = Capture::parse("bad_inner.txt", text).unwrap();
        let err = analyze_capture(&capture, &AnalysisConfig::default()).unwrap_err();
        match err {
            AnalysisError::Shape {
                source_name,
                instance,
                reason,
            } => {
                assert_eq!(source_name, "bad_inner.txt");
                assert_eq!(instance, 0);
                assert!(reason.contains("1x2 by 1x2"));
            }
            other => panic!("expected Shape, got {other:?}"),
        }
    }

    #[test]
    fn test_reconstruction_not_matching_a_is_shape_error() {
        let text = "A0: 1 2 3]\nQ0: 1]\nR0: 1 2]\n";
        let capture = Capture::parse("bad_a.txt", text).unwrap();
        let err = analyze_capture(&capture, &AnalysisConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Q x R is 1x2 but A is 1x3"));
    }

    #[test]
    fn test_missing_r_aborts_capture() {
        let text = "A0: 1]\nQ0: 1]\n";
        let capture = Capture::parse("no_r.txt", text).unwrap();
        let err = analyze_capture(&capture, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Capture(CaptureError::MissingMatrix {
                instance: 0,
                kind: MatrixKind::R,
                ..
            })
        ));
    }
}
