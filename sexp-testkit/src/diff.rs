//! Comparing an outcome against an expectation.

use std::fmt;

use crate::runner::Outcome;
use crate::scenario::Expectation;

/// Differences between an expectation and an actual outcome.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiff {
    /// List of mismatches found.
    pub mismatches: Vec<Mismatch>,
}

/// A mismatch between expected and actual outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    /// The outcome kind differs (e.g. expected a matrix, got an error).
    OutcomeKind { expected: String, actual: String },

    /// A failure was expected with this error type.
    ErrorType { expected: String, actual: Option<String> },

    /// An operation failed that was expected to succeed.
    UnexpectedError { error_type: String, message: String },

    /// Predicate value.
    Value { expected: bool, actual: bool },

    /// Matrix dimensions.
    Shape { expected: [usize; 2], actual: [usize; 2] },

    /// Vector or list length.
    Length { expected: usize, actual: usize },

    /// Number of rows in the expected cells.
    RowCount { expected: usize, actual: usize },

    /// Number of cells in one expected row.
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// One matrix cell.
    Cell {
        row: usize,
        col: usize,
        expected: String,
        actual: String,
    },

    /// One vector element.
    Element {
        index: usize,
        expected: String,
        actual: String,
    },

    /// Truncation flag of the fill pass. `None` means no fill pass ran.
    Truncated { expected: bool, actual: Option<bool> },

    /// Cells written by the fill pass.
    Written { expected: usize, actual: Option<usize> },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::OutcomeKind { expected, actual } => {
                write!(f, "Outcome: expected {}, got {}", expected, actual)
            }
            Mismatch::ErrorType { expected, actual } => match actual {
                Some(actual) => write!(f, "Error type: expected {}, got {}", expected, actual),
                None => write!(f, "Error type: expected {}, but the operation succeeded", expected),
            },
            Mismatch::UnexpectedError { error_type, message } => {
                write!(f, "Unexpected {} error: {}", error_type, message)
            }
            Mismatch::Value { expected, actual } => {
                write!(f, "Value: expected {}, got {}", expected, actual)
            }
            Mismatch::Shape { expected, actual } => write!(
                f,
                "Shape: expected {}x{}, got {}x{}",
                expected[0], expected[1], actual[0], actual[1]
            ),
            Mismatch::Length { expected, actual } => {
                write!(f, "Length: expected {}, got {}", expected, actual)
            }
            Mismatch::RowCount { expected, actual } => {
                write!(f, "Rows: expected {}, got {}", expected, actual)
            }
            Mismatch::RowLength {
                row,
                expected,
                actual,
            } => write!(
                f,
                "Row {} length: expected {}, got {}",
                row, expected, actual
            ),
            Mismatch::Cell {
                row,
                col,
                expected,
                actual,
            } => write!(
                f,
                "Cell [{}, {}]: expected {}, got {}",
                row, col, expected, actual
            ),
            Mismatch::Element {
                index,
                expected,
                actual,
            } => write!(f, "Element {}: expected {}, got {}", index, expected, actual),
            Mismatch::Truncated { expected, actual } => match actual {
                Some(actual) => write!(f, "Truncated: expected {}, got {}", expected, actual),
                None => write!(f, "Truncated: expected {}, but no fill pass ran", expected),
            },
            Mismatch::Written { expected, actual } => match actual {
                Some(actual) => write!(f, "Cells written: expected {}, got {}", expected, actual),
                None => write!(f, "Cells written: expected {}, but no fill pass ran", expected),
            },
        }
    }
}

fn compare_cells(expected: &[Vec<String>], actual: &[Vec<String>], out: &mut Vec<Mismatch>) {
    if expected.len() != actual.len() {
        out.push(Mismatch::RowCount {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    for (row, (exp_row, act_row)) in expected.iter().zip(actual).enumerate() {
        if exp_row.len() != act_row.len() {
            out.push(Mismatch::RowLength {
                row,
                expected: exp_row.len(),
                actual: act_row.len(),
            });
        }
        for (col, (exp, act)) in exp_row.iter().zip(act_row).enumerate() {
            if exp != act {
                out.push(Mismatch::Cell {
                    row,
                    col,
                    expected: exp.clone(),
                    actual: act.clone(),
                });
            }
        }
    }
}

fn compare_values(expected: &[String], actual: &[String], out: &mut Vec<Mismatch>) {
    if expected.len() != actual.len() {
        out.push(Mismatch::Length {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    for (index, (exp, act)) in expected.iter().zip(actual).enumerate() {
        if exp != act {
            out.push(Mismatch::Element {
                index,
                expected: exp.clone(),
                actual: act.clone(),
            });
        }
    }
}

impl SnapshotDiff {
    /// Compare `actual` with `expect`. Fields left unset in `expect` are
    /// not checked.
    pub fn check(expect: &Expectation, actual: &Outcome) -> Self {
        let mut mismatches = Vec::new();

        if let Some(expected) = &expect.error_type {
            let actual_type = match actual {
                Outcome::Error { error_type, .. } => Some(error_type.clone()),
                _ => None,
            };
            if actual_type.as_deref() != Some(expected.as_str()) {
                mismatches.push(Mismatch::ErrorType {
                    expected: expected.clone(),
                    actual: actual_type,
                });
            }
            return Self { mismatches };
        }

        if let Outcome::Error { error_type, message } = actual {
            mismatches.push(Mismatch::UnexpectedError {
                error_type: error_type.clone(),
                message: message.clone(),
            });
            return Self { mismatches };
        }

        if let Some(absent) = expect.absent {
            let is_absent = matches!(actual, Outcome::Absent);
            if absent != is_absent {
                mismatches.push(Mismatch::OutcomeKind {
                    expected: if absent { "absent" } else { "a value" }.to_string(),
                    actual: actual.label().to_string(),
                });
            }
        }

        match actual {
            Outcome::Bool { value } => {
                if let Some(expected) = expect.value {
                    if expected != *value {
                        mismatches.push(Mismatch::Value {
                            expected,
                            actual: *value,
                        });
                    }
                }
            }
            Outcome::List { len } => {
                if let Some(expected) = expect.len {
                    if expected != *len {
                        mismatches.push(Mismatch::Length {
                            expected,
                            actual: *len,
                        });
                    }
                }
            }
            Outcome::Vector(snapshot) => {
                if let Some(expected) = expect.len {
                    if expected != snapshot.len() {
                        mismatches.push(Mismatch::Length {
                            expected,
                            actual: snapshot.len(),
                        });
                    }
                }
                if let Some(values) = &expect.values {
                    compare_values(values, &snapshot.values, &mut mismatches);
                }
            }
            Outcome::Matrix(snapshot) => {
                let shape = [snapshot.rows, snapshot.cols];
                if let Some(expected) = expect.shape {
                    if expected != shape {
                        mismatches.push(Mismatch::Shape {
                            expected,
                            actual: shape,
                        });
                    }
                }
                if let Some(cells) = &expect.cells {
                    compare_cells(cells, &snapshot.cells, &mut mismatches);
                }
                if let Some(expected) = expect.truncated {
                    let actual = snapshot.fill.map(|r| r.truncated);
                    if actual != Some(expected) {
                        mismatches.push(Mismatch::Truncated { expected, actual });
                    }
                }
                if let Some(expected) = expect.written {
                    let actual = snapshot.fill.map(|r| r.written);
                    if actual != Some(expected) {
                        mismatches.push(Mismatch::Written { expected, actual });
                    }
                }
            }
            Outcome::Absent | Outcome::Error { .. } => {}
        }

        let wants_matrix = expect.shape.is_some() || expect.cells.is_some();
        if wants_matrix && !matches!(actual, Outcome::Matrix(_)) {
            mismatches.push(Mismatch::OutcomeKind {
                expected: "matrix".to_string(),
                actual: actual.label().to_string(),
            });
        }
        if expect.values.is_some() && !matches!(actual, Outcome::Vector(_)) {
            mismatches.push(Mismatch::OutcomeKind {
                expected: "vector".to_string(),
                actual: actual.label().to_string(),
            });
        }

        Self { mismatches }
    }

    /// Check if there are no mismatches.
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Get the number of mismatches.
    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    /// Format the diff as a human-readable report.
    pub fn report(&self) -> String {
        if self.is_empty() {
            return "No differences found.".to_string();
        }

        let mut lines = vec![format!("Found {} differences:", self.mismatches.len())];
        for m in &self.mismatches {
            lines.push(format!("  - {}", m));
        }
        lines.join("\n")
    }
}
