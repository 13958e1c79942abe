//! Test scenario definitions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use sexp_core::{Config, MemoryRuntime, Session};

use crate::diff::SnapshotDiff;
use crate::fixture::Fixture;
use crate::runner::{run_op, Op, Outcome};

/// A conformance scenario.
///
/// Builds one fixture, runs one operation on it, and checks the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,

    /// Description of what this scenario tests.
    #[serde(default)]
    pub description: String,

    /// Session configuration.
    #[serde(default)]
    pub config: Config,

    /// The value the operation runs on.
    pub fixture: Fixture,

    /// Operation to run.
    pub op: Op,

    /// Expected outcome.
    #[serde(default)]
    pub expect: Expectation,
}

/// Expected outcome. Unset fields are not checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectation {
    /// The operation reports "not convertible".
    pub absent: Option<bool>,

    /// Predicate result.
    pub value: Option<bool>,

    /// The operation fails with this error type.
    pub error_type: Option<String>,

    /// Matrix `[rows, cols]`.
    pub shape: Option<[usize; 2]>,

    /// Vector or list length.
    pub len: Option<usize>,

    /// Rendered vector elements.
    pub values: Option<Vec<String>>,

    /// Rendered matrix cells, row-major.
    pub cells: Option<Vec<Vec<String>>>,

    /// Fill pass stopped early.
    pub truncated: Option<bool>,

    /// Cells written by the fill pass.
    pub written: Option<usize>,
}

/// Result of running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub outcome: Outcome,
    pub diff: SnapshotDiff,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.diff.is_empty()
    }
}

impl Scenario {
    /// Create a new scenario builder.
    pub fn builder(name: &str) -> ScenarioBuilder {
        ScenarioBuilder::new(name)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse scenario TOML")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse scenario JSON")
    }

    /// Load a scenario file; `.json` files are read as JSON, anything else
    /// as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let scenario = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        };
        scenario.with_context(|| format!("in {}", path.display()))
    }

    /// Build the fixture in a fresh runtime, run the operation, and compare.
    ///
    /// A session refused by the access policy is reported as the outcome
    /// `permission_denied`.
    pub fn run(&self) -> Result<ScenarioResult> {
        log::debug!("Running scenario {}", self.name);
        let outcome = match Session::open(MemoryRuntime::new(), self.config.clone()) {
            Ok(session) => {
                let raw = self
                    .fixture
                    .build(session.runtime())
                    .with_context(|| format!("scenario {}: fixture", self.name))?;
                run_op(&session.handle(raw), self.op)?
            }
            Err(e) => Outcome::from_error(&e),
        };
        let diff = SnapshotDiff::check(&self.expect, &outcome);
        Ok(ScenarioResult {
            name: self.name.clone(),
            outcome,
            diff,
        })
    }
}

/// Load every `.toml` and `.json` scenario in `dir`, sorted by file name.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Scenario>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext == "toml" || ext == "json")
        })
        .collect();
    paths.sort();
    paths.iter().map(Scenario::load).collect()
}

/// Builder for creating scenarios.
pub struct ScenarioBuilder {
    name: String,
    description: String,
    config: Config,
    fixture: Fixture,
    op: Op,
    expect: Expectation,
}

impl ScenarioBuilder {
    /// Create a new builder.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            config: Config::default(),
            fixture: Fixture::Nil,
            op: Op::IsVector,
            expect: Expectation::default(),
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn fixture(mut self, fixture: Fixture) -> Self {
        self.fixture = fixture;
        self
    }

    pub fn op(mut self, op: Op) -> Self {
        self.op = op;
        self
    }

    pub fn expect_absent(mut self) -> Self {
        self.expect.absent = Some(true);
        self
    }

    pub fn expect_value(mut self, value: bool) -> Self {
        self.expect.value = Some(value);
        self
    }

    pub fn expect_error(mut self, error_type: &str) -> Self {
        self.expect.error_type = Some(error_type.to_string());
        self
    }

    pub fn expect_shape(mut self, rows: usize, cols: usize) -> Self {
        self.expect.shape = Some([rows, cols]);
        self
    }

    pub fn expect_len(mut self, len: usize) -> Self {
        self.expect.len = Some(len);
        self
    }

    pub fn expect_values(mut self, values: &[&str]) -> Self {
        self.expect.values = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn expect_cells(mut self, cells: &[&[&str]]) -> Self {
        self.expect.cells = Some(
            cells
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        self
    }

    pub fn expect_truncated(mut self, truncated: bool) -> Self {
        self.expect.truncated = Some(truncated);
        self
    }

    pub fn expect_written(mut self, written: usize) -> Self {
        self.expect.written = Some(written);
        self
    }

    /// Build the scenario.
    pub fn build(self) -> Scenario {
        Scenario {
            name: self.name,
            description: self.description,
            config: self.config,
            fixture: self.fixture,
            op: self.op,
            expect: self.expect,
        }
    }
}

/// Standard scenarios for conformance testing.
pub mod standard {
    use super::*;
    use sexp_core::FillStride;

    pub fn null_predicate() -> Scenario {
        Scenario::builder("null_predicate")
            .description("Is* on an absent handle fails")
            .fixture(Fixture::Null)
            .op(Op::IsVector)
            .expect_error("null_handle")
            .build()
    }

    pub fn symbol_not_convertible() -> Scenario {
        Scenario::builder("symbol_not_convertible")
            .description("As* on a non-vector reports absence")
            .fixture(Fixture::Symbol {
                name: "x".to_string(),
            })
            .op(Op::AsNumericMatrix)
            .expect_absent()
            .build()
    }

    pub fn plain_vector_column() -> Scenario {
        Scenario::builder("plain_vector_column")
            .description("A plain vector becomes an N x 1 matrix")
            .fixture(Fixture::numeric(vec![1.5, 2.5, 3.5]))
            .op(Op::AsNumericMatrix)
            .expect_shape(3, 1)
            .expect_cells(&[&["1.5"], &["2.5"], &["3.5"]])
            .expect_truncated(false)
            .build()
    }

    pub fn square_type_change() -> Scenario {
        Scenario::builder("square_type_change")
            .description("A square integer matrix as character keeps column-major order")
            .fixture(Fixture::integer_matrix(vec![1, 2, 3, 4], 2, 2))
            .op(Op::AsCharacterMatrix)
            .expect_shape(2, 2)
            .expect_cells(&[&["1", "3"], &["2", "4"]])
            .expect_written(4)
            .build()
    }

    pub fn wide_type_change() -> Scenario {
        Scenario::builder("wide_type_change")
            .description("A 2x3 logical matrix as integer uses the column-count stride")
            .fixture(Fixture::logical_matrix(
                vec![true, false, true, true, false, false],
                2,
                3,
            ))
            .op(Op::AsIntegerMatrix)
            .expect_shape(2, 3)
            .expect_cells(&[&["1", "1", "0"], &["0", "0", "0"]])
            .expect_truncated(true)
            .expect_written(4)
            .build()
    }

    pub fn wide_row_count_stride() -> Scenario {
        let mut config = Config::default();
        config.fill.stride = FillStride::RowCount;
        Scenario::builder("wide_row_count_stride")
            .description("The row-count stride copies a wide matrix in storage order")
            .config(config)
            .fixture(Fixture::logical_matrix(
                vec![true, false, true, true, false, false],
                2,
                3,
            ))
            .op(Op::AsIntegerMatrix)
            .expect_cells(&[&["1", "1", "0"], &["0", "1", "0"]])
            .expect_truncated(false)
            .build()
    }

    pub fn list_to_numeric_fails() -> Scenario {
        Scenario::builder("list_to_numeric_fails")
            .description("A list with a length-2 element cannot become numeric")
            .fixture(Fixture::list(vec![Fixture::numeric(vec![1.0, 2.0])]))
            .op(Op::AsNumeric)
            .expect_error("coercion_failed")
            .build()
    }

    pub fn access_denied() -> Scenario {
        let mut config = Config::default();
        config.access.unmanaged_code = false;
        Scenario::builder("access_denied")
            .description("A session refused by the access policy")
            .config(config)
            .fixture(Fixture::integer(vec![1]))
            .op(Op::AsInteger)
            .expect_error("permission_denied")
            .build()
    }

    /// All standard scenarios.
    pub fn all() -> Vec<Scenario> {
        vec![
            null_predicate(),
            symbol_not_convertible(),
            plain_vector_column(),
            square_type_change(),
            wide_type_change(),
            wide_row_count_stride(),
            list_to_numeric_fails(),
            access_denied(),
        ]
    }
}
