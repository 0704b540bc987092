//! The reference dataset the attribution engine measures contributions against.

use std::fs;
use std::path::Path;

use log::{info, warn};
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::ConfigError;
use crate::schema::FEATURE_SCHEMA;

/// Prior applicant rows in schema order. Loaded once at startup and only read
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundData {
    rows: Array2<f32>,
}

impl BackgroundData {
    /// Wraps rows that are already in schema order.
    pub fn from_rows(rows: Array2<f32>) -> Result<Self, ConfigError> {
        if rows.nrows() == 0 {
            return Err(ConfigError::SchemaMismatch("background data has no rows".into()));
        }
        FEATURE_SCHEMA.check_width(Some(rows.ncols()), "background data")?;
        Ok(Self { rows })
    }

    /// Reads a CSV file whose header names the schema columns in order.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingArtifact(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let data = Self::parse(&text).map_err(|e| match e {
            ConfigError::Invalid { what, reason, .. } => ConfigError::Invalid {
                what,
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        info!("Loaded {} background rows from {:?}", data.len(), path);
        Ok(data)
    }

    /// Parses CSV text. Errors carry an empty path; [`BackgroundData::load`]
    /// fills it in.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            what: "background data".into(),
            path: Default::default(),
            reason,
        };

        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());
        let (_, header) = lines.next().ok_or_else(|| invalid("file is empty".into()))?;
        let columns: Vec<&str> = header.split(',').map(|c| c.trim().trim_matches('"')).collect();
        FEATURE_SCHEMA.check_columns(&columns, "background data header")?;

        let width = FEATURE_SCHEMA.len();
        let mut values = Vec::new();
        let mut n_rows = 0;
        for (line_no, line) in lines {
            let before = values.len();
            for cell in line.split(',') {
                let cell = cell.trim();
                let value: f32 = cell.parse().map_err(|_| {
                    invalid(format!("line {}: '{}' is not a number", line_no + 1, cell))
                })?;
                values.push(value);
            }
            if values.len() - before != width {
                return Err(invalid(format!(
                    "line {} has {} cells, expected {}",
                    line_no + 1,
                    values.len() - before,
                    width
                )));
            }
            n_rows += 1;
        }

        let rows = Array2::from_shape_vec((n_rows, width), values).map_err(|e| invalid(e.to_string()))?;
        Self::from_rows(rows)
    }

    /// Keeps at most `max_rows` rows, picked with an even stride so the
    /// sample spans the whole file. Attribution cost grows linearly with the
    /// background size.
    pub fn summarize(self, max_rows: usize) -> Self {
        if max_rows == 0 || self.len() <= max_rows {
            return self;
        }
        let n = self.len();
        let picked: Vec<usize> = (0..max_rows).map(|i| i * n / max_rows).collect();
        warn!(
            "Background data has {} rows, keeping {} evenly spaced rows for attribution",
            n, max_rows
        );
        Self {
            rows: self.rows.select(Axis(0), &picked),
        }
    }

    pub fn rows(&self) -> ArrayView2<'_, f32> {
        self.rows.view()
    }

    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    /// Per-feature mean over all rows.
    pub fn mean(&self) -> Array1<f32> {
        self.rows.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(self.rows.ncols()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_COUNT;

    fn csv(rows: &[Vec<f32>]) -> String {
        let mut text = FEATURE_SCHEMA.names.join(",");
        text.push('\n');
        for row in rows {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            text.push_str(&cells.join(","));
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_parse() {
        let text = csv(&[vec![1.0; FEATURE_COUNT], vec![3.0; FEATURE_COUNT]]);
        let data = BackgroundData::parse(&text).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.mean().to_vec(), vec![2.0; FEATURE_COUNT]);
    }

    #[test]
    fn test_header_must_match_schema() {
        let text = csv(&[vec![1.0; FEATURE_COUNT]]).replacen("duration,credit_amount", "credit_amount,duration", 1);
        assert!(matches!(BackgroundData::parse(&text), Err(ConfigError::SchemaMismatch(_))));
    }

    #[test]
    fn test_rejects_bad_cells() {
        let text = csv(&[vec![1.0; FEATURE_COUNT]]).replacen("\n1,", "\nabc,", 1);
        let err = BackgroundData::parse(&text).unwrap_err();
        assert!(err.to_string().contains("'abc' is not a number"), "{}", err);

        let short = csv(&[vec![1.0; FEATURE_COUNT - 1]]);
        assert!(matches!(BackgroundData::parse(&short), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(BackgroundData::parse("").is_err());
        assert!(matches!(
            BackgroundData::parse(&csv(&[])),
            Err(ConfigError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_summarize_keeps_even_stride() {
        let rows = Array2::from_shape_fn((10, FEATURE_COUNT), |(i, _)| i as f32);
        let data = BackgroundData::from_rows(rows).unwrap().summarize(5);
        assert_eq!(data.len(), 5);
        let firsts: Vec<f32> = data.rows().column(0).to_vec();
        assert_eq!(firsts, vec![0.0, 2.0, 4.0, 6.0, 8.0]);

        let rows = Array2::<f32>::zeros((3, FEATURE_COUNT));
        assert_eq!(BackgroundData::from_rows(rows).unwrap().summarize(5).len(), 3);
    }

    #[test]
    fn test_load_fills_in_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("background_data.csv");
        fs::write(&path, csv(&[vec![1.0; FEATURE_COUNT]]).replacen("\n1,", "\nx,", 1)).unwrap();
        match BackgroundData::load(&path) {
            Err(ConfigError::Invalid { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected invalid background error, got {:?}", other),
        }
    }
}
