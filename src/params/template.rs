//! Loading of tabular parameter input.
//!
//! A parameter template is a two-or-more-line CSV file: a header of
//! parameter names followed by one baseline row per scenario. Construction
//! selects a single row (1-based) and applies it on top of the universe
//! defaults. A companion demographics file supplies the household-size
//! distribution consumed by the reference kernel.
//!
//! Loading stages a working copy of the selected row in a temporary
//! directory scoped to the run. The directory is removed when the
//! [`TemplateInput`] is dropped, on every exit path including early
//! failure, so repeated runs never accumulate working directories.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::definition::ParamValue;
use super::store::ParameterStore;
use crate::errors::{ModelError, ModelResult};

/// Number of household-size bins in a demographics file (sizes 1 through 6).
pub const HOUSEHOLD_BINS: usize = 6;

/// Household-size distribution read from a demographics reference file.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdDemographics {
    distribution: [f64; HOUSEHOLD_BINS],
}

impl HouseholdDemographics {
    /// Load the distribution from a CSV file with a header line and one row
    /// of relative frequencies for household sizes 1 through 6.
    pub fn load(path: &Path) -> ModelResult<Self> {
        let rows = read_csv(path)?;
        let row = rows.get(1).ok_or_else(|| ModelError::TemplateFormat {
            path: path.to_path_buf(),
            details: "expected a header line and one data row".to_string(),
        })?;
        if row.len() != HOUSEHOLD_BINS {
            return Err(ModelError::TemplateFormat {
                path: path.to_path_buf(),
                details: format!("expected {} household bins, found {}", HOUSEHOLD_BINS, row.len()),
            });
        }

        let mut distribution = [0.0; HOUSEHOLD_BINS];
        for (slot, cell) in distribution.iter_mut().zip(row) {
            *slot = parse_cell(path, cell)?;
        }
        let total: f64 = distribution.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Err(ModelError::TemplateFormat {
                path: path.to_path_buf(),
                details: "household frequencies must sum to a positive value".to_string(),
            });
        }
        for slot in &mut distribution {
            *slot /= total;
        }
        Ok(Self { distribution })
    }

    /// Normalised frequencies for household sizes 1 through 6.
    pub fn size_distribution(&self) -> [f64; HOUSEHOLD_BINS] {
        self.distribution
    }

    /// Expected household size under the distribution.
    pub fn mean_household_size(&self) -> f64 {
        self.distribution
            .iter()
            .enumerate()
            .map(|(i, f)| (i + 1) as f64 * f)
            .sum()
    }
}

/// One selected row of a parameter template, plus the run's staging area.
#[derive(Debug)]
pub struct TemplateInput {
    baseline: Vec<(String, ParamValue)>,
    demographics: HouseholdDemographics,
    staging: TempDir,
}

impl TemplateInput {
    /// Read the header and the `row`-th (1-based) data row of `template`,
    /// load the demographics reference, and stage a copy of the selected
    /// row.
    pub fn load(template: &Path, row: usize, demographics: &Path) -> ModelResult<Self> {
        let rows = read_csv(template)?;
        let header = rows.first().ok_or_else(|| ModelError::TemplateFormat {
            path: template.to_path_buf(),
            details: "template is empty".to_string(),
        })?;
        if row == 0 {
            return Err(ModelError::TemplateFormat {
                path: template.to_path_buf(),
                details: "row selection is 1-based; row 0 is the header".to_string(),
            });
        }
        let selected = rows.get(row).ok_or_else(|| ModelError::TemplateFormat {
            path: template.to_path_buf(),
            details: format!("row {} not found ({} data rows)", row, rows.len() - 1),
        })?;
        if selected.len() != header.len() {
            return Err(ModelError::TemplateFormat {
                path: template.to_path_buf(),
                details: format!(
                    "row {} has {} cells but the header declares {} columns",
                    row,
                    selected.len(),
                    header.len()
                ),
            });
        }

        let mut baseline = Vec::with_capacity(header.len());
        for (name, cell) in header.iter().zip(selected) {
            baseline.push((name.clone(), parse_cell(template, cell)?));
        }

        let demographics = HouseholdDemographics::load(demographics)?;

        let staging = TempDir::new().map_err(|source| ModelError::TemplateIo {
            path: PathBuf::from("<staging>"),
            source,
        })?;
        let staged = staging.path().join("staged_parameters.csv");
        let contents = format!("{}\n{}\n", header.join(","), selected.join(","));
        fs::write(&staged, contents).map_err(|source| ModelError::TemplateIo {
            path: staged.clone(),
            source,
        })?;
        debug!("staged parameter row {} at {}", row, staged.display());

        Ok(Self {
            baseline,
            demographics,
            staging,
        })
    }

    /// The baseline record read from the selected row.
    pub fn baseline(&self) -> &[(String, ParamValue)] {
        &self.baseline
    }

    pub fn demographics(&self) -> &HouseholdDemographics {
        &self.demographics
    }

    /// The run-scoped staging directory. Removed when `self` is dropped.
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// Build a store from the staged baseline and record the resolved
    /// values alongside the staged row.
    pub fn build_store(&self) -> ModelResult<ParameterStore> {
        let store = ParameterStore::from_baseline(
            self.baseline.iter().map(|(name, value)| (name.as_str(), *value)),
        )?;

        let resolved_path = self.staging.path().join("parameters.toml");
        let rendered =
            toml::to_string(&store.resolved()).map_err(|err| ModelError::TemplateFormat {
                path: resolved_path.clone(),
                details: err.to_string(),
            })?;
        fs::write(&resolved_path, rendered).map_err(|source| ModelError::TemplateIo {
            path: resolved_path,
            source,
        })?;

        Ok(store)
    }
}

fn read_csv(path: &Path) -> ModelResult<Vec<Vec<String>>> {
    let contents = fs::read_to_string(path).map_err(|source| ModelError::TemplateIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect())
}

fn parse_cell(path: &Path, cell: &str) -> ModelResult<ParamValue> {
    cell.parse::<ParamValue>()
        .map_err(|_| ModelError::TemplateFormat {
            path: path.to_path_buf(),
            details: format!("cell '{}' is not numeric", cell),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn fixture_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    const DEMOGRAPHICS: &str = "\
household_size_1,household_size_2,household_size_3,household_size_4,household_size_5,household_size_6
0.29,0.34,0.16,0.14,0.05,0.02
";

    #[test]
    fn loads_selected_row() {
        let dir = fixture_dir();
        let template = write_file(
            dir.path(),
            "params.csv",
            "rng_seed,n_total,app_users_fraction\n1,10000,0.85\n2,5000,0.5\n",
        );
        let demographics = write_file(dir.path(), "households.csv", DEMOGRAPHICS);

        let input = TemplateInput::load(&template, 2, &demographics).unwrap();
        let baseline = input.baseline();
        assert_eq!(baseline[0], ("rng_seed".to_string(), 2.0));
        assert_eq!(baseline[1], ("n_total".to_string(), 5000.0));
        assert_eq!(baseline[2], ("app_users_fraction".to_string(), 0.5));
    }

    #[test]
    fn missing_row_is_rejected() {
        let dir = fixture_dir();
        let template = write_file(dir.path(), "params.csv", "rng_seed\n1\n");
        let demographics = write_file(dir.path(), "households.csv", DEMOGRAPHICS);

        let err = TemplateInput::load(&template, 3, &demographics).unwrap_err();
        assert!(matches!(err, ModelError::TemplateFormat { .. }));
    }

    #[test]
    fn non_numeric_cell_is_rejected() {
        let dir = fixture_dir();
        let template = write_file(dir.path(), "params.csv", "rng_seed\nabc\n");
        let demographics = write_file(dir.path(), "households.csv", DEMOGRAPHICS);

        let err = TemplateInput::load(&template, 1, &demographics).unwrap_err();
        assert!(matches!(err, ModelError::TemplateFormat { .. }));
    }

    #[test]
    fn missing_template_is_io_error() {
        let dir = fixture_dir();
        let demographics = write_file(dir.path(), "households.csv", DEMOGRAPHICS);

        let err = TemplateInput::load(&dir.path().join("absent.csv"), 1, &demographics).unwrap_err();
        assert!(matches!(err, ModelError::TemplateIo { .. }));
    }

    #[test]
    fn stages_copy_of_selected_row() {
        let dir = fixture_dir();
        let template = write_file(dir.path(), "params.csv", "rng_seed,n_total\n7,2000\n");
        let demographics = write_file(dir.path(), "households.csv", DEMOGRAPHICS);

        let input = TemplateInput::load(&template, 1, &demographics).unwrap();
        let staged = fs::read_to_string(input.staging_dir().join("staged_parameters.csv")).unwrap();
        assert_eq!(staged, "rng_seed,n_total\n7,2000\n");
    }

    #[test]
    fn staging_removed_on_drop() {
        let dir = fixture_dir();
        let template = write_file(dir.path(), "params.csv", "rng_seed\n7\n");
        let demographics = write_file(dir.path(), "households.csv", DEMOGRAPHICS);

        let input = TemplateInput::load(&template, 1, &demographics).unwrap();
        let staging = input.staging_dir().to_path_buf();
        assert!(staging.exists());
        drop(input);
        assert!(!staging.exists());
    }

    #[test]
    fn build_store_applies_baseline_and_records_resolved() {
        let dir = fixture_dir();
        let template = write_file(
            dir.path(),
            "params.csv",
            "rng_seed,app_users_fraction\n7,0.25\n",
        );
        let demographics = write_file(dir.path(), "households.csv", DEMOGRAPHICS);

        let input = TemplateInput::load(&template, 1, &demographics).unwrap();
        let store = input.build_store().unwrap();
        assert_eq!(store.get("rng_seed").unwrap(), 7.0);
        assert_eq!(store.get("app_users_fraction").unwrap(), 0.25);

        let rendered =
            fs::read_to_string(input.staging_dir().join("parameters.toml")).unwrap();
        let parsed: std::collections::BTreeMap<String, f64> = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed["rng_seed"], 7.0);
        assert_eq!(parsed["app_users_fraction"], 0.25);
    }

    #[test]
    fn build_store_rejects_undeclared_columns() {
        let dir = fixture_dir();
        let template = write_file(dir.path(), "params.csv", "wrong_parameter\n1\n");
        let demographics = write_file(dir.path(), "households.csv", DEMOGRAPHICS);

        let input = TemplateInput::load(&template, 1, &demographics).unwrap();
        assert!(matches!(
            input.build_store(),
            Err(ModelError::UnknownParameter(_))
        ));
    }

    #[test]
    fn demographics_normalised() {
        let dir = fixture_dir();
        let path = write_file(
            dir.path(),
            "households.csv",
            "s1,s2,s3,s4,s5,s6\n2,2,2,2,1,1\n",
        );
        let demographics = HouseholdDemographics::load(&path).unwrap();
        let total: f64 = demographics.size_distribution().iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(demographics.mean_household_size() > 1.0);
        assert!(demographics.mean_household_size() < 6.0);
    }

    #[test]
    fn demographics_wrong_bin_count() {
        let dir = fixture_dir();
        let path = write_file(dir.path(), "households.csv", "s1,s2\n0.5,0.5\n");
        assert!(matches!(
            HouseholdDemographics::load(&path),
            Err(ModelError::TemplateFormat { .. })
        ));
    }
}
