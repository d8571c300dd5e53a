use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::cli::Args;
use crate::ingest::LoadOptions;
use crate::plot::Style;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no input folder given (use --input or `input:` in the config file)")]
    MissingInput,

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Run settings. Defaults, then the YAML file, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub input: Option<PathBuf>,
    pub out: PathBuf,
    pub limit: usize,
    pub min_file_bytes: u64,
    pub min_columns: usize,
    pub month_min: u32,
    pub month_max: u32,
    pub dpi: u32,
}

impl Default for Settings {
    fn default() -> Self {
        let load = LoadOptions::default();
        Self {
            input: None,
            out: PathBuf::from("images"),
            limit: load.limit,
            min_file_bytes: load.min_file_bytes,
            min_columns: load.min_columns,
            month_min: *load.months.start(),
            month_max: *load.months.end(),
            dpi: Style::default().dpi,
        }
    }
}

impl Settings {
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        // an empty document means "all defaults"
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Overlay the flags that were given on the command line.
    pub fn apply_args(mut self, args: &Args) -> Self {
        if let Some(input) = &args.input {
            self.input = Some(input.clone());
        }
        if let Some(out) = &args.out {
            self.out = out.clone();
        }
        if let Some(limit) = args.limit {
            self.limit = limit;
        }
        if let Some(dpi) = args.dpi {
            self.dpi = dpi;
        }
        self
    }

    /// Resolve the full settings for a command line.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let base = match &args.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let settings = base.apply_args(args);
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.is_none() {
            return Err(ConfigError::MissingInput);
        }
        if self.limit == 0 {
            return Err(ConfigError::Invalid {
                field: "limit",
                reason: "must be at least 1".into(),
            });
        }
        if self.month_min > self.month_max {
            return Err(ConfigError::Invalid {
                field: "month_min",
                reason: format!("{} is after month_max {}", self.month_min, self.month_max),
            });
        }
        if self.dpi == 0 {
            return Err(ConfigError::Invalid {
                field: "dpi",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            limit: self.limit,
            min_file_bytes: self.min_file_bytes,
            min_columns: self.min_columns,
            months: self.month_min..=self.month_max,
        }
    }

    pub fn style(&self) -> Style {
        Style::with_dpi(self.dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_loader() {
        let s = Settings::default();
        assert_eq!(s.out, PathBuf::from("images"));
        assert_eq!(s.limit, 100);
        assert_eq!(s.min_file_bytes, 8);
        assert_eq!(s.min_columns, 5);
        assert_eq!((s.month_min, s.month_max), (1, 192));
        assert_eq!(s.dpi, 150);
        assert_eq!(s.load_options().months, 1..=192);
    }

    #[test]
    fn yaml_fills_only_what_it_names() {
        let s = Settings::from_yaml_str("input: runs\nlimit: 20\nmonth_max: 96\n").unwrap();
        assert_eq!(s.input, Some(PathBuf::from("runs")));
        assert_eq!(s.limit, 20);
        assert_eq!(s.month_max, 96);
        assert_eq!(s.dpi, 150);
        assert_eq!(Settings::from_yaml_str("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_yaml_str("lmit: 3\n").is_err());
    }

    #[test]
    fn command_line_wins_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "input: from_file\nout: file_out\nlimit: 7\ndpi: 72").unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            limit: Some(3),
            ..Args::default()
        };
        let s = Settings::resolve(&args).unwrap();
        assert_eq!(s.input, Some(PathBuf::from("from_file")));
        assert_eq!(s.out, PathBuf::from("file_out"));
        assert_eq!(s.limit, 3);
        assert_eq!(s.dpi, 72);
        assert_eq!(s.style().dpi, 72);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let base = Settings {
            input: Some(PathBuf::from("runs")),
            ..Settings::default()
        };
        assert!(base.validate().is_ok());

        let zero_limit = Settings { limit: 0, ..base.clone() };
        assert!(matches!(
            zero_limit.validate(),
            Err(ConfigError::Invalid { field: "limit", .. })
        ));

        let reversed = Settings {
            month_min: 50,
            month_max: 10,
            ..base.clone()
        };
        assert!(matches!(
            reversed.validate(),
            Err(ConfigError::Invalid { field: "month_min", .. })
        ));

        let no_dpi = Settings { dpi: 0, ..base };
        assert!(matches!(no_dpi.validate(), Err(ConfigError::Invalid { field: "dpi", .. })));

        assert!(matches!(
            Settings::default().validate(),
            Err(ConfigError::MissingInput)
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Settings::from_yaml_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
