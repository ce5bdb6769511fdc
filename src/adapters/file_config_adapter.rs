//! INI file configuration adapter.

use crate::domain::error::IitiError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IitiError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| IitiError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, IitiError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| IitiError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[input]
export = data/export.csv
import = data/import.csv
value_a_column = dollar

[analysis]
digits = 2, 4
top_n = 15
code_width = 6

[output]
dir = results
name_prefix = HS
"#;

    #[test]
    fn reads_sections_and_keys() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("input", "export"),
            Some("data/export.csv".to_string())
        );
        assert_eq!(
            adapter.get_string("analysis", "top_n"),
            Some("15".to_string())
        );
        assert_eq!(
            adapter.get_string("output", "name_prefix"),
            Some("HS".to_string())
        );
    }

    #[test]
    fn missing_keys_and_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("input", "start_year"), None);
        assert_eq!(adapter.get_string("nowhere", "export"), None);
    }

    #[test]
    fn values_are_trimmed_and_keys_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Analysis]\nTop_N =   15  \n").unwrap();
        assert_eq!(adapter.get_string("analysis", "top_n"), Some("15".to_string()));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[output]\ndir = /tmp/iiti\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("output", "dir"),
            Some("/tmp/iiti".to_string())
        );
    }

    #[test]
    fn from_file_reports_path_on_failure() {
        let err = FileConfigAdapter::from_file("/nonexistent/iiti.ini").unwrap_err();
        match err {
            IitiError::ConfigParse { file, .. } => assert_eq!(file, "/nonexistent/iiti.ini"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
