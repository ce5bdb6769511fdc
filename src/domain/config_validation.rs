//! Configuration validation.
//!
//! Every field is checked before any trade data is read, so a run either
//! starts with a usable configuration or fails with the offending key.

use crate::domain::aggregate::{DEFAULT_CODE_WIDTH, Granularity, MAX_CODE_WIDTH};
use crate::domain::analysis::OutputFormat;
use crate::domain::error::IitiError;
use crate::domain::index::DEFAULT_TOP_N;
use crate::domain::trade_record::{ValueField, YearRange};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DIGIT_LEVELS: [u32; 2] = [2, 4];

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), IitiError> {
    validate_inputs(config)?;
    digit_levels(config)?;
    top_n(config)?;
    value_field(config)?;
    year_range(config)?;
    output_format(config)?;
    Ok(())
}

fn validate_inputs(config: &dyn ConfigPort) -> Result<(), IitiError> {
    for key in ["export", "import"] {
        match config.get_string("input", key) {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(IitiError::ConfigMissing {
                    section: "input".to_string(),
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn optional_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, IitiError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| IitiError::config_invalid(section, key, format!("'{s}' is not an integer"))),
    }
}

pub fn code_width(config: &dyn ConfigPort) -> Result<u32, IitiError> {
    let width = optional_int(config, "analysis", "code_width")?.unwrap_or(DEFAULT_CODE_WIDTH as i64);
    if width < 1 || width > MAX_CODE_WIDTH as i64 {
        return Err(IitiError::config_invalid(
            "analysis",
            "code_width",
            format!("code_width must be between 1 and {MAX_CODE_WIDTH}"),
        ));
    }
    Ok(width as u32)
}

/// Parse a comma-separated digit list such as `2,4`.
pub fn parse_digit_list(raw: &str) -> Result<Vec<u32>, String> {
    let mut levels = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err("empty entry in digit list".to_string());
        }
        let digits: u32 = token
            .parse()
            .map_err(|_| format!("'{token}' is not a digit count"))?;
        if levels.contains(&digits) {
            return Err(format!("duplicate digit level {digits}"));
        }
        levels.push(digits);
    }
    Ok(levels)
}

pub fn digit_levels(config: &dyn ConfigPort) -> Result<Vec<u32>, IitiError> {
    let width = code_width(config)?;
    let levels = match config.get_string("analysis", "digits") {
        None => DEFAULT_DIGIT_LEVELS.to_vec(),
        Some(raw) => {
            parse_digit_list(&raw).map_err(|reason| IitiError::config_invalid("analysis", "digits", reason))?
        }
    };
    for &digits in &levels {
        Granularity::new(digits, width)
            .map_err(|e| IitiError::config_invalid("analysis", "digits", e.to_string()))?;
    }
    Ok(levels)
}

pub fn top_n(config: &dyn ConfigPort) -> Result<usize, IitiError> {
    let value = optional_int(config, "analysis", "top_n")?.unwrap_or(DEFAULT_TOP_N as i64);
    if value < 1 {
        return Err(IitiError::config_invalid(
            "analysis",
            "top_n",
            "top_n must be at least 1",
        ));
    }
    Ok(value as usize)
}

pub fn value_field(config: &dyn ConfigPort) -> Result<ValueField, IitiError> {
    match config.get_string("analysis", "value") {
        None => Ok(ValueField::default()),
        Some(s) => s
            .parse()
            .map_err(|reason: String| IitiError::config_invalid("analysis", "value", reason)),
    }
}

pub fn year_range(config: &dyn ConfigPort) -> Result<YearRange, IitiError> {
    let start = optional_int(config, "input", "start_year")?;
    let end = optional_int(config, "input", "end_year")?;

    let to_year = |value: i64, key: &str| {
        i32::try_from(value).map_err(|_| IitiError::config_invalid("input", key, "year out of range"))
    };
    let range = YearRange {
        start: start.map(|v| to_year(v, "start_year")).transpose()?,
        end: end.map(|v| to_year(v, "end_year")).transpose()?,
    };

    if let (Some(s), Some(e)) = (range.start, range.end) {
        if s > e {
            return Err(IitiError::config_invalid(
                "input",
                "start_year",
                "start_year must not be after end_year",
            ));
        }
    }
    Ok(range)
}

pub fn output_format(config: &dyn ConfigPort) -> Result<OutputFormat, IitiError> {
    match config.get_string("output", "format") {
        None => Ok(OutputFormat::default()),
        Some(s) => s
            .parse()
            .map_err(|reason: String| IitiError::config_invalid("output", "format", reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const INPUTS: &str = "[input]\nexport = exp.csv\nimport = imp.csv\n";

    #[test]
    fn minimal_config_passes() {
        let config = make_config(INPUTS);
        assert!(validate_analysis_config(&config).is_ok());
        assert_eq!(digit_levels(&config).unwrap(), vec![2, 4]);
        assert_eq!(top_n(&config).unwrap(), 10);
        assert_eq!(code_width(&config).unwrap(), 6);
        assert_eq!(value_field(&config).unwrap(), ValueField::A);
        assert_eq!(year_range(&config).unwrap(), YearRange::all());
        assert_eq!(output_format(&config).unwrap(), OutputFormat::Csv);
    }

    #[test]
    fn missing_export_fails() {
        let config = make_config("[input]\nimport = imp.csv\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigMissing { key, .. } if key == "export"));
    }

    #[test]
    fn blank_import_fails() {
        let config = make_config("[input]\nexport = exp.csv\nimport =\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigMissing { key, .. } if key == "import"));
    }

    #[test]
    fn digits_wider_than_codes_fail() {
        let config = make_config(&format!("{INPUTS}[analysis]\ndigits = 2,8\n"));
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigInvalid { key, .. } if key == "digits"));
    }

    #[test]
    fn digits_follow_code_width() {
        let config = make_config(&format!("{INPUTS}[analysis]\ncode_width = 8\ndigits = 2,8\n"));
        assert_eq!(digit_levels(&config).unwrap(), vec![2, 8]);
    }

    #[test]
    fn zero_digits_fail() {
        let config = make_config(&format!("{INPUTS}[analysis]\ndigits = 0\n"));
        assert!(digit_levels(&config).is_err());
    }

    #[test]
    fn malformed_digit_list_fails() {
        assert!(parse_digit_list("2,,4").is_err());
        assert!(parse_digit_list("two").is_err());
        assert!(parse_digit_list("2,2").is_err());
        assert_eq!(parse_digit_list(" 4 , 2 ").unwrap(), vec![4, 2]);
    }

    #[test]
    fn code_width_out_of_range_fails() {
        let config = make_config(&format!("{INPUTS}[analysis]\ncode_width = 0\n"));
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigInvalid { key, .. } if key == "code_width"));

        let config = make_config(&format!("{INPUTS}[analysis]\ncode_width = 40\n"));
        assert!(code_width(&config).is_err());
    }

    #[test]
    fn top_n_zero_fails() {
        let config = make_config(&format!("{INPUTS}[analysis]\ntop_n = 0\n"));
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigInvalid { key, .. } if key == "top_n"));
    }

    #[test]
    fn top_n_non_numeric_fails() {
        let config = make_config(&format!("{INPUTS}[analysis]\ntop_n = many\n"));
        let err = top_n(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigInvalid { key, .. } if key == "top_n"));
    }

    #[test]
    fn unknown_value_column_fails() {
        let config = make_config(&format!("{INPUTS}[analysis]\nvalue = euro\n"));
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigInvalid { key, .. } if key == "value"));
    }

    #[test]
    fn rial_value_column_accepted() {
        let config = make_config(&format!("{INPUTS}[analysis]\nvalue = rial\n"));
        assert_eq!(value_field(&config).unwrap(), ValueField::B);
    }

    #[test]
    fn inverted_year_range_fails() {
        let config = make_config("[input]\nexport = e\nimport = i\nstart_year = 2020\nend_year = 2010\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigInvalid { key, .. } if key == "start_year"));
    }

    #[test]
    fn open_ended_year_range() {
        let config = make_config("[input]\nexport = e\nimport = i\nstart_year = 2015\n");
        assert_eq!(
            year_range(&config).unwrap(),
            YearRange {
                start: Some(2015),
                end: None
            }
        );
    }

    #[test]
    fn unknown_output_format_fails() {
        let config = make_config(&format!("{INPUTS}[output]\nformat = xlsx\n"));
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, IitiError::ConfigInvalid { key, .. } if key == "format"));
    }
}
