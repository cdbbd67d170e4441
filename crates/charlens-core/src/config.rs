//! Limits that bound response size. None of them change conversion results,
//! only how much of a result is spelled out.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Code points that get a per-character breakdown.
    pub char_limit: usize,
    /// Entries kept in an overall result's `rawBytes` list.
    pub overall_byte_limit: usize,
    /// Leading bytes handed to the detector.
    pub detect_sample_limit: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            char_limit: 100,
            overall_byte_limit: 1000,
            detect_sample_limit: 64 * 1024,
        }
    }
}

impl ConverterConfig {
    pub fn with_char_limit(mut self, char_limit: usize) -> Self {
        self.char_limit = char_limit;
        self
    }

    pub fn with_overall_byte_limit(mut self, overall_byte_limit: usize) -> Self {
        self.overall_byte_limit = overall_byte_limit;
        self
    }

    pub fn with_detect_sample_limit(mut self, detect_sample_limit: usize) -> Self {
        self.detect_sample_limit = detect_sample_limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.char_limit == 0 {
            return Err(Error::InvalidConfig("char_limit must be >= 1".into()));
        }
        if self.overall_byte_limit == 0 {
            return Err(Error::InvalidConfig("overall_byte_limit must be >= 1".into()));
        }
        if self.detect_sample_limit == 0 {
            return Err(Error::InvalidConfig("detect_sample_limit must be >= 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ConverterConfig::default();
        assert_eq!(cfg.char_limit, 100);
        assert_eq!(cfg.overall_byte_limit, 1000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(ConverterConfig::default().with_char_limit(0).validate().is_err());
        assert!(ConverterConfig::default().with_overall_byte_limit(0).validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ConverterConfig = serde_json::from_str(r#"{"char_limit": 20}"#).unwrap();
        assert_eq!(cfg, ConverterConfig::default().with_char_limit(20));
    }
}
