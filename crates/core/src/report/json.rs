use crate::Result;
use crate::analyzer::Analysis;
use crate::report::AnalysisReport;

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Append reading level, verdict source and ranked probabilities
    pub include_details: bool,
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Convert an analysis to its JSON export record
pub fn convert_to_json(analysis: &Analysis, config: &JsonConfig) -> Result<String> {
    let report = AnalysisReport::new(analysis, config.include_details);

    if config.pretty { Ok(serde_json::to_string_pretty(&report)?) } else { Ok(serde_json::to_string(&report)?) }
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, analysis: &Analysis) -> Result<String> {
        convert_to_json(analysis, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_analysis;

    #[test]
    fn test_compact_output() {
        let json = convert_to_json(&sample_analysis(), &JsonConfig::default()).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with("{\"url\":\"https://example.com/post\",\"title\":\"Example Post\""));
    }

    #[test]
    fn test_pretty_output() {
        let config = JsonConfig { pretty: true, ..Default::default() };
        let json = convert_to_json(&sample_analysis(), &config).unwrap();
        assert!(json.contains("\n  \"word_count\": 900"));
    }

    #[test]
    fn test_similar_content_records() {
        let json = convert_to_json(&sample_analysis(), &JsonConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let first = &value["similar_content"][0];
        assert_eq!(first["url"], "https://example.com/other");
        assert_eq!(first["similarity"], 0.91);
        assert_eq!(first["title"], "Other");
    }

    #[test]
    fn test_details_follow_core_fields() {
        let formatter = JsonFormatter::new(JsonConfig { include_details: true, pretty: false });
        let json = formatter.convert(&sample_analysis()).unwrap();

        let similar = json.find("\"similar_content\"").unwrap();
        let level = json.find("\"reading_level\"").unwrap();
        let probabilities = json.find("\"quality_probabilities\":{\"Medium\":0.7").unwrap();
        assert!(similar < level && level < probabilities);
        assert!(json.contains("\"quality_source\":\"model\""));
    }
}
