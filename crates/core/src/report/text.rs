use crate::Result;
use crate::analyzer::Analysis;
use crate::similarity::round2;

/// Configuration for plain text output
#[derive(Debug, Clone, Default)]
pub struct TextConfig {
    /// List keyword weights next to each term
    pub show_weights: bool,

    /// Include class probabilities and the verdict source
    pub include_details: bool,
}

/// Plain text formatter for a human-readable summary
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, analysis: &Analysis) -> Result<String> {
        convert_to_text(analysis, &self.config)
    }
}

/// Render an analysis as a plain text report
pub fn convert_to_text(analysis: &Analysis, config: &TextConfig) -> Result<String> {
    let mut output = String::new();

    output.push_str(&generate_header(analysis));
    output.push('\n');

    let features = &analysis.features;
    output.push_str(&format!("Word count:   {}\n", features.word_count));
    output.push_str(&format!("Sentences:    {}\n", features.sentence_count));
    output.push_str(&format!(
        "Readability:  {:.2} ({})\n",
        round2(features.flesch_reading_ease),
        analysis.reading_level()
    ));
    output.push_str(&format!("Thin content: {}\n", if features.is_thin { "yes" } else { "no" }));

    match (&analysis.quality, &analysis.quality_error) {
        (Some(verdict), _) => output.push_str(&format!("Quality:      {}\n", verdict.label)),
        (None, Some(error)) => output.push_str(&format!("Quality:      unavailable ({})\n", error)),
        (None, None) => output.push_str("Quality:      unavailable\n"),
    }

    if config.include_details
        && let Some(verdict) = &analysis.quality
    {
        output.push_str(&format!("  source: {}\n", verdict.source.as_str()));
        for (label, probability) in verdict.ranked_probabilities() {
            output.push_str(&format!("  {}: {:.1}%\n", label, probability * 100.0));
        }
    }

    output.push('\n');
    output.push_str(&keyword_section(analysis, config));
    output.push('\n');
    output.push_str(&similar_section(analysis));

    Ok(output.trim_end().to_string())
}

/// Title underlined, then the source URL
fn generate_header(analysis: &Analysis) -> String {
    let title = analysis.title();
    format!("{}\n{}\n{}\n", title, "=".repeat(title.chars().count()), analysis.url)
}

fn keyword_section(analysis: &Analysis, config: &TextConfig) -> String {
    if analysis.keywords.is_empty() {
        return "Keywords: none\n".to_string();
    }

    let terms: Vec<String> = analysis
        .keywords
        .0
        .iter()
        .map(|k| if config.show_weights { format!("{} ({:.3})", k.term, k.weight) } else { k.term.clone() })
        .collect();

    format!("Keywords: {}\n", terms.join(", "))
}

fn similar_section(analysis: &Analysis) -> String {
    if analysis.similar.is_empty() {
        return "Similar content: none found\n".to_string();
    }

    let mut section = String::from("Similar content:\n");
    for m in &analysis.similar {
        section.push_str(&format!("  {:.2}  {} <{}>\n", m.similarity, m.title, m.url));
    }
    section
}
