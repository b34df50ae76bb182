use crate::core::models::{FormattedTextLine, ReportEntry, ReportSection};

const INDENT: &str = "  ";
const NONE_LABEL: &str = "None";

/// Plain-text rendering of a report for the terminal.
pub struct ConsoleReportView {
    sections: Vec<ReportSection>,
    text_lines: Vec<FormattedTextLine>,
}

impl ConsoleReportView {
    pub fn build_with_sections(sections: Vec<ReportSection>) -> Self {
        log::debug!("[REPORT_VIEW] Creating view with {} sections", sections.len());
        Self {
            sections,
            text_lines: Vec::new(),
        }
    }

    pub fn with_text_lines(mut self, text_lines: Vec<FormattedTextLine>) -> Self {
        self.text_lines = text_lines;
        self
    }

    pub fn render_text(&self) -> String {
        let mut output = String::new();

        for section in &self.sections {
            output.push_str(&format!("{}:\n", section.kind));
            for entry in &section.entries {
                render_entry(&mut output, entry);
            }
            output.push('\n');
        }

        if !self.text_lines.is_empty() {
            output.push_str("Regions:\n");
            for line in &self.text_lines {
                let bounds = line.bounds;
                output.push_str(&format!(
                    "{}[{:.0}, {:.0}, {:.0}x{:.0}] {}\n",
                    INDENT, bounds.x, bounds.y, bounds.width, bounds.height, line.text
                ));
            }
            output.push('\n');
        }

        output
    }
}

fn render_entry(output: &mut String, entry: &ReportEntry) {
    output.push_str(&format!("{}{}: {}\n", INDENT, entry.label, entry.value));

    for detail in &entry.details {
        let values = if detail.values.is_empty() {
            NONE_LABEL.to_string()
        } else {
            detail.values.join(", ")
        };
        output.push_str(&format!("{}{}{}: {}\n", INDENT, INDENT, detail.label, values));
    }
}
