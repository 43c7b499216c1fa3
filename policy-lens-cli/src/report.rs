use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use policy_lens::{ImprovementSummary, ResolvedRules, TownFocus, fmt1};

/// Everything one run produced, in report order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LensReport {
    pub active_rule_count: usize,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedRules>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub summaries: Vec<FocusSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FocusSummary {
    pub focus: TownFocus,
    pub summary: ImprovementSummary,
}

pub fn generate_console_report(out: &mut dyn Write, report: &LensReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📜 Active Policy Bonus Yields".bright_cyan().bold())?;
    writeln!(out, "{}", "=============================".cyan())?;
    writeln!(out, "Active rules: {}", report.active_rule_count)?;
    writeln!(out)?;

    if report.labels.is_empty() {
        writeln!(out, "   {}", "None".dimmed())?;
    }
    for label in &report.labels {
        writeln!(out, "   • {}", label.green())?;
    }

    for focus in &report.summaries {
        writeln!(out)?;
        let heading = format!(
            "🏘  {} +{}",
            focus.focus.yield_type(),
            fmt1(f64::from(focus.summary.total))
        );
        writeln!(out, "{}", heading.bright_yellow().bold())?;
        writeln!(
            out,
            "   Total improvements: {} (x{})",
            focus.summary.base_count, focus.summary.multiplier
        )?;
        for line in &focus.summary.items {
            writeln!(
                out,
                "   {} x{}  +{}",
                line.display_name,
                line.count,
                line.count * focus.summary.multiplier
            )?;
        }
    }

    if let Some(resolved) = &report.resolved {
        writeln!(out)?;
        writeln!(out, "{}", "🔎 Resolved Modifiers".bright_blue().bold())?;
        for entry in &resolved.entries {
            writeln!(
                out,
                "{} ({})",
                entry.rule_id.bold(),
                entry.localized_name.as_deref().unwrap_or("-")
            )?;
            for (id, outcome) in entry.modifier_ids.iter().zip(&entry.modifiers) {
                match outcome.resolved() {
                    Some(modifier) => {
                        let subject = modifier
                            .subject_requirement_set
                            .as_ref()
                            .map_or("-", |set| set.set_id.as_str());
                        writeln!(out, "   {id}  subject={subject}")?;
                    }
                    None => writeln!(out, "   {}  {}", id, "unresolved".red())?,
                }
            }
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &LensReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &LensReport) -> Result<()> {
    writeln!(out, "# Active Policy Bonus Yields\n")?;
    writeln!(out, "- **Active rules**: {}\n", report.active_rule_count)?;

    writeln!(out, "## Labels\n")?;
    if report.labels.is_empty() {
        writeln!(out, "_None._")?;
    }
    for label in &report.labels {
        writeln!(out, "- {label}")?;
    }

    for focus in &report.summaries {
        writeln!(
            out,
            "\n## {} (+{})\n",
            focus.focus.yield_type(),
            fmt1(f64::from(focus.summary.total))
        )?;
        for line in &focus.summary.items {
            writeln!(out, "- {} x{}", line.display_name, line.count)?;
        }
    }
    Ok(())
}
