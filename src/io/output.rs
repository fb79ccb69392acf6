use crate::session::SessionReport;
use colored::*;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &SessionReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &SessionReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &SessionReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_classification(report)?;
        self.write_score_breakdown(report)?;
        self.write_personalization(report)?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, report: &SessionReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# Leadmap Session Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_classification(&mut self, report: &SessionReport) -> anyhow::Result<()> {
        writeln!(self.writer, "## Classification")?;
        writeln!(self.writer)?;
        match &report.quiz_result {
            Some(result) => {
                writeln!(
                    self.writer,
                    "Primary persona: **{}** (confidence {:.1})",
                    result.primary.label(),
                    result.confidence
                )?;
                if !result.secondary.is_empty() {
                    let secondary: Vec<&str> =
                        result.secondary.iter().map(|p| p.label()).collect();
                    writeln!(self.writer, "Secondary: {}", secondary.join(", "))?;
                }
                writeln!(self.writer)?;
                writeln!(self.writer, "| Persona | Score | Confidence |")?;
                writeln!(self.writer, "|---------|-------|------------|")?;
                for score in &result.ranked {
                    writeln!(
                        self.writer,
                        "| {} | {} | {:.1} |",
                        score.persona.label(),
                        score.score,
                        score.confidence
                    )?;
                }
            }
            None => {
                let persona = report
                    .persona
                    .map(|p| p.label().to_string())
                    .unwrap_or_else(|| "not determined".to_string());
                writeln!(self.writer, "Persona: {persona} (no quiz result)")?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_score_breakdown(&mut self, report: &SessionReport) -> anyhow::Result<()> {
        writeln!(self.writer, "## Lead Score")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Component | Points | Cap |")?;
        writeln!(self.writer, "|-----------|--------|-----|")?;
        writeln!(self.writer, "| Behavioral | {} | 50 |", report.behavioral_subtotal)?;
        writeln!(self.writer, "| Demographic | {} | 30 |", report.demographic_subtotal)?;
        writeln!(
            self.writer,
            "| Engagement quality | {} | 20 |",
            report.engagement_quality_subtotal
        )?;
        writeln!(self.writer, "| **Total** | **{}** | 100 |", report.total_score)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "Lead stage: **{}**", report.lead_stage.label())?;
        writeln!(
            self.writer,
            "Engagement: {} ({})",
            report.engagement_score,
            report.engagement_level.label()
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_personalization(&mut self, report: &SessionReport) -> anyhow::Result<()> {
        writeln!(self.writer, "## Personalization")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "Hero headline: {}", report.hero_headline)?;
        writeln!(
            self.writer,
            "Hero CTA: {} ({})",
            report.hero_cta.text, report.hero_cta.action
        )?;
        if report.patch.is_empty() {
            writeln!(self.writer, "No personalization rules applied.")?;
        } else {
            writeln!(self.writer)?;
            writeln!(self.writer, "| Slot | Variant | Rule |")?;
            writeln!(self.writer, "|------|---------|------|")?;
            for (slot, assignment) in &report.patch.slots {
                writeln!(
                    self.writer,
                    "| {slot} | {} | {} |",
                    assignment.value, assignment.rule_id
                )?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter;

impl Default for TerminalWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalWriter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputWriter for TerminalWriter {
    fn write_report(&mut self, report: &SessionReport) -> anyhow::Result<()> {
        print_header();
        print_classification(report);
        print_score_table(report);
        print_personalization(report);
        Ok(())
    }
}

fn print_header() {
    println!("{}", "Leadmap Session Report".bold().blue());
    println!("{}", "======================".blue());
    println!();
}

fn print_classification(report: &SessionReport) {
    match &report.quiz_result {
        Some(result) => {
            println!(
                "Persona: {} (confidence {:.1})",
                result.primary.label().bold().green(),
                result.confidence
            );
            for score in result.ranked.iter().filter(|s| s.score > 0) {
                println!("  {:<10} {:>3} pts", score.persona.label(), score.score);
            }
        }
        None => match report.persona {
            Some(persona) => println!("Persona: {}", persona.label().bold()),
            None => println!("Persona: {}", "not determined".dimmed()),
        },
    }
    println!();
}

fn print_score_table(report: &SessionReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Component", "Points", "Cap"]);
    table.add_row(vec![
        Cell::new("Behavioral"),
        Cell::new(report.behavioral_subtotal),
        Cell::new(50),
    ]);
    table.add_row(vec![
        Cell::new("Demographic"),
        Cell::new(report.demographic_subtotal),
        Cell::new(30),
    ]);
    table.add_row(vec![
        Cell::new("Engagement quality"),
        Cell::new(report.engagement_quality_subtotal),
        Cell::new(20),
    ]);
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(report.total_score),
        Cell::new(100),
    ]);
    println!("{table}");

    let stage = report.lead_stage.label();
    let stage_display = if report.total_score >= 81 {
        stage.green()
    } else if report.total_score >= 41 {
        stage.yellow()
    } else {
        stage.normal()
    };
    println!("Lead stage: {stage_display}");
    println!(
        "Engagement: {}/100 ({})",
        report.engagement_score,
        report.engagement_level.label()
    );
    println!("Events recorded: {}", report.events_recorded);
    println!();
}

fn print_personalization(report: &SessionReport) {
    println!("{}", "Personalization".bold());
    println!("  Headline: {}", report.hero_headline);
    println!(
        "  Hero CTA: {} ({})",
        report.hero_cta.text, report.hero_cta.action
    );
    if report.patch.is_empty() {
        println!("  {}", "No rules applied".dimmed());
        return;
    }
    println!("  Applied rules: {}", report.patch.applied_rule_ids.join(", "));
    for (slot, assignment) in &report.patch.slots {
        println!("    {slot} -> {}", assignment.value);
    }
    println!();
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new()),
    }
}
