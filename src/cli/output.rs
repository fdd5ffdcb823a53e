use agent_core::{ActionStatus, CycleResult};
use clap::ValueEnum;
use steadyhand_cli::ScenarioReport;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

pub fn render_report(report: &ScenarioReport) -> String {
    let mut out = format!("Scenario: {}\n", report.name);
    for result in &report.cycles {
        render_cycle(&mut out, result);
    }
    out.push_str(&format!(
        "\nDriver calls: {} click, {} insert, {} select, {} read, {} reveal\n",
        report.calls.clicks,
        report.calls.inserts,
        report.calls.selects,
        report.calls.reads,
        report.calls.reveals
    ));
    out.push_str(&format!(
        "Result: {}\n",
        if report.is_success() { "ok" } else { "FAILED" }
    ));
    out
}

fn render_cycle(out: &mut String, result: &CycleResult) {
    out.push_str(&format!(
        "\nCycle {} ({} ms){}\n",
        result.cycle,
        result.elapsed_ms,
        if result.cancelled { " cancelled" } else { "" }
    ));
    for record in &result.records {
        let mark = match record.status {
            ActionStatus::Succeeded => "✓",
            ActionStatus::Failed => "✗",
            ActionStatus::Skipped => "-",
        };
        out.push_str(&format!("  {} {}", mark, record.action));
        if let (Some(index), Some(source)) = (record.element_index, record.resolution_source) {
            out.push_str(&format!(" -> [{}] via {}", index, source));
        }
        if let Some(outcome) = &record.verification {
            out.push_str(&format!(" (attempt {})", outcome.attempt));
        }
        out.push('\n');
        if let (Some(class), Some(error)) = (record.failure, &record.error) {
            out.push_str(&format!("      {}: {}\n", class.name(), error));
        }
    }
    for dropped in &result.dropped {
        out.push_str(&format!(
            "  ~ dropped #{} {}: {}\n",
            dropped.position, dropped.kind, dropped.reason
        ));
    }
    if let Some(error) = &result.escalation_error {
        out.push_str(&format!("  ! escalation failed: {}\n", error));
    }
    for advisory in &result.advisories {
        for line in advisory.lines() {
            out.push_str(&format!("  > {}\n", line));
        }
    }
}
