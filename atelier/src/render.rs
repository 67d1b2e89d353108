//! Terminal and markdown rendering of parsed items and engine reports.

use atelier_core::format::{
    format_currency, format_date_opt, format_percent, format_progress, format_ratio,
};
use atelier_core::items::{ParseOutcome, ParsedSpecification, PriceList};
use atelier_core::{EngineReport, ProjectReport};
use serde_json::{json, Value};

/// Print parsed items with their prices.
pub fn print_items(parsed: &ParsedSpecification, prices: &PriceList) {
    if let ParseOutcome::Malformed { reason } = &parsed.outcome {
        println!("Malformed specification: {}", reason);
    }

    if parsed.items.is_empty() {
        println!("No items");
    } else {
        for item in &parsed.items {
            let pages = item
                .page_count()
                .map(|p| format!("  ({} pages)", p))
                .unwrap_or_default();
            println!(
                "  {:<14} {:>10}{}",
                item.label,
                format_currency(prices.price(item)),
                pages
            );
        }
        println!("  {:<14} {:>10}", "Total", format_currency(prices.total(&parsed.items)));
    }

    if !parsed.residual.is_empty() {
        println!("Notes: {}", parsed.residual);
    }
}

/// Parsed items as JSON, with prices.
pub fn items_json(parsed: &ParsedSpecification, prices: &PriceList) -> Value {
    let items: Vec<Value> = parsed
        .items
        .iter()
        .map(|item| {
            json!({
                "label": item.label,
                "kind": item.kind,
                "sequence_index": item.sequence_index,
                "price": prices.price(item),
            })
        })
        .collect();

    json!({
        "items": items,
        "total": prices.total(&parsed.items),
        "residual": parsed.residual,
        "outcome": parsed.outcome,
    })
}

/// Non-zero status counts, e.g. "1 revision requested, 1 approved".
fn status_breakdown(project: &ProjectReport) -> String {
    project
        .status_counts()
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| format!("{} {}", count, status.display_name().to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_project(project: &ProjectReport) {
    let summary = &project.summary;
    println!(
        "  {}  {} ({})  {}  {}{}",
        project.project_id,
        project.name,
        project.client_id,
        format_progress(
            summary.completed_items,
            summary.total_items,
            summary.percent_complete
        ),
        format_currency(project.total_price),
        if summary.is_complete() { "  complete" } else { "" }
    );

    if !project.items.is_empty() {
        println!("      {}", status_breakdown(project));
    }

    if let ParseOutcome::Malformed { reason } = &project.spec_outcome {
        println!("      Malformed specification: {}", reason);
    }

    for item in &project.items {
        println!(
            "      {:<14} {:<19} {:>10}  {}",
            item.label,
            item.status.display_name(),
            format_currency(item.price),
            item.current_delivery_id.as_deref().unwrap_or("-")
        );
    }

    if let Some(drift) = summary.counter_drift() {
        println!(
            "      Recorded completion counter differs by {:+} from item status",
            drift
        );
    }

    for orphan in &project.unassigned {
        println!(
            "      Unassigned: {} ({}{})",
            orphan.delivery_id,
            orphan.reason.as_str(),
            orphan
                .label
                .as_deref()
                .map(|l| format!(": {}", l))
                .unwrap_or_default()
        );
    }
}

/// Print the full report for the terminal.
pub fn print_report(report: &EngineReport) {
    println!(
        "Snapshot v{} - {}",
        report.snapshot_version,
        report.period.display_name()
    );

    println!("\nProjects ({}):", report.projects.len());
    for project in &report.projects {
        print_project(project);
    }

    println!("\nClients ({}):", report.clients.len());
    for client in &report.clients {
        println!("  {} ({})", client.client_name, client.client_id);
        println!(
            "    Video:       {} ({} videos)",
            format_currency(client.video_cost),
            client.videos_completed
        );
        println!(
            "    Design:      {} ({} items)",
            format_currency(client.design_cost),
            client.items_approved
        );
        println!("    Copywriting: {}", format_currency(client.copywriting_cost));
        println!(
            "    Actual: {}  Expected: {}  Effective: {}",
            format_currency(client.actual_cost),
            format_currency(client.expected_cost),
            format_currency(client.effective_cost)
        );
        println!(
            "    Contract: {}  Net profit: {}  Margin: {}",
            format_currency(client.contract_value),
            format_currency(client.net_profit),
            format_ratio(client.margin)
        );
    }
    println!(
        "  Total contract: {}  Effective cost: {}  Net profit: {}",
        format_currency(report.total_contract_value()),
        format_currency(report.total_effective_cost()),
        format_currency(report.total_net_profit())
    );

    println!("\nTeam ({}):", report.team.len());
    for member in &report.team {
        println!(
            "  {} ({})  {}",
            member.name,
            member.role.display_name(),
            format_currency(member.total)
        );
        for earning in &member.by_client {
            println!(
                "    {}: {} ({} units)",
                earning.client_id,
                format_currency(earning.amount),
                earning.units
            );
        }
    }

    if report.quality.is_clean() {
        println!("\nData quality: clean");
    } else {
        println!("\nData quality: {} anomalies", report.quality.total());
        for (name, count) in report.quality.entries() {
            println!("  {}: {}", name, count);
        }
    }
}

/// Render the report as a markdown document.
pub fn report_markdown(report: &EngineReport) -> String {
    let mut lines = vec![
        format!("# Production report: {}", report.period.display_name()),
        String::new(),
        format!("Snapshot version {}.", report.snapshot_version),
        String::new(),
        "## Projects".to_string(),
    ];

    for project in &report.projects {
        lines.push(String::new());
        lines.push(format!(
            "### {} ({})",
            project.name, project.project_id
        ));
        lines.push(String::new());
        lines.push(format!(
            "Client `{}`, {} complete, total {}.",
            project.client_id,
            format_progress(
                project.summary.completed_items,
                project.summary.total_items,
                project.summary.percent_complete
            ),
            format_currency(project.total_price)
        ));
        if !project.items.is_empty() {
            lines.push(format!("Status: {}.", status_breakdown(project)));
        }

        if !project.items.is_empty() {
            lines.push(String::new());
            lines.push("| Item | Status | Price | Delivery | Approved |".to_string());
            lines.push("|------|--------|------:|----------|----------|".to_string());
            for item in &project.items {
                lines.push(format!(
                    "| {} | {} | {} | {} | {} |",
                    item.label,
                    item.status.display_name(),
                    format_currency(item.price),
                    item.current_delivery_id.as_deref().unwrap_or("-"),
                    format_date_opt(item.approved_at)
                ));
            }
        }

        if !project.unassigned.is_empty() {
            lines.push(String::new());
            for orphan in &project.unassigned {
                lines.push(format!(
                    "- Unassigned delivery `{}` ({})",
                    orphan.delivery_id,
                    orphan.reason.as_str()
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push("## Clients".to_string());
    lines.push(String::new());
    lines.push(
        "| Client | Video | Design | Copywriting | Actual | Expected | Contract | Net profit | Margin |"
            .to_string(),
    );
    lines.push(
        "|--------|------:|-------:|------------:|-------:|---------:|---------:|-----------:|-------:|"
            .to_string(),
    );
    for client in &report.clients {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            client.client_name,
            format_currency(client.video_cost),
            format_currency(client.design_cost),
            format_currency(client.copywriting_cost),
            format_currency(client.actual_cost),
            format_currency(client.expected_cost),
            format_currency(client.contract_value),
            format_currency(client.net_profit),
            format_percent(client.margin_pct())
        ));
    }
    lines.push(format!(
        "| **Total** | | | | | | {} | {} | |",
        format_currency(report.total_contract_value()),
        format_currency(report.total_net_profit())
    ));

    lines.push(String::new());
    lines.push("## Team".to_string());
    lines.push(String::new());
    lines.push("| Member | Role | Total |".to_string());
    lines.push("|--------|------|------:|".to_string());
    for member in &report.team {
        lines.push(format!(
            "| {} | {} | {} |",
            member.name,
            member.role.display_name(),
            format_currency(member.total)
        ));
    }

    if !report.quality.is_clean() {
        lines.push(String::new());
        lines.push("## Data quality".to_string());
        lines.push(String::new());
        for (name, count) in report.quality.entries() {
            lines.push(format!("- {}: {}", name, count));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}
