//! `netform show` - print recorded state

use anyhow::{Result, bail};
use colored::Colorize;

use crate::Context;
use crate::state::ConnectorState;
use crate::ui;

pub fn run(ctx: &Context, connector: Option<&str>) -> Result<()> {
    let state = ctx.load_state()?;

    ui::header("Recorded state");
    ui::kv("file", &ctx.state_path.display().to_string());
    ui::kv("last updated", &state.last_updated.to_rfc3339());

    let selected: Vec<(&String, &ConnectorState)> = match connector {
        Some(name) => match state.connectors.get_key_value(name) {
            Some(entry) => vec![entry],
            None => bail!("No recorded state for connector '{name}'"),
        },
        None => state.connectors.iter().collect(),
    };

    if selected.is_empty() {
        println!();
        ui::info("No connectors recorded yet. Run `netform refresh` first.");
        return Ok(());
    }

    for (name, recorded) in selected {
        show_connector(name, recorded);
    }
    Ok(())
}

fn show_connector(name: &str, recorded: &ConnectorState) {
    ui::section(name);
    if let Some(at) = recorded.last_refreshed {
        ui::kv("refreshed", &at.to_rfc3339());
    }

    println!("  {}", "segment options".bold());
    if recorded.segment_options.is_empty() {
        ui::dim("(none)");
    }
    for row in &recorded.segment_options {
        println!(
            "    {} / {} → {}",
            row.segment,
            row.zone,
            row.groups.join(", ").dimmed()
        );
    }

    println!("  {}", "instances".bold());
    if recorded.instances.is_empty() {
        ui::dim("(none)");
    }
    for (position, instance) in recorded.instances.iter().enumerate() {
        let id = instance.id.as_deref().unwrap_or("-");
        println!(
            "    {:>2}. {:<24} {}",
            position + 1,
            instance.name,
            id.dimmed()
        );
    }
}
