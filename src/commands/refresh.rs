//! `netform refresh` - record observed connectors as the new state

use anyhow::{Context as AnyhowContext, Result, bail};
use reconcile::Resolver;
use std::fs;

use crate::Context;
use crate::adapter::{ConnectorPayload, instances, segment_options};
use crate::api;
use crate::cli::RefreshArgs;
use crate::config::SegmentOptionRow;
use crate::paths;
use crate::state::ConnectorState;
use crate::ui;

pub fn run(ctx: &Context, args: &RefreshArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let mut state = ctx.load_state()?;
    let segments = api::segment_resolver(&config)?;

    let observed = match &args.response {
        Some(path) => {
            let payload = read_response_file(path)?;
            if let Some(name) = &args.connector
                && *name != payload.name
            {
                bail!(
                    "Response is for connector '{}', not '{}'",
                    payload.name,
                    name
                );
            }
            vec![payload]
        }
        None => {
            let client = api::client(&config)?;
            config
                .select(args.connector.as_deref())?
                .into_iter()
                .map(|c| client.fetch_connector(&c.name))
                .collect::<Result<Vec<_>>>()?
        }
    };

    if observed.is_empty() {
        ui::info("No connectors to refresh");
        return Ok(());
    }

    let mut changed = 0;
    for payload in &observed {
        let recorded = state.connector(&payload.name);
        let updated = refresh_connector(payload, &recorded, segments.as_ref())
            .with_context(|| format!("Failed to refresh connector '{}'", payload.name))?;

        if show_change(ctx.quiet, &payload.name, &recorded.render()?, &updated.render()?) {
            changed += 1;
        }
        state.record(&payload.name, updated);
    }

    if !ctx.quiet {
        println!();
    }
    if args.dry_run {
        ui::warn("Dry run: state not written");
        return Ok(());
    }

    state.touch(&ctx.state_path)?;
    ui::success(&format!(
        "Refreshed {} connector(s), {} changed",
        observed.len(),
        changed
    ));
    if !ctx.quiet {
        ui::kv("state", &ctx.state_path.display().to_string());
    }
    Ok(())
}

/// Reconcile one observed connector against its recorded state
///
/// Segment options are flattened back to names; a segment id that no longer
/// resolves fails the whole connector. Instances keep their recorded order.
pub fn refresh_connector(
    observed: &ConnectorPayload,
    recorded: &ConnectorState,
    segments: &dyn Resolver,
) -> Result<ConnectorState> {
    let rows = segment_options::read_response(&observed.segment_options, segments)
        .context("Failed to resolve observed segment options")?;

    let (instances, report) = instances::refresh(recorded.instances.clone(), observed.instances())
        .context("Observed instance list has an invalid name")?;
    log::info!(
        "{}: {} instances kept, {} new, {} gone",
        observed.name,
        report.matched,
        report.added,
        report.dropped
    );

    Ok(ConnectorState {
        last_refreshed: recorded.last_refreshed,
        segment_options: rows.into_iter().map(SegmentOptionRow::from).collect(),
        instances,
    })
}

/// Print a connector's diff unless quiet; returns whether it changed
fn show_change(quiet: bool, name: &str, before: &str, after: &str) -> bool {
    if quiet {
        return !ui::diff_lines(before, after).is_empty();
    }
    ui::section(name);
    ui::print_diff(before, after)
}

fn read_response_file(path: &str) -> Result<ConnectorPayload> {
    let path = paths::expand(path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Could not read response file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid connector response in {}", path.display()))
}
