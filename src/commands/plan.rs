//! `netform plan` - build request payloads and preview changes

use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use reconcile::{FlatOption, Resolver};

use crate::Context;
use crate::adapter::{ConnectorPayload, InstancePlan, instances, segment_options};
use crate::cli::PlanArgs;
use crate::config::{ConnectorConfig, SegmentOptionRow};
use crate::state::ConnectorState;
use crate::ui;

/// A connector's request payload next to the state it would produce
#[derive(Debug)]
pub struct PlannedConnector {
    pub payload: ConnectorPayload,
    pub desired: ConnectorState,
    pub instances: InstancePlan,
}

pub fn run(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let state = ctx.load_state()?;

    let connectors = config.select(args.connector.as_deref())?;
    if connectors.is_empty() {
        ui::info("No connectors configured");
        return Ok(());
    }

    let segments = crate::api::segment_resolver(&config)?;

    let mut payloads = Vec::new();
    let mut failed = 0;
    let mut changed = 0;

    for connector in connectors {
        let recorded = state.connector(&connector.name);
        let planned = match plan_connector(connector, &recorded, segments.as_ref()) {
            Ok(planned) => planned,
            Err(e) => {
                ui::error(&format!("{}: {e:#}", connector.name));
                failed += 1;
                continue;
            }
        };

        if !args.json && display_plan(ctx, &connector.name, &recorded, &planned)? {
            changed += 1;
        }
        payloads.push(planned.payload);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&payloads)?);
    } else if !ctx.quiet {
        println!();
        if changed == 0 && failed == 0 {
            ui::success("Recorded state matches config");
        } else {
            ui::info(&format!("{changed} connector(s) would change"));
        }
    }

    if failed > 0 {
        bail!("{failed} connector(s) could not be planned");
    }
    Ok(())
}

/// Build the request for one connector
///
/// Segment resolution is all-or-nothing: any unknown segment fails the
/// connector and no payload is produced for it.
pub fn plan_connector(
    connector: &ConnectorConfig,
    recorded: &ConnectorState,
    segments: &dyn Resolver,
) -> Result<PlannedConnector> {
    let rows = connector.flat_options();
    let groups = segment_options::build_request(&rows, segments)
        .with_context(|| format!("Failed to resolve segment options for '{}'", connector.name))?;

    let instances = instances::plan(&recorded.instances, &connector.instances);
    let payload = ConnectorPayload::new(&connector.name, groups, &instances.instances);

    let desired = ConnectorState {
        last_refreshed: None,
        segment_options: canonical_rows(&rows)?,
        instances: instances.instances.clone(),
    };

    log::debug!(
        "Planned '{}': {} segment groups, {} instances",
        connector.name,
        payload.segment_options.len(),
        payload.instances.len()
    );

    Ok(PlannedConnector {
        payload,
        desired,
        instances,
    })
}

fn canonical_rows(rows: &[FlatOption]) -> Result<Vec<SegmentOptionRow>> {
    let rows =
        segment_options::canonical(rows).context("Failed to canonicalize segment options")?;
    Ok(rows.into_iter().map(SegmentOptionRow::from).collect())
}

/// Print one connector's diff; returns whether it would change
fn display_plan(
    ctx: &Context,
    name: &str,
    recorded: &ConnectorState,
    planned: &PlannedConnector,
) -> Result<bool> {
    let recorded_flat: Vec<FlatOption> = recorded
        .segment_options
        .iter()
        .map(FlatOption::from)
        .collect();
    let baseline = ConnectorState {
        segment_options: canonical_rows(&recorded_flat)?,
        ..recorded.clone()
    };

    ui::section(name);
    let changed = ui::print_diff(&baseline.render()?, &planned.desired.render()?);

    for added in &planned.instances.added {
        println!("    {} instance {}", "+".green(), added);
    }
    for removed in &planned.instances.removed {
        println!("    {} instance {}", "-".red(), removed);
    }

    if ctx.verbose > 0 {
        ui::dim("request payload:");
        for line in serde_json::to_string_pretty(&planned.payload)?.lines() {
            ui::dim(line);
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Instance;
    use reconcile::{AggregatedGroup, MapResolver};

    fn connector() -> ConnectorConfig {
        ConnectorConfig {
            name: "dc-east".into(),
            segment_options: vec![
                SegmentOptionRow {
                    segment: "Green".into(),
                    zone: "zoneA".into(),
                    groups: vec!["g4".into()],
                },
                SegmentOptionRow {
                    segment: "Blue".into(),
                    zone: "zoneA".into(),
                    groups: vec!["g1".into()],
                },
            ],
            instances: vec![Instance::named("inst-a"), Instance::named("inst-b")],
        }
    }

    fn segments() -> MapResolver {
        MapResolver::from_pairs("segment", [("Blue", "seg-1"), ("Green", "seg-2")]).unwrap()
    }

    #[test]
    fn test_plan_connector_builds_payload() {
        let planned =
            plan_connector(&connector(), &ConnectorState::default(), &segments()).unwrap();

        assert_eq!(
            planned.payload.segment_options,
            vec![
                AggregatedGroup::new("seg-2").with_child("zoneA", ["g4"]),
                AggregatedGroup::new("seg-1").with_child("zoneA", ["g1"]),
            ]
        );
        assert_eq!(planned.payload.instances.len(), 2);
        assert_eq!(planned.instances.added, vec!["inst-a", "inst-b"]);
        // desired rows are canonical (sorted by segment)
        assert_eq!(planned.desired.segment_options[0].segment, "Blue");
    }

    #[test]
    fn test_plan_connector_unknown_segment_fails() {
        let mut connector = connector();
        connector.segment_options.push(SegmentOptionRow {
            segment: "Red".into(),
            zone: "zoneA".into(),
            groups: vec![],
        });

        let err = plan_connector(&connector, &ConnectorState::default(), &segments()).unwrap_err();
        let root = err.downcast_ref::<reconcile::Error>().unwrap();
        assert!(root.is_not_found());
    }

    #[test]
    fn test_plan_connector_keeps_recorded_instance_order() {
        let recorded = ConnectorState {
            instances: vec![Instance::named("inst-b"), Instance::named("inst-a")],
            ..ConnectorState::default()
        };

        let planned = plan_connector(&connector(), &recorded, &segments()).unwrap();

        let names: Vec<_> = planned
            .payload
            .instances
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["inst-b", "inst-a"]);
        assert!(!planned.instances.has_changes());
    }
}
