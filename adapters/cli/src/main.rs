#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the garden planner against a TOML garden document.

mod preview_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use garden_planner_core::{
    BedId, CellCoord, Command, Event, FillStrategy, PlacementCommit, PlacementId, PlanItemId,
    PlanningMethod, PlantId, WaveLink,
};
use garden_planner_garden::{apply, query, Garden, GardenSnapshot};
use garden_planner_system_density::capacity_of;
use garden_planner_system_placement::{preview_placement, PlacementRequest};
use garden_planner_system_reconciliation::{reconcile_with, ReconcileOptions};
use garden_planner_system_succession::succession_breakdown;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::preview_transfer::PreviewToken;

/// Plans bed layouts, staggers successions and reconciles them against reality.
#[derive(Debug, Parser)]
#[command(name = "garden-planner", version)]
struct Cli {
    /// Garden document holding beds, plants, plan items, placements and events.
    #[arg(long, default_value = "garden.toml")]
    garden: PathBuf,
    /// Increases log verbosity; repeat for debug output.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Prints how many plants of a catalog entry fit in one cell.
    Capacity {
        /// Catalog identifier of the plant.
        plant: u32,
        /// Planning method; every method is listed when omitted.
        #[arg(long, value_enum)]
        method: Option<MethodArg>,
        /// Cell edge length in inches; defaults to the method's cell size.
        #[arg(long)]
        cell_size: Option<u32>,
    },
    /// Prints the succession waves of a plan item.
    Breakdown {
        /// Plan item identifier.
        plan_item: u32,
    },
    /// Searches a bed for free cells and prints a token for `commit`.
    Preview {
        /// Bed identifier.
        bed: u32,
        /// Catalog identifier of the plant.
        plant: u32,
        /// Number of plants to place.
        plants: u32,
        /// Planting date used as the occupancy reference (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
        /// Column of the first cell to scan.
        #[arg(long, default_value_t = 0)]
        column: u32,
        /// Row of the first cell to scan.
        #[arg(long, default_value_t = 0)]
        row: u32,
        /// Scan order across the bed.
        #[arg(long, value_enum, default_value_t = FillArg::RowMajor)]
        fill: FillArg,
        /// Restricts the scan to this many rows starting at `--row`.
        #[arg(long)]
        rows: Option<u32>,
    },
    /// Persists the cells of a preview token.
    Commit {
        /// Token printed by `preview`.
        #[arg(long)]
        token: String,
        /// Variety name recorded on the placements.
        #[arg(long, default_value = "")]
        variety: String,
        /// Plan item the placement realizes.
        #[arg(long, requires = "wave")]
        plan_item: Option<u32>,
        /// Succession wave the placement realizes.
        #[arg(long, requires = "plan_item")]
        wave: Option<u32>,
        /// Persists the batch even when it overlaps growing plants.
        #[arg(long = "override")]
        override_conflicts: bool,
    },
    /// Removes a committed placement.
    Remove {
        /// Placement identifier.
        placement: u32,
    },
    /// Compares a plan item's waves with placements and scheduled events.
    Reconcile {
        /// Plan item identifier.
        plan_item: u32,
        /// Days either side of a wave date within which unlinked records match.
        #[arg(long)]
        tolerance_days: Option<u32>,
    },
    /// Exports a plan item's waves as scheduled events.
    Export {
        /// Plan item identifier.
        plan_item: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodArg {
    SquareFoot,
    Row,
    Intensive,
    HighDensity,
    Broadcast,
}

impl From<MethodArg> for PlanningMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::SquareFoot => Self::SquareFoot,
            MethodArg::Row => Self::Row,
            MethodArg::Intensive => Self::Intensive,
            MethodArg::HighDensity => Self::HighDensity,
            MethodArg::Broadcast => Self::Broadcast,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FillArg {
    RowMajor,
    ColumnMajor,
}

impl From<FillArg> for FillStrategy {
    fn from(value: FillArg) -> Self {
        match value {
            FillArg::RowMajor => Self::RowMajor,
            FillArg::ColumnMajor => Self::ColumnMajor,
        }
    }
}

/// Entry point for the garden planner command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    install_subscriber(cli.verbose)?;

    let mut garden = load_garden(&cli.garden)?;
    let dirty = run(&mut garden, cli.command)?;
    if dirty {
        save_garden(&cli.garden, &garden)?;
    }
    Ok(())
}

fn install_subscriber(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")
}

fn load_garden(path: &Path) -> Result<Garden> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read garden document {}", path.display()))?;
    let snapshot: GardenSnapshot = toml::from_str(&text)
        .with_context(|| format!("failed to parse garden document {}", path.display()))?;
    Garden::restore(snapshot)
        .with_context(|| format!("garden document {} is inconsistent", path.display()))
}

fn save_garden(path: &Path, garden: &Garden) -> Result<()> {
    let text = toml::to_string_pretty(&query::snapshot(garden))
        .context("failed to serialise garden document")?;
    fs::write(path, text)
        .with_context(|| format!("failed to write garden document {}", path.display()))
}

/// Executes one action, reporting whether the garden must be saved.
fn run(garden: &mut Garden, action: Action) -> Result<bool> {
    match action {
        Action::Capacity {
            plant,
            method,
            cell_size,
        } => {
            print_capacity(garden, PlantId::new(plant), method, cell_size)?;
            Ok(false)
        }
        Action::Breakdown { plan_item } => {
            let id = PlanItemId::new(plan_item);
            let item = query::plan_item(garden, id)
                .with_context(|| format!("plan item {id} does not exist"))?;
            for wave in succession_breakdown(item)? {
                println!("wave {}  {}  {} plants", wave.index, wave.date, wave.quantity);
            }
            Ok(false)
        }
        Action::Preview {
            bed,
            plant,
            plants,
            date,
            column,
            row,
            fill,
            rows,
        } => {
            print_preview(
                garden,
                BedId::new(bed),
                PlantId::new(plant),
                plants,
                date,
                CellCoord::new(column, row),
                fill.into(),
                rows,
            )?;
            Ok(false)
        }
        Action::Commit {
            token,
            variety,
            plan_item,
            wave,
            override_conflicts,
        } => {
            let token = PreviewToken::decode(&token)?;
            let link = plan_item
                .zip(wave)
                .map(|(plan_item, wave)| WaveLink::new(PlanItemId::new(plan_item), wave));
            let commit = PlacementCommit {
                bed: token.bed,
                plant: token.plant,
                variety,
                planted: token.planted,
                cells: token.cells,
                link,
                override_conflicts,
            };
            match apply_one(garden, Command::CommitPlacement { commit })? {
                Event::PlacementCommitted {
                    placements,
                    over_capacity,
                    ..
                } => {
                    println!("committed {} placements", placements.len());
                    for cell in over_capacity {
                        println!("warning: cell {cell} holds more plants than its spacing allows");
                    }
                    Ok(true)
                }
                Event::PlacementConflictsPending { conflicts, .. } => {
                    for conflict in &conflicts {
                        println!(
                            "conflict: placement {} at {} overlaps {} between {} and {}",
                            conflict.placement,
                            conflict.occupied_cell,
                            conflict.candidate_cell,
                            conflict.overlap.start(),
                            conflict.overlap.end()
                        );
                    }
                    bail!(
                        "{} conflicts pending; rerun with --override to commit anyway",
                        conflicts.len()
                    )
                }
                Event::PlacementRejected { reason, .. } => Err(reason.into()),
                other => bail!("unexpected ledger response {other:?}"),
            }
        }
        Action::Remove { placement } => {
            let placement = PlacementId::new(placement);
            match apply_one(garden, Command::RemovePlacement { placement })? {
                Event::PlacementRemoved { .. } => {
                    println!("removed placement {placement}");
                    Ok(true)
                }
                _ => bail!("placement {placement} does not exist"),
            }
        }
        Action::Reconcile {
            plan_item,
            tolerance_days,
        } => {
            print_reconciliation(garden, PlanItemId::new(plan_item), tolerance_days)?;
            Ok(false)
        }
        Action::Export { plan_item } => {
            let plan_item = PlanItemId::new(plan_item);
            match apply_one(garden, Command::ExportPlanItem { plan_item })? {
                Event::ScheduleExported { events_created, .. } => {
                    println!("exported {events_created} new events for plan item {plan_item}");
                    Ok(events_created > 0)
                }
                Event::ExportRejected { reason, .. } => Err(reason.into()),
                other => bail!("unexpected ledger response {other:?}"),
            }
        }
    }
}

fn apply_one(garden: &mut Garden, command: Command) -> Result<Event> {
    let mut events = Vec::with_capacity(1);
    apply(garden, command, &mut events);
    events.pop().context("ledger produced no response")
}

fn print_capacity(
    garden: &Garden,
    plant: PlantId,
    method: Option<MethodArg>,
    cell_size: Option<u32>,
) -> Result<()> {
    let profile =
        query::plant(garden, plant).with_context(|| format!("plant {plant} does not exist"))?;
    let methods = match method {
        Some(method) => vec![PlanningMethod::from(method)],
        None => PlanningMethod::ALL.to_vec(),
    };
    for method in methods {
        let cell = cell_size.unwrap_or_else(|| method.default_cell_size_inches());
        let capacity = capacity_of(profile, method, cell)?;
        let source = if method.packing().is_seed_density() {
            "seed density"
        } else {
            "spacing"
        };
        if capacity.needs_multiple_cells() {
            println!(
                "{method:?} ({cell}\" cells, {source}): one plant per {} cells",
                capacity.cells_per_plant()
            );
        } else {
            println!(
                "{method:?} ({cell}\" cells, {source}): {} plants per cell",
                capacity.plants_per_cell()
            );
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn print_preview(
    garden: &Garden,
    bed: BedId,
    plant: PlantId,
    plants: u32,
    date: NaiveDate,
    start: CellCoord,
    fill: FillStrategy,
    rows: Option<u32>,
) -> Result<()> {
    let bed_record = query::bed(garden, bed).with_context(|| format!("bed {bed} does not exist"))?;
    let profile =
        query::plant(garden, plant).with_context(|| format!("plant {plant} does not exist"))?;

    let mut request = PlacementRequest::new(bed_record, profile, start, plants);
    request.fill = fill;
    request.row_limit = rows;
    let occupants = query::occupants(garden, bed);
    let preview = preview_placement(&request, &occupants, date)?;

    for assignment in &preview.assignments {
        println!("{}  {} plants", assignment.cell, assignment.quantity);
    }
    println!(
        "found {} of {} cells for {} plants",
        preview.found_count(),
        preview.requested_cells,
        preview.requested_plants
    );
    if !preview.is_complete() {
        println!("shortfall: {} cells could not be placed", preview.shortfall());
    }
    if let Some(warning) = preview.capacity_warning {
        println!(
            "warning: {} plants requested but the found cells hold {}",
            warning.requested, warning.capacity
        );
    }

    let token = PreviewToken {
        bed,
        plant,
        planted: date,
        cells: preview.assignments,
    };
    println!("token: {}", token.encode()?);
    Ok(())
}

fn print_reconciliation(
    garden: &Garden,
    plan_item: PlanItemId,
    tolerance_days: Option<u32>,
) -> Result<()> {
    let item = query::plan_item(garden, plan_item)
        .with_context(|| format!("plan item {plan_item} does not exist"))?;
    let options =
        tolerance_days.map_or_else(ReconcileOptions::default, ReconcileOptions::with_tolerance);
    let placements = query::placements(garden);
    let events = query::scheduled_events(garden);
    let result = reconcile_with(item, &placements, &events, &options)?;

    for wave in result.waves() {
        println!(
            "wave {}  {}  {:<10} declared {:>4}  placed {:>4}  positioned {:>4}  scheduled {:>4}",
            wave.wave_index,
            wave.date,
            wave.status.label(),
            wave.declared,
            wave.placed_count,
            wave.positioned_count,
            wave.scheduled_count
        );
    }
    let summary = result.summary();
    println!(
        "realized {} of {} declared plants",
        summary.realized, summary.declared
    );
    if result.is_approximate() {
        println!("note: some records were matched by date order only");
    }
    Ok(())
}
