// State lattice expansion demo
// Runs a small A* over lattice nodes on a costmap and plots what it expanded.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gnuplot::*;
use nalgebra::DMatrix;
use ordered_float::OrderedFloat;
use tracing::{info, warn};

use lattice_planning::path_planning::state_lattice::{
    HeuristicTables, LatticeConfig, LatticeMotionTable, LatticeNode, MotionTableCache, NodeArena,
    NodeIndex,
};
use lattice_planning::utils::{costs, Costmap, GridCollisionChecker};
use lattice_planning::{Coordinates, LatticeError, LatticeResult, NodePool};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Trace,
}

impl From<Verbosity> for tracing::Level {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Quiet => tracing::Level::WARN,
            Verbosity::Normal => tracing::Level::INFO,
            Verbosity::Verbose => tracing::Level::DEBUG,
            Verbosity::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(version)]
/// Expand state lattice nodes from a start pose towards a goal pose.
struct Cli {
    #[arg(help = "The lattice configuration file (TOML)")]
    config: PathBuf,
    #[arg(
        help = "Start cell and heading bin",
        long = "start",
        num_args = 3,
        value_names = ["X", "Y", "THETA"],
        default_values_t = [3u32, 3, 0]
    )]
    start: Vec<u32>,
    #[arg(
        help = "Goal cell and heading bin",
        long = "goal",
        num_args = 3,
        value_names = ["X", "Y", "THETA"],
        default_values_t = [37u32, 25, 0]
    )]
    goal: Vec<u32>,
    #[arg(
        help = "Give up after this many expansions",
        short = 'n',
        long = "max-expansions",
        default_value_t = 50_000
    )]
    max_expansions: usize,
    #[arg(help = "Save the plot to this SVG file", short = 'o', long = "output")]
    output: Option<PathBuf>,
    #[arg(
        value_enum,
        help = "The verbosity level",
        short = 'v',
        long = "verbosity",
        default_value_t = Verbosity::Normal
    )]
    verbosity: Verbosity,
}

fn demo_costmap() -> LatticeResult<Costmap> {
    const X: u8 = costs::LETHAL_OBSTACLE;
    #[rustfmt::skip]
    let original_matrix = DMatrix::from_row_slice(10, 14, &[
        0, 0, 0, 0, 0, 0, 0, 0, X, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, X, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, X, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, X, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, X, 0, 0, 0, 0, 0,
        0, 0, 0, 0, X, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, X, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, X, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, X, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, X, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ]);
    Costmap::from_occupancy(original_matrix, 3)
}

fn coordinates(values: &[u32]) -> Coordinates {
    Coordinates::new(values[0] as f64, values[1] as f64, values[2])
}

struct SearchResult {
    path: Vec<Coordinates>,
    expanded: Vec<Coordinates>,
}

fn search(
    table: &LatticeMotionTable,
    costmap: &Costmap,
    heuristics: &HeuristicTables,
    start: Coordinates,
    goal: Coordinates,
    traverse_unknown: bool,
    max_expansions: usize,
) -> SearchResult {
    let indexer = table.indexer();
    let mut arena = NodeArena::with_capacity(max_expansions);
    let mut checker = GridCollisionChecker::new(costmap);
    let mut open: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeIndex)>> = BinaryHeap::new();
    let mut expanded = Vec::new();

    let start_index = indexer.index(start.x as u32, start.y as u32, start.theta);
    let goal_index = indexer.index(goal.x as u32, goal.y as u32, goal.theta);
    {
        let (node, _) = arena.get_or_allocate(start_index);
        node.set_pose(start);
        node.set_accumulated_cost(0.0);
        node.queued();
    }
    open.push(Reverse((OrderedFloat(0.0), start_index)));

    while let Some(Reverse((_, index))) = open.pop() {
        let parent = match arena.get_mut(index) {
            Some(node) if !node.was_visited() => {
                node.visited();
                node.clone()
            }
            _ => continue,
        };
        expanded.push(parent.pose());

        if index == goal_index {
            info!(expansions = expanded.len(), cost = parent.accumulated_cost(), "goal reached");
            return SearchResult {
                path: arena.backtrace(index),
                expanded,
            };
        }
        if expanded.len() >= max_expansions {
            warn!(max_expansions, "expansion budget exhausted");
            break;
        }

        let neighbors =
            LatticeNode::get_neighbors(index, &mut arena, &mut checker, traverse_unknown, table);
        for neighbor in neighbors {
            let child = match arena.get_mut(neighbor) {
                Some(child) => child,
                None => continue,
            };
            let cost = parent.accumulated_cost() + parent.traversal_cost(child, table);
            if cost < child.accumulated_cost() {
                child.set_accumulated_cost(cost);
                child.set_parent(Some(index));
                child.queued();
                let h = LatticeNode::heuristic_cost(&child.pose(), &goal, table, heuristics);
                open.push(Reverse((OrderedFloat(cost + h), neighbor)));
            }
        }
    }

    SearchResult {
        path: Vec::new(),
        expanded,
    }
}

fn plot(
    costmap: &Costmap,
    result: &SearchResult,
    start: Coordinates,
    goal: Coordinates,
    output: Option<&PathBuf>,
) {
    let mut obstacle_x = vec![];
    let mut obstacle_y = vec![];
    for y in 0..costmap.size_y() {
        for x in 0..costmap.size_x() {
            if !costmap.is_traversable(x, y, true) {
                obstacle_x.push(x as f64);
                obstacle_y.push(y as f64);
            }
        }
    }
    let expanded_x: Vec<f64> = result.expanded.iter().map(|c| c.x).collect();
    let expanded_y: Vec<f64> = result.expanded.iter().map(|c| c.y).collect();
    let path_x: Vec<f64> = result.path.iter().map(|c| c.x).collect();
    let path_y: Vec<f64> = result.path.iter().map(|c| c.y).collect();

    let mut fg = Figure::new();
    fg.axes2d()
        .set_title("State lattice expansion", &[])
        .set_x_range(Fix(-1.0), Fix(costmap.size_x() as f64))
        .set_y_range(Fix(-1.0), Fix(costmap.size_y() as f64))
        .set_aspect_ratio(Fix(1.0))
        .points(
            &obstacle_x,
            &obstacle_y,
            &[PointSymbol('S'), Color("black"), PointSize(2.0)],
        )
        .points(
            &expanded_x,
            &expanded_y,
            &[PointSymbol('O'), Color("gray"), PointSize(0.5)],
        )
        .lines(&path_x, &path_y, &[Color("blue"), LineWidth(2.0)])
        .points(
            Some(start.x),
            Some(start.y),
            &[PointSymbol('O'), Color("red"), PointSize(2.0)],
        )
        .points(
            Some(goal.x),
            Some(goal.y),
            &[PointSymbol('O'), Color("green"), PointSize(2.0)],
        );

    let shown = match output {
        Some(path) => fg.save_to_svg(path, 800, 600),
        None => fg.show().map(|_| ()),
    };
    if let Err(e) = shown {
        warn!("could not run gnuplot: {}", e);
    }
}

fn run(cli: Cli) -> LatticeResult<()> {
    let config = LatticeConfig::from_toml_file(&cli.config)?;
    let costmap = demo_costmap()?;
    let start = coordinates(&cli.start);
    let goal = coordinates(&cli.goal);
    for pose in [&start, &goal] {
        if !costmap.is_traversable(pose.x as usize, pose.y as usize, config.traverse_unknown) {
            return Err(LatticeError::InvalidParameter(format!(
                "pose ({}, {}) is not on free space",
                pose.x, pose.y
            )));
        }
    }

    let mut cache = MotionTableCache::default();
    let table = cache.build(costmap.size_x() as u32, &config)?;
    if start.theta >= table.num_angle_bins() || goal.theta >= table.num_angle_bins() {
        return Err(LatticeError::InvalidParameter(format!(
            "heading bins must be below {}",
            table.num_angle_bins()
        )));
    }
    let heuristics = HeuristicTables::build(
        &table,
        &costmap,
        &goal,
        config.lookup_table_size,
        config.traverse_unknown,
    )?;

    let result = search(
        &table,
        &costmap,
        &heuristics,
        start,
        goal,
        config.traverse_unknown,
        cli.max_expansions,
    );
    info!(
        expanded = result.expanded.len(),
        path_length = result.path.len(),
        "search finished"
    );
    plot(&costmap, &result, start, goal, cli.output.as_ref());
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level: tracing::Level = cli.verbosity.into();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(e) = run(cli) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
