use clap::Parser;
use std::path::PathBuf;
use workflow::config::{ElementKind, ProbeShape, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline scan-conversion driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ProbeShape::Sector)]
    probe: ProbeShape,
    #[arg(long, default_value_t = 128)]
    rays: usize,
    #[arg(long, default_value_t = 512)]
    samples: usize,
    /// Output pixels per centimetre
    #[arg(long, default_value_t = 30.0)]
    density: f64,
    #[arg(long)]
    rows: Option<usize>,
    #[arg(long)]
    cols: Option<usize>,
    /// Mirror the raster left to right
    #[arg(long, default_value_t = false)]
    flip: bool,
    /// Draw a dashed grid with this spacing in centimetres
    #[arg(long)]
    grid: Option<f64>,
    #[arg(long, default_value_t = false)]
    palette: bool,
    #[arg(long, value_enum, default_value_t = ElementKind::Float)]
    element: ElementKind,
    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig {
            rows: args.rows,
            cols: args.cols,
            flip: args.flip,
            grid_step: args.grid,
            palette: args.palette,
            element: args.element,
            ..WorkflowConfig::from_args(args.probe, args.rays, args.samples, args.density)
        }
    };

    let runner = Runner::new(workflow_config);
    let result = runner.execute()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Converted -> raster {}x{} at {:.2} px/cm, depth {:.2}..{:.2} cm, width {:.2} cm",
            result.rows,
            result.cols,
            result.density,
            result.dimensions.v_min,
            result.dimensions.v_max,
            result.dimensions.h_max - result.dimensions.h_min
        );
        println!(
            "Table -> {} neighbour, {} near-field, {} background; mean level {:.4}; {:.2} ms",
            result.neighbors,
            result.near_field,
            result.background,
            result.mean_level,
            result.elapsed_ms
        );
    }

    Ok(())
}
