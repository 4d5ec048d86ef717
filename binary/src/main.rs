use std::{env, error::Error, path::PathBuf, time::Instant};

use lpo::{derive_views, minimal_elements, Exportable, Importable, LPO};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn program_name(args: &[String]) -> &str {
    args.first().map_or("binary", String::as_str)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!(
            "Usage: {} <input.lpo|input.xml|input.json> [output.lpo|output.xml|output.json]",
            program_name(&args)
        );
        std::process::exit(1);
    }
    let input_path = PathBuf::from(&args[1]);

    let mut order = LPO::import_from_path(&input_path)?;
    info!(
        path = ?input_path,
        events = order.event_count(),
        arcs = order.arcs().len(),
        "imported order"
    );

    let roots = minimal_elements(&order);
    let now = Instant::now();
    let (closure, skeleton) = derive_views(&mut order)?;
    println!(
        "Derived closure and skeleton of {:?} in {:#?}",
        order.name,
        now.elapsed()
    );
    println!(
        "  Minimal events: {}",
        roots.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
    );
    println!(
        "  Closure: {} arcs ({} retained, {} derived, {} removed)",
        closure.arc_count(),
        closure.retained,
        closure.added,
        closure.removed
    );
    println!(
        "  Skeleton: {} arcs ({} redundant)",
        skeleton.skeleton, skeleton.redundant
    );
    for arc in order.skeleton_arcs() {
        let (from, to) = order.resolve(arc)?;
        println!("    {} -> {}", from.label, to.label);
    }

    if let Some(output) = args.get(2) {
        let output_path = PathBuf::from(output);
        order.export_to_path(&output_path)?;
        println!("Exported order to {:?}", output_path);
    }
    Ok(())
}
