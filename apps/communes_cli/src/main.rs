use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use communes_core::{
    load_settings, DepartmentCatalog, HttpCommunesGateway, QueryController, QueryIntent,
    QuerySnapshot,
};
use shared::domain::{SortField, Threshold};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "communes", about = "List the communes of a French department")]
struct Args {
    /// Department code, e.g. 78 or 2A. Defaults to the configured department.
    #[arg(long, short = 'd')]
    department: Option<String>,
    /// Minimum population. Empty or non-numeric disables the filter.
    #[arg(long, short = 'p')]
    min_population: Option<String>,
    /// Sort field: name or population.
    #[arg(long, short = 's')]
    sort: Option<SortField>,
    /// Descending order.
    #[arg(long)]
    desc: bool,
    /// Print at most this many communes.
    #[arg(long)]
    limit: Option<usize>,
    /// Settings file (defaults to ./communes.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON department catalog replacing the built-in one.
    #[arg(long)]
    departments_file: Option<PathBuf>,
    /// Print the department catalog and exit.
    #[arg(long)]
    list_departments: bool,
}

fn load_catalog(path: Option<&PathBuf>) -> Result<DepartmentCatalog> {
    let Some(path) = path else {
        return Ok(DepartmentCatalog::builtin());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read department catalog '{}'", path.display()))?;
    DepartmentCatalog::from_json(&raw)
}

fn print_snapshot(snapshot: &QuerySnapshot<'_>, limit: Option<usize>) {
    if let Some(department) = snapshot.selected_department {
        println!("{department}");
    }
    println!(
        "{} / {} communes (population {}, sorted by {} {})",
        snapshot.filtered_count,
        snapshot.all_cities_count,
        snapshot.population_threshold,
        snapshot.sort_field,
        snapshot.sort_direction
    );
    let shown = limit.unwrap_or(snapshot.filtered_cities.len());
    for city in snapshot.filtered_cities.iter().take(shown) {
        match city.population {
            Some(population) => println!("{:>10}  {}", population, city.name),
            None => println!("{:>10}  {}", "-", city.name),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    let catalog = load_catalog(args.departments_file.as_ref())?;

    if args.list_departments {
        for department in catalog.entries() {
            println!("{}\t{}", department.code, department.name);
        }
        return Ok(());
    }

    let gateway = HttpCommunesGateway::new(&settings.api_base_url, settings.request_timeout())?;
    let mut controller =
        QueryController::new(Arc::new(gateway), settings.controller_options(&catalog));

    if let Some(raw) = &args.min_population {
        controller.dispatch(QueryIntent::SetThreshold(Threshold::parse(raw)));
    }
    if let Some(field) = args.sort {
        controller.dispatch(QueryIntent::SetSortField(field));
    }
    if args.desc {
        controller.dispatch(QueryIntent::ToggleOrder);
    }
    match &args.department {
        Some(code) => controller.dispatch(QueryIntent::SelectDepartment(Some(
            catalog.resolve(code),
        ))),
        None => controller.start(),
    }

    controller.wait_until_settled().await;

    let snapshot = controller.snapshot();
    if let Some(error) = snapshot.last_error {
        return Err(anyhow!("could not load communes: {error}"));
    }
    print_snapshot(&snapshot, args.limit);
    Ok(())
}
