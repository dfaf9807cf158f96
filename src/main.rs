//! Entry point: config loading, table loading, report building and export.

use std::process;

use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use timeslice_profiles::aggregate::year_totals;
use timeslice_profiles::classify::TechnologyClassifier;
use timeslice_profiles::cli::Cli;
use timeslice_profiles::config::RunConfig;
use timeslice_profiles::io::read::{ResultTables, read_lookup_tables};
use timeslice_profiles::report::{self, RunReport, SummaryTable};

fn init_logging(cli: &Cli) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: failed to install logger: {e}");
    }
}

fn load_config(cli: &Cli) -> RunConfig {
    let mut config = match cli.config {
        Some(ref path) => match RunConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => RunConfig::default(),
    };
    cli.apply(&mut config);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn run(config: &RunConfig) -> timeslice_profiles::Result<RunReport> {
    let (calendar, colors) = read_lookup_tables(&config.paths.input_data_dir)?;
    let classifier = TechnologyClassifier::new(&config.classify, colors);
    let tables = ResultTables::read(&config.paths)?;
    report::build(config, &calendar, &classifier, &tables)
}

fn print_summary(table: &SummaryTable) {
    let table = match table.non_empty() {
        Ok(t) => t,
        Err(e) => {
            warn!("{}: {e}", table.title);
            return;
        }
    };
    println!("{} [{}]", table.title, table.unit);
    for row in &table.rows {
        println!("  {:<12} {}  {:>14.4}", row.label, row.year, row.value);
    }
    for (year, total) in year_totals(&table.rows) {
        println!("  {:<12} {}  {:>14.4}", "total", year, total);
    }
}

fn main() {
    let cli = Cli::parse_args();
    init_logging(&cli);

    let config = load_config(&cli);
    let report = match run(&config) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    print_summary(&report.capacity);
    print_summary(&report.generation);
    for c in &report.countries {
        print_summary(&c.capacity);
        print_summary(&c.generation);
    }
    println!(
        "{}: {} hourly rows x {} labels",
        report.hourly.title,
        report.hourly.matrix.rows().len(),
        report.hourly.matrix.labels().len()
    );

    match report.export(&config.paths.output_dir) {
        Ok(files) => {
            for f in &files {
                info!("wrote {}", f.display());
            }
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(timeslice_profiles::api::AppState { report });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(timeslice_profiles::api::serve(state, addr));
    }
}
