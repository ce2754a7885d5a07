use clap::{Parser, Subcommand, ValueEnum};
use racedata::config::{parse_config, RaceDataConfig};
use racedata::report::{
    format_comparison_output, format_race_summary, generate_driver_profile, save_analysis_report,
};
use racedata::series::{RaceManager, SeriesRace};
use racedata::timing::TimingAnalytics;
use racedata::{timing, validation, RaceDataStore, RaceResult};
use std::path::{Path, PathBuf};
use std::process;

/// racedata CLI — load, validate and query motorsport race records
#[derive(Parser)]
#[command(name = "racedata", version, about)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Load rows from a .csv or .json file and print them with parsed dates
    Load {
        /// Source file
        source: PathBuf,
    },

    /// Check that every row has a driver and a team
    Validate {
        /// Source file
        source: PathBuf,
    },

    /// Rows whose driver contains the query (case-insensitive)
    Search {
        /// Source file
        source: PathBuf,
        /// Driver name or part of it
        query: String,
    },

    /// Rows for one team (case-insensitive exact match)
    Team {
        /// Source file
        source: PathBuf,
        /// Team name
        team: String,
    },

    /// Rows sorted by date
    Sort {
        /// Source file
        source: PathBuf,
        /// Newest first
        #[arg(long)]
        descending: bool,
    },

    /// Load a results CSV into the typed store and query it
    Results {
        /// CSV file with race_id,date,circuit,driver,team columns
        csv: PathBuf,
        /// Driver name or identifier (exact, case-insensitive)
        #[arg(long)]
        driver: Option<String>,
        /// Team name (exact, case-insensitive)
        #[arg(long)]
        team: Option<String>,
        /// Only this season
        #[arg(long)]
        season: Option<i32>,
        /// Newest first
        #[arg(long)]
        descending: bool,
    },

    /// Text summary of one race
    Summary {
        /// Results CSV
        csv: PathBuf,
        /// Race identifier
        race_id: String,
        /// Maximum lines (defaults to the config value)
        #[arg(long)]
        top_n: Option<usize>,
        /// Also write the summary to the configured report directory
        #[arg(long)]
        save: bool,
    },

    /// Compare two drivers side by side
    Compare {
        /// Results CSV
        csv: PathBuf,
        /// First driver identifier
        driver_a: String,
        /// Second driver identifier
        driver_b: String,
    },

    /// Score races given as series:name:laps (e.g. f1:Monaco:78)
    Score {
        #[arg(required = true)]
        races: Vec<SeriesRace>,
    },

    /// Average finish time from a file with one time per line
    Average {
        /// Finish times file
        file: PathBuf,
    },

    /// Finish-time analytics over a timing sheet
    Timing {
        /// CSV with Driver Name, Team, Finish Time and Race Date columns
        csv: PathBuf,
        #[command(subcommand)]
        query: TimingQuery,
    },
}

#[derive(Subcommand)]
enum TimingQuery {
    /// Rows for one driver (exact, case-insensitive)
    Driver { name: String },
    /// Rows for one team (exact, case-insensitive)
    Team { team: String },
    /// Average finish of two drivers and the faster one
    Compare { first: String, second: String },
    /// Average finish per team, best first
    Teams,
    /// Drivers with the lowest average finish
    Top {
        #[arg(long, default_value_t = 5)]
        top_n: usize,
    },
    /// Finish times of one driver by race date
    Trend { name: String },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => parse_config(path)?,
        None => RaceDataConfig::default(),
    };
    log::debug!("Using config: {config:?}");

    match cli.command {
        Command::Load { source } => {
            let rows = racedata::load_race_data(source)?;
            print_output(&serde_json::to_value(&rows)?, &cli.format)?;
        }

        Command::Validate { source } => {
            let rows = racedata::load_race_data(source)?;
            validation::validate_all(&rows)?;
            print_output(
                &serde_json::json!({ "ok": true, "rows": rows.len() }),
                &cli.format,
            )?;
        }

        Command::Search { source, query } => {
            let rows = racedata::load_race_data(source)?;
            let found = racedata::search_driver_results(&rows, &query);
            print_output(&serde_json::to_value(&found)?, &cli.format)?;
        }

        Command::Team { source, team } => {
            let rows = racedata::load_race_data(source)?;
            let found = racedata::filter_by_team(&rows, &team);
            print_output(&serde_json::to_value(&found)?, &cli.format)?;
        }

        Command::Sort { source, descending } => {
            let rows = racedata::load_race_data(source)?;
            let sorted =
                racedata::sort_races_by_date(&rows, descending || config.sort.descending)?;
            print_output(&serde_json::to_value(&sorted)?, &cli.format)?;
        }

        Command::Results {
            csv,
            driver,
            team,
            season,
            descending,
        } => {
            let store = open_store(&csv)?;
            let mut results: Vec<&RaceResult> = match (&driver, &team) {
                (Some(d), _) => store.search_driver_results(d, season),
                (None, Some(t)) => store.filter_by_team(t, season),
                (None, None) => store
                    .sort_races_by_date(true)
                    .into_iter()
                    .filter(|r| season.map_or(true, |s| r.season == s))
                    .collect(),
            };
            if let (Some(_), Some(t)) = (&driver, &team) {
                let wanted = t.trim().to_lowercase();
                results.retain(|r| r.team.to_lowercase() == wanted);
            }
            if descending || config.sort.descending {
                results.sort_by(|a, b| b.date.cmp(&a.date));
            }
            print_output(&serde_json::to_value(&results)?, &cli.format)?;
        }

        Command::Summary {
            csv,
            race_id,
            top_n,
            save,
        } => {
            let store = open_store(&csv)?;
            let top_n = top_n.unwrap_or(config.report.top_n);
            let summary = format_race_summary(&race_id, store.results(), top_n);
            if save {
                let path = save_analysis_report(
                    &summary,
                    &config.report.output_dir,
                    &config.report.filename,
                    config.report.overwrite,
                )?;
                log::info!("Saved summary to {}", path.display());
            }
            println!("{summary}");
        }

        Command::Compare {
            csv,
            driver_a,
            driver_b,
        } => {
            let store = open_store(&csv)?;
            let a = generate_driver_profile(&driver_a, store.results(), store.driver_index());
            let b = generate_driver_profile(&driver_b, store.results(), store.driver_index());
            println!("{}", format_comparison_output(&a, &b));
        }

        Command::Score { races } => {
            let mut manager = RaceManager::new();
            for race in races {
                manager.add_race(race);
            }
            print_output(
                &serde_json::json!({
                    "races": manager.summaries(),
                    "total": manager.total_score(),
                }),
                &cli.format,
            )?;
        }

        Command::Average { file } => {
            let average = timing::average_finish_from_file(&file)?;
            print_output(&serde_json::json!({ "average": average }), &cli.format)?;
        }

        Command::Timing { csv, query } => {
            let analytics = TimingAnalytics::open(&csv)?;
            log::info!("{analytics}");
            let value = match query {
                TimingQuery::Driver { name } => {
                    serde_json::to_value(analytics.search_driver_results(&name))?
                }
                TimingQuery::Team { team } => serde_json::to_value(analytics.filter_by_team(&team))?,
                TimingQuery::Compare { first, second } => {
                    serde_json::to_value(analytics.compare_drivers(&first, &second))?
                }
                TimingQuery::Teams => serde_json::to_value(analytics.team_performance_summary())?,
                TimingQuery::Top { top_n } => serde_json::to_value(analytics.top_drivers(top_n))?,
                TimingQuery::Trend { name } => {
                    serde_json::to_value(analytics.performance_trends(&name)?)?
                }
            };
            print_output(&value, &cli.format)?;
        }
    }

    Ok(())
}

fn open_store(csv: &Path) -> Result<RaceDataStore, Box<dyn std::error::Error>> {
    let mut store = RaceDataStore::new();
    let loaded = store.load_race_data(csv)?;
    log::info!("Loaded {loaded} results from {}", csv.display());
    Ok(store)
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
