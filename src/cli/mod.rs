use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use crate::services::{
    Aggregator, Config, DataQuery, FilterEngine, HttpTaskService, TaskService, ThemeChoice,
};
use crate::tui::widgets::format::{format_currency, format_number};
use crate::tui::widgets::platform_chart::format_metric;
use crate::tui::{self, StartPage};
use crate::types::{
    ChartData, DataSource, FilterParams, FilterState, NewTask, Platform, PlatformMetric, Task,
    TaskData, TaskStatus, FILTER_YEARS,
};

/// Terminal dashboard for e-commerce sourcing tasks
#[derive(Parser)]
#[command(name = "salesboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Task service API root (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Color theme: auto, dark or light
    #[arg(long, global = true)]
    theme: Option<ThemeChoice>,

    /// Config file (default: ~/.salesboard/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse sourcing tasks (default)
    Tasks,

    /// Follow one task until it settles, then chart its data
    Watch {
        /// Task id
        id: u64,
    },

    /// Submit a new sourcing task
    Create {
        /// Task name
        #[arg(long)]
        name: String,

        #[arg(long, default_value_t = *FILTER_YEARS.start(), value_parser = year_parser())]
        year_from: i32,

        #[arg(long, default_value_t = *FILTER_YEARS.end(), value_parser = year_parser())]
        year_to: i32,

        /// Brand to source (repeatable)
        #[arg(long = "brand", value_name = "BRAND")]
        brands: Vec<String>,

        /// Product category to source (repeatable)
        #[arg(long = "category", value_name = "CATEGORY")]
        categories: Vec<String>,

        /// Data source: source_a or source_b (repeatable)
        #[arg(
            long = "source",
            value_name = "SOURCE",
            required = true,
            value_parser = parse_source
        )]
        sources: Vec<DataSource>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the aggregates of a completed task
    Report {
        /// Task id
        id: u64,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        brand: Option<String>,

        /// Online or Store
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,

        #[arg(long)]
        year: Option<i32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

fn year_parser() -> clap::builder::RangedI64ValueParser<i32> {
    let (first, last) = (*FILTER_YEARS.start(), *FILTER_YEARS.end());
    clap::value_parser!(i32).range(i64::from(first)..=i64::from(last))
}

fn parse_source(s: &str) -> Result<DataSource, String> {
    DataSource::from_id(s).ok_or_else(|| {
        let known: Vec<&str> = DataSource::all().iter().map(|d| d.id()).collect();
        format!("unknown source '{s}' (expected one of: {})", known.join(", "))
    })
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    Platform::parse(s)
        .ok_or_else(|| format!("unknown platform '{s}' (expected Online or Store)"))
}

impl Cli {
    /// Default log filter for the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Whether the command takes over the terminal
    pub fn is_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tasks) | Some(Commands::Watch { .. }))
    }

    /// Set up `env_logger`. `RUST_LOG` wins over `-v`; TUI sessions log to
    /// `~/.salesboard/salesboard.log` instead of the terminal.
    pub fn init_logging(&self) -> anyhow::Result<()> {
        let env = env_logger::Env::default().default_filter_or(self.log_level());
        let mut builder = env_logger::Builder::from_env(env);
        if self.is_tui() {
            let dir = Config::data_dir()?;
            fs::create_dir_all(&dir)?;
            let path = dir.join("salesboard.log");
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        builder.init();
        Ok(())
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        log::debug!("using task service at {}", config.api_url);
        Ok(config)
    }

    pub fn run(self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        match self.command {
            None | Some(Commands::Tasks) => tui::run(&config, StartPage::TaskList),
            Some(Commands::Watch { id }) => tui::run(&config, StartPage::Task(id)),
            Some(Commands::Create {
                name,
                year_from,
                year_to,
                brands,
                categories,
                sources,
                json,
            }) => {
                let spec = NewTask {
                    name,
                    filter_params: FilterParams {
                        year_from: Some(year_from),
                        year_to: Some(year_to),
                        companies: non_empty(brands),
                        categories: non_empty(categories),
                        data_sources: sources,
                    },
                };
                spec.validate()?;
                let task = block_on(&config, |service| async move {
                    service.create_task(&spec).await
                })?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&task)?);
                } else {
                    print_created(&task);
                }
                Ok(())
            }
            Some(Commands::Report {
                id,
                category,
                brand,
                platform,
                year,
                json,
            }) => {
                let filter = FilterState {
                    category,
                    brand,
                    platform,
                    year,
                };
                let (task, data) = block_on(&config, |service| async move {
                    load_report(service.as_ref(), id).await
                })?;
                let Some(data) = data else {
                    anyhow::bail!(
                        "task {} is {}; a report is available once it completes",
                        task.id,
                        task.status.label()
                    );
                };

                let filtered = FilterEngine::apply(&data.data, &filter);
                let charts = Aggregator::chart_data(&filtered);
                if json {
                    let report = Report {
                        task: &task,
                        charts: &charts,
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_report(&task, &filter, &charts);
                }
                Ok(())
            }
            Some(Commands::Config { init }) => {
                let path = match &self.config {
                    Some(path) => path.clone(),
                    None => Config::default_path()?,
                };
                if init && !path.exists() {
                    Config::default().save_to(&path)?;
                    println!("Wrote {}", path.display());
                }
                println!("Config file: {}", path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    task: &'a Task,
    #[serde(flatten)]
    charts: &'a ChartData,
}

/// Fetch a task and, once it has completed, its full record set.
/// Filtering happens client side.
async fn load_report<S: TaskService>(
    service: &S,
    id: u64,
) -> crate::types::Result<(Task, Option<TaskData>)> {
    let task = service.get_task(id).await?;
    if task.status != TaskStatus::Completed {
        return Ok((task, None));
    }
    let data = service.get_task_data(id, &DataQuery::default()).await?;
    Ok((task, Some(data)))
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

/// Run one request against the configured service on a throwaway runtime
fn block_on<T, F, Fut>(config: &Config, request: F) -> anyhow::Result<T>
where
    F: FnOnce(Arc<HttpTaskService>) -> Fut,
    Fut: std::future::Future<Output = crate::types::Result<T>>,
{
    let service = Arc::new(HttpTaskService::new(
        &config.api_url,
        config.request_timeout(),
    )?);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(request(service))?)
}

fn print_created(task: &Task) {
    println!("Created task {} ({})", task.id, task.status.label());
    println!("  Name:       {}", task.name);
    let params = &task.filter_params;
    if let (Some(from), Some(to)) = (params.year_from, params.year_to) {
        println!("  Years:      {from} - {to}");
    }
    if let Some(companies) = &params.companies {
        println!("  Brands:     {}", companies.join(", "));
    }
    if let Some(categories) = &params.categories {
        println!("  Categories: {}", categories.join(", "));
    }
    let sources: Vec<&str> = params.data_sources.iter().map(|s| s.label()).collect();
    println!("  Sources:    {}", sources.join(", "));
    println!();
    println!("Follow it with: salesboard watch {}", task.id);
}

fn filter_value(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("All")
}

fn print_report(task: &Task, filter: &FilterState, charts: &ChartData) {
    let year = filter.year.map(|y| y.to_string());
    println!("Task {} · {}", task.id, task.name);
    println!(
        "Filter: category={} brand={} platform={} year={}",
        filter_value(filter.category.as_deref()),
        filter_value(filter.brand.as_deref()),
        filter_value(filter.platform.map(|p| p.as_str())),
        filter_value(year.as_deref()),
    );

    let summary = &charts.summary;
    println!();
    println!("Summary");
    println!("  {:<16}{:>14}", "Records", format_number(summary.record_count as u64));
    println!(
        "  {:<16}{:>14}",
        "Online store",
        format_number(summary.online_store_records as u64)
    );
    println!(
        "  {:<16}{:>14}",
        "Physical store",
        format_number(summary.physical_store_records as u64)
    );
    println!("  {:<16}{:>14}", "Total value", format_currency(summary.total_value));

    if summary.record_count == 0 {
        println!();
        println!("No records match the filter.");
        return;
    }

    println!();
    println!("Sales by month");
    for point in &charts.time_series {
        println!(
            "  {:<16}{:>14}",
            point.month.format("%b %Y").to_string(),
            format_currency(point.total_sales)
        );
    }

    println!();
    println!("Sales by category");
    for cat in &charts.categories {
        println!("  {:<16}{:>14}", cat.category, format_currency(cat.total_sales));
    }

    println!();
    println!("Platform comparison");
    print!("  {:<18}", "");
    for platform in &charts.platforms {
        print!("{:>14}", platform.platform.as_str());
    }
    println!();
    for &metric in PlatformMetric::all() {
        print!("  {:<18}", metric.label());
        for platform in &charts.platforms {
            print!("{:>14}", format_metric(metric, platform.raw(metric)));
        }
        println!();
    }
}
