use chrono::Utc;
use clap::Parser;
use colored::*;
use env_logger::{Builder, Env, Target};
use log::{debug, info, warn};
use modelscout::cli::{prioritize, Cli, Commands};
use modelscout::error::{Result, ScoutError};
use modelscout::filter::{self, CostRange, DateRange, FilterCriteria};
use modelscout::output::{OutputFormat, OutputFormatter};
use modelscout::preferences::{load_filters_or_default, JsonFilePreferences, PreferencesStore};
use modelscout::recommend::{RecommendationContext, RecommendationEngine, UserProfile};
use modelscout::search::{DebouncedSearch, SearchEngine, SearchOutcome};
use modelscout::sort::{SortEngine, SortField};
use modelscout::{load_snapshot, CacheSweeper, CatalogItem, Config, Metrics};
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {e}", "Error:".red());
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    setup_logging(cli)?;

    let start_time = Instant::now();
    info!("Application started with command: {:?}", cli.command);

    let config = load_config(cli.config.as_deref())?;
    let items = load_snapshot(&cli.catalog)?;
    info!("Loaded {} models from {}", items.len(), cli.catalog.display());

    let metrics = Arc::new(Metrics::new());
    let store = cli.preferences.as_ref().map(JsonFilePreferences::new);
    let formatter = OutputFormatter::new(if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    });

    let rendered = match &cli.command {
        Commands::Search {
            query,
            no_fuzzy,
            threshold,
            limit,
        } => {
            let engine = SearchEngine::new(config.search.clone(), &config.cache, metrics.clone());
            if let Some(store) = &store {
                engine.restore_history(store);
            }
            let mut options = engine.default_options();
            options.fuzzy = !no_fuzzy;
            if let Some(threshold) = threshold {
                options.threshold = *threshold;
            }
            if let Some(limit) = limit {
                options.limit = *limit;
            }

            let results = engine.search(&items, query, &options);
            engine.track_query(query, results.len());
            if let Some(store) = &store {
                engine.persist_history(store);
            }
            formatter.format_search(query, &results)
        }
        Commands::Suggest { partial, max } => {
            let engine = SearchEngine::new(config.search.clone(), &config.cache, metrics.clone());
            formatter.format_suggestions(&engine.get_suggestions(&items, partial, *max))
        }
        Commands::Sort { criteria, limit } => {
            let engine = SortEngine::new(&config.cache, metrics.clone());
            let mut sorted = engine.sort_multi(&items, &prioritize(criteria));
            if let Some(limit) = limit {
                sorted.truncate(*limit);
            }
            for criterion in criteria {
                if !engine.is_field_available(&items, criterion.field) {
                    warn!("No model in the catalog has a value for '{}'", criterion.field);
                }
            }
            formatter.format_items(&sorted)
        }
        Commands::Filter {
            provider,
            category,
            capability,
            min_cost,
            max_cost,
            min_accuracy,
            min_parameters,
            min_context,
            available,
            term,
            since,
            until,
            saved,
            save,
        } => {
            let mut criteria = match (&store, saved) {
                (Some(store), true) => load_filters_or_default(store),
                (None, true) => {
                    warn!("--saved needs --preferences; starting from empty filters");
                    FilterCriteria::default()
                }
                _ => FilterCriteria::default(),
            };
            criteria.providers.extend(provider.iter().cloned());
            criteria.categories.extend(category.iter().cloned());
            criteria.capabilities.extend(capability.iter().cloned());
            if min_cost.is_some() || max_cost.is_some() {
                criteria.cost_range = Some(CostRange {
                    min: *min_cost,
                    max: *max_cost,
                });
            }
            criteria.min_accuracy = min_accuracy.or(criteria.min_accuracy);
            criteria.min_parameters = min_parameters.or(criteria.min_parameters);
            criteria.min_context_window = min_context.or(criteria.min_context_window);
            if *available {
                criteria.available_only = Some(true);
            }
            if term.is_some() {
                criteria.search_term = term.clone();
            }
            if since.is_some() || until.is_some() {
                criteria.date_range = Some(DateRange {
                    from: *since,
                    to: *until,
                });
            }

            if *save {
                match &store {
                    Some(store) => {
                        if let Err(e) = store.save_filters(&criteria) {
                            warn!("Could not save filters: {e}");
                        }
                    }
                    None => warn!("--save needs --preferences; filters were not stored"),
                }
            }

            let matching = filter::apply(&items, &criteria);
            formatter.format_filter(&filter::summarize(&criteria), &matching)
        }
        Commands::Recommend {
            profile,
            task,
            limit,
            as_of,
        } => {
            let profile = match profile {
                Some(path) => read_profile(path)?,
                None => UserProfile::default(),
            };
            let engine = RecommendationEngine::new(config.weights.clone(), metrics.clone());
            let context =
                RecommendationContext::from_profile(profile, &items, as_of.unwrap_or_else(Utc::now));
            let recommendations = match task {
                Some(task) => engine.recommend_for_task(*task, &context, *limit),
                None => engine.recommend(&context, *limit),
            };
            formatter.format_recommendations(&recommendations, &items)
        }
        Commands::Stats { metrics: show_metrics } => {
            let engine = SortEngine::new(&config.cache, metrics.clone());
            let stats: Vec<_> = SortField::ALL
                .into_iter()
                .map(|field| engine.get_field_stats(&items, field))
                .collect();
            let exposition = show_metrics.then(|| metrics.gather());
            formatter.format_stats(items.len(), &stats, exposition.as_deref())
        }
        Commands::Live { no_fuzzy } => live_session(
            &config,
            items,
            metrics.clone(),
            store.as_ref(),
            formatter,
            !no_fuzzy,
        )?,
    };

    println!("{rendered}");
    info!("Finished in {:.2?}", start_time.elapsed());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_path(path).map_err(|e| ScoutError::Config(format!("{e:#}"))),
        None => Ok(Config::load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable config: {e:#}");
            Config::default()
        })),
    }
}

/// Debounced search over stdin lines. Each line supersedes the previous one;
/// only settled results are printed.
fn live_session(
    config: &Config,
    items: Vec<CatalogItem>,
    metrics: Arc<Metrics>,
    store: Option<&JsonFilePreferences>,
    formatter: OutputFormatter,
    fuzzy: bool,
) -> Result<String> {
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let engine = Arc::new(SearchEngine::new(
        config.search.clone(),
        &config.cache,
        metrics.clone(),
    ));
    if let Some(store) = store {
        engine.restore_history(store);
    }
    let mut sweeper = config
        .cache
        .sweep_interval()
        .map(|interval| CacheSweeper::spawn(engine.cache(), interval));

    let debouncer = DebouncedSearch::new(
        engine.clone(),
        Arc::new(items),
        config.search.debounce(),
        metrics.clone(),
    );
    let mut options = engine.default_options();
    options.fuzzy = fuzzy;

    let mut printers = Vec::new();
    let mut issued = 0usize;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        issued += 1;
        let handle = debouncer.issue(query, options.clone());
        let snapshot = debouncer.snapshot();
        printers.push(runtime.spawn(async move {
            match handle.outcome().await {
                Ok(SearchOutcome::Committed(committed)) => {
                    let results: Vec<_> = committed
                        .hits
                        .iter()
                        .filter_map(|hit| hit.resolve(&snapshot))
                        .collect();
                    println!("{}", formatter.format_search(&committed.query, &results));
                }
                Ok(SearchOutcome::Superseded { generation, latest }) => {
                    debug!("Query {generation} superseded by {latest}");
                }
                Err(e) => warn!("Live search failed: {e}"),
            }
        }));
    }

    runtime.block_on(async {
        for printer in printers {
            if let Err(e) = printer.await {
                warn!("Live search printer failed: {e}");
            }
        }
    });

    if let Some(sweeper) = sweeper.as_mut() {
        sweeper.dispose();
    }
    if let Some(store) = store {
        engine.persist_history(store);
    }

    let superseded = metrics.stale_results.get();
    Ok(match formatter.format() {
        OutputFormat::Json => serde_json::json!({
            "queries": issued,
            "superseded": superseded,
        })
        .to_string(),
        OutputFormat::Text => format!("{issued} queries, {superseded} superseded"),
    })
}

fn read_profile(path: &Path) -> Result<UserProfile> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent_dir)?;
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| ScoutError::Other(e.to_string()))?;
    Ok(())
}
