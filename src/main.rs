mod cli;
mod logging;
mod report;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use dotenv::dotenv;
use tracing::{error, info, warn};

use cli::{Cli, Commands};
use file_roulette::config::{self, CONFIG_FILE_NAME};
use file_roulette::filter::FilterPolicy;
use file_roulette::scanner::Scanner;
use file_roulette::seen::SeenStore;
use file_roulette::{
    platform, AppConfig, DedupMode, SelectionRequest, SessionEngine, SilentReporter,
};
use report::CliReporter;

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Pick {
            dir,
            count,
            no_dedup,
            dry_run,
            seed,
        }) => run_pick(&dir, count, no_dedup, dry_run, seed),
        Some(Commands::Stats { dir }) => run_stats(&dir),
        Some(Commands::ResetHistory { dir, yes }) => run_reset_history(&dir, yes),
        Some(Commands::PrintConfig { dir }) => run_print_config(&dir),
        Some(Commands::InitConfig { dir, force }) => run_init_config(&dir, force),
        Some(Commands::RegisterMenu) => platform::register_context_menu().map_err(Into::into),
        Some(Commands::UnregisterMenu) => platform::unregister_context_menu().map_err(Into::into),
        None => {
            let _ = Cli::command().print_long_help();
            return Ok(());
        }
    };

    if let Err(err) = result {
        error!("Error: {}", err);
        process::exit(1);
    }

    Ok(())
}

fn resolve_root(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

fn load_config(root: &Path) -> anyhow::Result<AppConfig> {
    Ok(config::load_configuration(root)?)
}

fn run_pick(
    dir: &Path,
    count: usize,
    no_dedup: bool,
    dry_run: bool,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let root = resolve_root(dir);
    let app_config = load_config(&root)?;
    let store = SeenStore::new(app_config.seen_path(&root));
    let engine = SessionEngine::new(store);

    let request = SelectionRequest {
        root: root.clone(),
        count,
        dedup: if no_dedup {
            DedupMode::Disabled
        } else {
            DedupMode::Enabled
        },
        seed,
        config: app_config,
    };

    let reporter = CliReporter::new();
    let outcome = engine.run(&request, &reporter)?;

    if outcome.seen_recovered {
        warn!("Open history was unreadable and has been reset");
    }
    if outcome.scan_warnings.total() > 0 {
        warn!(
            "{} entries were skipped during the scan ({} permission denied)",
            outcome.scan_warnings.total(),
            outcome.scan_warnings.denied
        );
    }
    if outcome.shortfall {
        warn!(
            "Only {} of {} requested files are available",
            outcome.picks.len(),
            count
        );
    }

    println!();
    let picked = outcome.picks.len();
    for (index, pick) in outcome.picks.iter().enumerate() {
        let marker = if pick.recycled {
            "recycled".yellow()
        } else {
            "fresh".green()
        };
        println!(
            "{} {} [{}]",
            format!("[{}/{}]", index + 1, picked).cyan(),
            pick.candidate.path.display(),
            marker
        );

        if !dry_run {
            if let Err(err) = platform::open_with_default_app(&pick.candidate.path) {
                error!("Could not open {}: {}", pick.candidate.path.display(), err);
            }
        }
    }

    if let Some(save_err) = &outcome.save_error {
        warn!("Your files were opened, but the history was not saved: {}", save_err);
    }

    info!(
        "{} candidates scanned in {}",
        format!("{}", outcome.total_candidates).green(),
        format!("{:.2}s", outcome.scan_duration.as_secs_f64()).green(),
    );

    Ok(())
}

fn run_stats(dir: &Path) -> anyhow::Result<()> {
    let root = resolve_root(dir);
    let app_config = load_config(&root)?;
    let store = SeenStore::new(app_config.seen_path(&root));
    let loaded = store.load();

    let policy = FilterPolicy::new(&app_config);
    let scanner = Scanner::new(&root, &policy, &app_config);

    let mut total = 0usize;
    let mut already_seen = 0usize;
    for candidate in scanner.stream(&SilentReporter) {
        total += 1;
        if loaded.set.contains(&candidate.identity) {
            already_seen += 1;
        }
    }

    println!("Statistics for {}", root.display().to_string().cyan());
    println!("  Candidate files:   {}", format!("{}", total).green());
    println!(
        "  Already opened:    {}",
        format!("{}", already_seen).yellow()
    );
    println!(
        "  Remaining unseen:  {}",
        format!("{}", total.saturating_sub(already_seen)).green()
    );
    println!(
        "  Recorded history:  {} key(s), {} reset(s)",
        loaded.set.len(),
        loaded.set.reset_count()
    );
    if let Some(ts) = loaded.set.last_recorded() {
        println!("  Last opened:       {}", ts.to_rfc3339());
    }
    if loaded.recovered {
        warn!("Open history was unreadable and has been reset");
    }

    Ok(())
}

fn run_reset_history(dir: &Path, yes: bool) -> anyhow::Result<()> {
    let root = resolve_root(dir);
    let app_config = load_config(&root)?;
    let store = SeenStore::new(app_config.seen_path(&root));

    if !yes {
        let prompt = format!(
            "Clear the open history for {}?",
            root.display()
        );
        if !prompt_confirm(&prompt, false)? {
            process::exit(0);
        }
    }

    let mut set = store.load().set;
    set.clear();
    store.save(&set)?;
    println!("Open history cleared (reset #{})", set.reset_count());

    Ok(())
}

fn run_print_config(dir: &Path) -> anyhow::Result<()> {
    let root = resolve_root(dir);
    let app_config = load_config(&root)?;
    println!("Configuration: {:#?}", app_config);
    Ok(())
}

fn run_init_config(dir: &Path, force: bool) -> anyhow::Result<()> {
    let root = resolve_root(dir);
    let target = root.join(CONFIG_FILE_NAME);

    if target.exists() && !force {
        let prompt = format!("{} already exists. Overwrite?", target.display());
        if !prompt_confirm(&prompt, false)? {
            process::exit(0);
        }
    }

    std::fs::write(&target, config::default_config_toml())?;
    println!("Wrote default configuration to {}", target.display());

    Ok(())
}

fn prompt_confirm(prompt: &str, default_yes: bool) -> io::Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };

    loop {
        print!("{} [{}] ", prompt, hint);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;

        match answer.trim() {
            "" => return Ok(default_yes),
            a if a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes") => return Ok(true),
            a if a.eq_ignore_ascii_case("n") || a.eq_ignore_ascii_case("no") => return Ok(false),
            _ => eprintln!("Please answer y or n."),
        }
    }
}
