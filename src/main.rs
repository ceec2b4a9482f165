use clap::{Parser, Subcommand};
use playnite_minify::config::{self, MinifyConfig};
use playnite_minify::events::Event;
use playnite_minify::imaging::MagickBackend;
use playnite_minify::process::{self, ResizeConfig};
use playnite_minify::types::GameRecord;
use playnite_minify::{output, patch, pipeline, prune};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

#[derive(Parser)]
#[command(name = "playnite-minify")]
#[command(about = "Shrink a Playnite library HTML export")]
#[command(long_about = "\
Shrink a Playnite library HTML export

Resizes the cover, icon and background images copied by Playnite's HTML
export, points the exported pages at the resized files and removes the
duplicate artwork of games that appear more than once in the library.

Expected layout:

  library/
  └── games/
      ├── 0a1b....json             # One metadata file per game
      └── ...
  site/                            # Export output
  ├── index.html                   # Top-level pages are patched
  └── 0a1b.../
      ├── cover.png                # → cover.jpg, 180x270
      ├── icon.ico                 # → icon.png, 550x48
      └── background.png           # → background.jpg, 1920x620

Nothing is changed unless simulate is off (`simulate = false` or --apply).

Run 'playnite-minify gen-config' to generate a documented minify.toml.")]
#[command(version)]
struct Cli {
    /// Config file; stock defaults are used when it does not exist
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log every action without performing it
    #[arg(long, global = true, conflicts_with = "apply")]
    dry_run: bool,

    /// Perform conversions, deletions and HTML writes
    #[arg(long, global = true)]
    apply: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: read → resize → patch → prune
    Run,
    /// List the games that would be processed
    Scan,
    /// Print duplicate image groups
    Duplicates,
    /// Resize game images only
    Resize,
    /// Patch the exported HTML only
    PatchHtml,
    /// Delete duplicate images only
    Prune,
    /// Validate the config and library without changing anything
    Check,
    /// Print a stock minify.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        command => {
            let mut config = config::load_config(&cli.config)?;
            if cli.dry_run {
                config.simulate = true;
            } else if cli.apply {
                config.simulate = false;
            }
            execute(command, &config)?;
        }
    }

    Ok(())
}

fn execute(command: Command, config: &MinifyConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend = MagickBackend::new(&config.converter);

    match command {
        Command::Run => {
            let (tx, printer) = spawn_printer();
            let result = pipeline::run(&backend, config, Some(&tx));
            finish_printer(tx, printer)?;
            let summary = result?;
            println!(
                "==> Done: {} games, {} images converted, {} HTML files changed, {} duplicates removed{}",
                summary.games,
                summary.resize.converted,
                summary.html.changed,
                summary.pruned.len(),
                simulate_note(config)
            );
        }
        Command::Scan => {
            let games = read_library(config)?;
            output::print_games(&games);
        }
        Command::Duplicates => {
            let games = read_library(config)?;
            let duplicates = pipeline::index_duplicates(&games)?;
            output::print_duplicates(&duplicates);
        }
        Command::Resize => {
            let games = read_library(config)?;
            let (tx, printer) = spawn_printer();
            let result = process::resize_all(
                &backend,
                &games,
                &ResizeConfig::from_config(config),
                Some(&tx),
            );
            finish_printer(tx, printer)?;
            let summary = result?;
            println!(
                "Converted {}, missing {}, failed {}{}",
                summary.converted + summary.simulated,
                summary.missing,
                summary.failed,
                simulate_note(config)
            );
        }
        Command::PatchHtml => {
            let games = read_library(config)?;
            let duplicates = pipeline::index_duplicates(&games)?;
            let (tx, printer) = spawn_printer();
            let result = patch::patch_html(
                &config.output_root,
                &games,
                &duplicates,
                config.simulate,
                Some(&tx),
            );
            finish_printer(tx, printer)?;
            let summary = result?;
            println!(
                "Changed {} of {} HTML files{}",
                summary.changed,
                summary.files,
                simulate_note(config)
            );
        }
        Command::Prune => {
            let games = read_library(config)?;
            let duplicates = pipeline::index_duplicates(&games)?;
            let (tx, printer) = spawn_printer();
            let result = prune::prune_duplicates(
                &config.output_root,
                &games,
                &duplicates,
                config.simulate,
                Some(&tx),
            );
            finish_printer(tx, printer)?;
            let deleted = result?;
            println!("Removed {} duplicates{}", deleted.len(), simulate_note(config));
        }
        Command::Check => {
            println!("==> Checking {}", config.games_path().display());
            let games = read_library(config)?;
            let duplicates = pipeline::index_duplicates(&games)?;
            let html = patch::html_files(&config.output_root)?;
            println!(
                "{} games, {} duplicate groups, {} HTML files",
                games.len(),
                duplicates.groups().len(),
                html.len()
            );
            println!("==> Library is valid");
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Read the library on its own, printing any malformed-metadata reports first.
fn read_library(config: &MinifyConfig) -> Result<Vec<GameRecord>, Box<dyn std::error::Error>> {
    let (tx, printer) = spawn_printer();
    let result = pipeline::read_library(config, Some(&tx));
    finish_printer(tx, printer)?;
    Ok(result?)
}

/// Start the thread that renders stage events to stdout.
fn spawn_printer() -> (Sender<Event>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_event(&event);
        }
    });
    (tx, printer)
}

/// Close the channel and wait for every queued event to be printed.
fn finish_printer(
    tx: Sender<Event>,
    printer: JoinHandle<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    drop(tx);
    printer.join().map_err(|_| "event printer panicked")?;
    Ok(())
}

fn simulate_note(config: &MinifyConfig) -> &'static str {
    if config.simulate { " (simulated)" } else { "" }
}
