use clap::{Parser, Subcommand};
use loopgal::{output, pipeline::Pipeline};
use notify::{Event, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "loopgal")]
#[command(about = "Static index generator for looping SVG animation galleries")]
#[command(long_about = "\
Static index generator for looping SVG animation galleries

Your filesystem is the data source. Category directories group animations,
and each generator module is a TOML file naming a built-in producer plus
its parameters.

Generators structure:

  generators/
  ├── animations/                  # linked + paginated collection
  │   ├── 05/                      # category (numeric bucket)
  │   │   └── c.toml               # module → identity \"05-c\" at /05/c/
  │   ├── 18/k.toml
  │   └── 23/b.toml
  └── misc/                        # name-keyed collection (no linking)
      └── logo.toml

Module format:

  producer = \"pulse-grid\"          # pulse-grid | dash-trace | stripe-spinner
  [params]                         # producer-specific, all optional
  cells = 10

A pass renders every generator twice (readable and minified markup),
links previous/next neighbors, groups by category, and writes the whole
index as index.json. Passes are atomic: any failure keeps the previously
written index untouched.")]
#[command(version = version_string())]
struct Cli {
    /// Generators directory
    #[arg(long, default_value = "generators", global = true)]
    source: PathBuf,

    /// Output directory for the published index
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full discovery pass and write index.json
    Build,
    /// Validate all generator modules without writing output
    Check,
    /// Rebuild the index whenever generator sources change
    Watch,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let mut pipeline = Pipeline::new(&cli.source);
            pipeline.run_pass()?;
            publish(&pipeline, &cli.output)?;
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let mut pipeline = Pipeline::new(&cli.source);
            pipeline.run_pass()?;
            if let Some(index) = pipeline.published() {
                output::print_pass_output(index, pipeline.cache_stats());
            }
            println!("==> Generators are valid");
        }
        Command::Watch => {
            watch(&cli.source, &cli.output)?;
        }
    }

    Ok(())
}

/// Print the pass summary and write `index.json`.
fn publish(pipeline: &Pipeline, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let Some(index) = pipeline.published() else {
        return Ok(());
    };
    output::print_pass_output(index, pipeline.cache_stats());

    std::fs::create_dir_all(output_dir)?;
    let index_path = output_dir.join("index.json");
    let json = serde_json::to_string_pretty(index)?;
    std::fs::write(&index_path, json)?;
    println!("Index written to {}", index_path.display());
    Ok(())
}

/// Re-run the pass on every filesystem event under the generators dir.
///
/// A failing pass reports the error and keeps the last good index both in
/// memory and on disk; the next successful pass overwrites it as a unit.
fn watch(source: &Path, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = Pipeline::new(source);
    rebuild(&mut pipeline, output_dir);

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        tx.send(res).ok();
    })?;
    watcher.watch(source, RecursiveMode::Recursive)?;
    println!("Watching {} for changes...", source.display());

    for res in rx {
        let Ok(event) = res else { continue };
        if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
            rebuild(&mut pipeline, output_dir);
        }
    }

    Ok(())
}

fn rebuild(pipeline: &mut Pipeline, output_dir: &Path) {
    match pipeline.run_pass() {
        Ok(()) => {
            if let Err(err) = publish(pipeline, output_dir) {
                eprintln!("Failed to write index: {err}");
            }
        }
        Err(err) => eprintln!("Pass failed: {err} (previous index kept)"),
    }
}
