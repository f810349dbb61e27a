//! fsbind - command-line host for the file module
//!
//! Mounts a host directory and drives the module through the same
//! name/argument boundary a script would use.
//!
//! Commands:
//! - `fsbind write <path> <data> [--append]` - Write text to a file
//! - `fsbind cat <path>` - Print a file
//! - `fsbind stat <path>` - Show a file's size
//! - `fsbind rm <path>` - Remove a file
//! - `fsbind ls` - List files on the mount
//! - `fsbind dump` - Log every file and its size
//! - `fsbind info` - Show module and mount info

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use fsbind::{FsConfig, FsModule, PosixFs, Value};

#[derive(Parser)]
#[command(name = "fsbind")]
#[command(author = "FsBind Contributors")]
#[command(version)]
#[command(about = "fsbind - synchronous file module host", long_about = None)]
struct Cli {
    /// Host directory to mount (overrides the config file)
    #[arg(long)]
    root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// none, error, warn, info, debug or verbose (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write text to a file
    Write {
        path: String,
        data: String,

        /// Append instead of truncating
        #[arg(short, long)]
        append: bool,
    },

    /// Print a file
    Cat { path: String },

    /// Show a file's size
    Stat { path: String },

    /// Remove a file
    Rm { path: String },

    /// List files on the mount
    Ls,

    /// Log every file and its size
    Dump,

    /// Show module and mount info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.log_level.is_some() || cli.config.is_some() {
        logger.filter_level(config.level_filter());
    }
    logger.init();

    log::debug!("mounting {}", config.root.display());
    let fs = FsModule::new(PosixFs::new(&config.root), config);

    match cli.command {
        Commands::Write { path, data, append } => write_file(&fs, &path, &data, append)?,
        Commands::Cat { path } => cat_file(&fs, &path)?,
        Commands::Stat { path } => stat_file(&fs, &path)?,
        Commands::Rm { path } => {
            fs.invoke("unlink", &mut [Value::from(path.as_str())])?;
            println!("{} removed {}", "✓".green(), path);
        }
        Commands::Ls => list_files(&fs)?,
        Commands::Dump => {
            fs.invoke("dump", &mut [])?;
        }
        Commands::Info => show_info(&fs),
    }

    Ok(())
}

/// Config file first, then command-line overrides
fn build_config(cli: &Cli) -> Result<FsConfig> {
    let mut config = match &cli.config {
        Some(path) => FsConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FsConfig::default().with_root("."),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn write_file(fs: &FsModule<PosixFs>, path: &str, data: &str, append: bool) -> Result<()> {
    let mode = if append { "a" } else { "w" };
    let fd = fs.invoke("openSync", &mut [Value::from(path), Value::from(mode)])?;

    let written = fs.invoke("writeSync", &mut [fd.clone(), Value::from(data)]);
    fs.invoke("closeSync", &mut [fd])?;

    let written = written?.as_number().unwrap_or(0.0) as usize;
    println!("{} wrote {} bytes to {}", "✓".green(), written, path.bold());
    if written < data.len() {
        anyhow::bail!("short write: {} of {} bytes", written, data.len());
    }
    Ok(())
}

fn cat_file(fs: &FsModule<PosixFs>, path: &str) -> Result<()> {
    const CHUNK: usize = 4096;

    let fd = fs.invoke("openSync", &mut [Value::from(path), Value::from("r")])?;
    let mut out = std::io::stdout().lock();
    let mut args = [
        fd.clone(),
        Value::Buffer(vec![0; CHUNK]),
        Value::from(0),
        Value::from(CHUNK),
    ];

    let result = loop {
        let n = match fs.invoke("readSync", &mut args) {
            Ok(n) => n.as_number().unwrap_or(0.0) as usize,
            Err(e) => break Err(e.into()),
        };
        if n == 0 {
            break Ok(());
        }
        if let Some(buf) = args[1].as_buffer() {
            if let Err(e) = out.write_all(&buf[..n]) {
                break Err(e.into());
            }
        }
    };

    fs.invoke("closeSync", &mut [fd])?;
    out.flush()?;
    result
}

fn stat_file(fs: &FsModule<PosixFs>, path: &str) -> Result<()> {
    let stat = fs.invoke("statSync", &mut [Value::from(path)])?;
    match stat.get("size").and_then(Value::as_number) {
        Some(size) => println!("{}: {} bytes", path.bold(), size),
        None => anyhow::bail!("{}: no such file", path),
    }
    Ok(())
}

fn list_files(fs: &FsModule<PosixFs>) -> Result<()> {
    if let Value::Array(names) = fs.invoke("spiffsDir", &mut [])? {
        for name in names.iter().filter_map(Value::as_str) {
            println!("{}", name);
        }
    }
    Ok(())
}

fn show_info(fs: &FsModule<PosixFs>) {
    let config = fs.binding().config();

    println!("{}", "fsbind - synchronous file module".bold().green());
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Backend: {}", fsbind_native::config::platform_mode());
    println!("Mount:   {}", config.root.display());
    println!("Strict modes: {}", config.strict_modes);
    println!("Read position: {:?}", config.read_position);
    println!("\n{} {}", "Namespace".bold(), fs.namespace());
    for (name, arity) in fs.functions() {
        println!("  {:<10} arity {}", name, arity);
    }
}
