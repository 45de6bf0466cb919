/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bpaf::Bpaf;
use nodeshell::persistence::{load_document, save_document};
use nodeshell::prefs::ConfigError;
use nodeshell::{EditorConfig, GraphStore, LoadReport, TemplateCatalog};

/// Inspect and normalize node-graph documents
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
struct Cli {
    /// Config file to read instead of the default location
    #[bpaf(long, argument("PATH"))]
    config: Option<PathBuf>,
    #[bpaf(external(command))]
    command: Command,
}

#[derive(Debug, Clone, Bpaf)]
enum Command {
    /// Print node, connection and group counts for a document
    #[bpaf(command)]
    Inspect {
        /// Document to read; defaults to `default_document` from the config
        #[bpaf(positional("FILE"))]
        file: Option<PathBuf>,
    },
    /// Load a document and write it back in canonical form
    #[bpaf(command)]
    Normalize {
        /// Write here instead of overwriting the input
        #[bpaf(short, long, argument("OUT"))]
        output: Option<PathBuf>,
        /// Document to read; defaults to `default_document` from the config
        #[bpaf(positional("FILE"))]
        file: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    match path {
        Some(path) => EditorConfig::load_from(path),
        None => match EditorConfig::default_path() {
            Some(path) => EditorConfig::load_or_default(&path),
            None => Ok(EditorConfig::default()),
        },
    }
}

fn open(config: &EditorConfig, file: &Path) -> Result<(GraphStore, LoadReport), String> {
    let mut store = GraphStore::with_config(Box::new(TemplateCatalog::core_seed()), config);
    let report = load_document(&mut store, file).map_err(|e| e.to_string())?;
    Ok((store, report))
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let resolve = |file: Option<PathBuf>| {
        file.or_else(|| config.default_document.clone())
            .ok_or_else(|| "no FILE given and no default_document configured".to_string())
    };

    match cli.command {
        Command::Inspect { file } => {
            let file = resolve(file)?;
            let (store, report) = open(&config, &file)?;
            println!("file:        {}", file.display());
            println!("nodes:       {}", report.nodes);
            println!("connections: {}", report.connections);
            println!("groups:      {}", report.groups);
            println!("skipped:     {}", report.skipped);
            println!("next id:     {}", store.max_assigned_id());
        },
        Command::Normalize { output, file } => {
            let file = resolve(file)?;
            let (mut store, report) = open(&config, &file)?;
            let target = output.unwrap_or_else(|| file.clone());
            save_document(&mut store, &target).map_err(|e| e.to_string())?;
            println!(
                "wrote {} ({} nodes, {} connections, {} records dropped)",
                target.display(),
                report.nodes,
                report.connections,
                report.skipped
            );
        },
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = cli().run();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("nodeshell: {e}");
            ExitCode::FAILURE
        },
    }
}
