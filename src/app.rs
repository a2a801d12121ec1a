//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the Ctrl-C handler, builds the facade,
//! and runs the requested subcommand.

use anyhow::{Context, Result, anyhow, bail};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use unified_fs::cli::{Args, Command};
use unified_fs::config::{CONFIG_ENV, create_template_config, load_config, load_config_from_path};
use unified_fs::output as out;
use unified_fs::{AbstractFile, CopyOutcome, FileFacade, Progress, default_config_path, shutdown};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config and init-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }
    if let Some(Command::InitConfig { path }) = &args.command {
        let path = path
            .clone()
            .or_else(default_config_path)
            .ok_or_else(|| anyhow!("could not determine a config path"))?;
        create_template_config(&path)?;
        out::print_success(&format!("template config written to {}", path.display()));
        return Ok(());
    }

    let mut cfg = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => load_config()?.unwrap_or_default(),
    };
    args.apply_overrides(&mut cfg);

    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    // Guard is dropped on Ctrl-C as well so buffered log lines reach the file.
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; stopping after the current entry...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .context("install Ctrl-C handler")?;
    }

    debug!(?args, "starting unified_fs");

    let result = (|| -> Result<()> {
        cfg.normalize();
        cfg.validate()?;
        let facade = cfg.open()?;
        match &args.command {
            Some(command) => execute(&facade, command),
            None => {
                out::print_info("nothing to do; see --help for the available commands");
                Ok(())
            }
        }
    })();

    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    result
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}"));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default config path:\n  {}", p.display()));
            if !p.exists() {
                out::print_info("No config file exists there yet. Run `unified_fs init-config` to create one.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

fn resolve(facade: &FileFacade, target: &str) -> Result<AbstractFile> {
    facade
        .resolve_target(target)?
        .ok_or_else(|| anyhow!("cannot resolve '{target}'"))
}

fn execute(facade: &FileFacade, command: &Command) -> Result<()> {
    match command {
        Command::Ls { target, recursive, mode } => {
            let root = resolve(facade, target)?;
            if !facade.is_directory(&root)? {
                bail!("'{target}' is not a directory");
            }
            let mut lines = Vec::new();
            facade.traverse_directory(&root, *recursive, (*mode).into(), |entry| lines.push(entry.clone()))?;
            for entry in &lines {
                let is_dir = facade.is_directory(entry)?;
                let length = facade.length(entry)?;
                out::print_user(&out::entry_line(is_dir, length, &entry.full_path()));
            }
            info!(target = %root, entries = lines.len(), "listed");
            Ok(())
        }
        Command::Copy { source, dest, recursive } => {
            let src = resolve(facade, source)?;
            let dst = resolve(facade, dest)?;
            let progress: &mut dyn FnMut(usize, usize) -> Progress = &mut |_, _| shutdown::progress();
            let outcome = facade.copy_directory_with_content(&src, &dst, *recursive, Some(progress))?;
            let summary = out::describe_copy(&outcome);
            match outcome {
                CopyOutcome::Failed(_) => bail!(summary),
                CopyOutcome::Cancelled { .. } => out::print_warn(&summary),
                _ => out::print_success(&summary),
            }
            Ok(())
        }
        Command::Same { a, b } => {
            let fa = resolve(facade, a)?;
            let fb = resolve(facade, b)?;
            let same = facade.are_the_same(&fa, &fb)?;
            out::print_user(if same { "same" } else { "different" });
            Ok(())
        }
        Command::Mkdir { base, path } => {
            let base_file = resolve(facade, base)?;
            let made = facade
                .create_dir(&base_file, path)?
                .ok_or_else(|| anyhow!("could not create directory '{path}' below '{base}'"))?;
            out::print_user(&made.full_path());
            Ok(())
        }
        Command::Touch { base, path } => {
            let base_file = resolve(facade, base)?;
            let made = facade
                .create_file(&base_file, path)?
                .ok_or_else(|| anyhow!("could not create file '{path}' below '{base}'"))?;
            out::print_user(&made.full_path());
            Ok(())
        }
        Command::Bases => {
            for (key, dir) in facade.base_directories().iter() {
                let exists = facade.base_directory_exists(dir);
                out::print_user(&format!(
                    "{key}\t{:?}\t{}",
                    dir.active_type(),
                    if exists { "present" } else { "missing" }
                ));
            }
            Ok(())
        }
        // Handled before logging is initialized.
        Command::InitConfig { .. } => Ok(()),
    }
}
