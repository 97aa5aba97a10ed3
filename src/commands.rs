//! Command implementations for tabrecon CLI

use crate::cli::{Commands, ExportArgs, InputArgs};
use crate::config::ReconConfig;
use crate::discover::discover_pairs;
use crate::error::{Result, TabreconError};
use crate::model::KeyColumns;
use crate::output::{BatchOutcome, JsonFormatter, PrettyPrinter};
use crate::pipeline::{compare_paths, CompareSettings};
use crate::progress::ProgressReporter;
use crate::render::{default_export_name, renderer_for, RenderScope, ReportFormat};
use std::path::{Path, PathBuf};

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub no_progress: bool,
}

/// Execute a command
pub fn execute_command(command: Commands, options: &GlobalOptions) -> Result<()> {
    match command {
        Commands::InitConfig { force } => init_config_command(options, force),
        Commands::Compare {
            old,
            new,
            input,
            export,
            json_summary,
            quiet,
        } => {
            let config = load_config(options)?;
            let show_progress = !(options.no_progress || quiet || json_summary);
            compare_command(&config, &old, &new, &input, &export, json_summary, quiet, show_progress)
        }
        Commands::Presence {
            old,
            new,
            input,
            export,
            quiet,
        } => {
            let config = load_config(options)?;
            let show_progress = !(options.no_progress || quiet);
            presence_command(&config, &old, &new, &input, &export, quiet, show_progress)
        }
        Commands::Batch {
            root,
            input,
            format,
            output,
        } => {
            let config = load_config(options)?;
            batch_command(&config, &root, &input, format.as_deref(), output.as_deref())
        }
    }
}

fn load_config(options: &GlobalOptions) -> Result<ReconConfig> {
    let current_dir = std::env::current_dir()?;
    ReconConfig::discover(options.config.as_deref(), &current_dir)
}

/// Write a default config file
fn init_config_command(options: &GlobalOptions, force: bool) -> Result<()> {
    let path = match &options.config {
        Some(path) => path.clone(),
        None => std::env::current_dir()?.join(crate::CONFIG_FILE_NAME),
    };

    if ReconConfig::write_default(&path, force)? {
        println!("✅ Wrote config: {}", path.display());
    } else {
        println!("⚠️  Config already exists: {} (use --force to overwrite)", path.display());
    }
    Ok(())
}

/// Compare two files and export every partition
#[allow(clippy::too_many_arguments)]
fn compare_command(
    config: &ReconConfig,
    old: &Path,
    new: &Path,
    input: &InputArgs,
    export: &ExportArgs,
    json_summary: bool,
    quiet: bool,
    show_progress: bool,
) -> Result<()> {
    let settings = compare_settings(config, input)?;
    let (format, export_dir) = export_target(config, export.format.as_deref(), export.output.as_deref())?;
    let name = export.name.clone().unwrap_or_else(default_export_name);

    let (report, path) = {
        let mut progress = reporter(old, new, show_progress)?;
        let report = compare_paths(old, new, &settings, &mut progress)?;

        progress.start_render(&format!("Writing {} report...", format.as_str()));
        let path = renderer_for(format, &export_dir).render(&report, &name, RenderScope::Full)?;
        progress.finish_render(&format!("Wrote {}", path.display()));
        (report, path)
    };

    if json_summary {
        println!("{}", JsonFormatter::format_summary(&report, Some(&path))?);
    } else {
        PrettyPrinter::print_summary(&report, Some(&path), quiet);
    }
    Ok(())
}

/// Compare key presence only
fn presence_command(
    config: &ReconConfig,
    old: &Path,
    new: &Path,
    input: &InputArgs,
    export: &ExportArgs,
    quiet: bool,
    show_progress: bool,
) -> Result<()> {
    let settings = compare_settings(config, input)?;
    let (format, export_dir) = export_target(config, export.format.as_deref(), export.output.as_deref())?;
    let name = export.name.clone().unwrap_or_else(default_export_name);

    let (report, path) = {
        let mut progress = reporter(old, new, show_progress)?;
        let report = compare_paths(old, new, &settings, &mut progress)?;

        progress.start_render("Writing presence report...");
        let path =
            renderer_for(format, &export_dir).render(&report, &name, RenderScope::PresenceOnly)?;
        progress.finish_render(&format!("Wrote {}", path.display()));
        (report, path)
    };

    PrettyPrinter::print_presence(&report, Some(&path), quiet);
    Ok(())
}

/// Compare every pair found under `root`. Failing pairs do not stop the run.
fn batch_command(
    config: &ReconConfig,
    root: &Path,
    input: &InputArgs,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let settings = compare_settings(config, input)?;
    let (format, export_dir) = export_target(config, format, output)?;
    let renderer = renderer_for(format, &export_dir);
    let plan = discover_pairs(root)?;

    let mut outcomes = Vec::with_capacity(plan.pairs.len());
    for pair in &plan.pairs {
        log::info!("Comparing {}", pair.name);
        let mut progress = ProgressReporter::new_minimal();
        let result = compare_paths(&pair.old, &pair.new, &settings, &mut progress).and_then(|report| {
            let path = renderer.render(&report, &pair.export_name(), RenderScope::Full)?;
            Ok((report.summary(), path))
        });
        if let Err(e) = &result {
            log::warn!("{} failed: {}", pair.name, e);
        }
        outcomes.push(BatchOutcome {
            name: pair.name.clone(),
            result: result.map_err(|e| e.to_string()),
        });
    }

    PrettyPrinter::print_batch(&outcomes, &plan.skipped);

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        return Err(TabreconError::Batch {
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}

/// Key columns and load options, CLI flags over config
pub fn compare_settings(config: &ReconConfig, input: &InputArgs) -> Result<CompareSettings> {
    let keys = if input.key.is_empty() {
        config.key_columns.clone()
    } else {
        input.key.clone()
    };
    if keys.is_empty() {
        return Err(TabreconError::invalid_input(
            "No key columns: pass --key or set key_columns in the config file",
        ));
    }

    let mut load = config.load_options()?;
    if let Some(delimiter) = input.delimiter {
        load.delimiter = delimiter;
    }
    if let Some(encoding) = &input.encoding {
        load.encoding = encoding.clone();
    }
    if input.keep_empty {
        load.empty_as_missing = false;
    }
    if input.trim {
        load.trim = true;
    }

    Ok(CompareSettings {
        key_columns: KeyColumns::new(keys)?,
        load,
    })
}

/// Report format and export directory, CLI flags over config
pub fn export_target(
    config: &ReconConfig,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<(ReportFormat, PathBuf)> {
    let format = ReportFormat::parse(format.unwrap_or(&config.format))
        .map_err(TabreconError::invalid_input)?;
    let dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.export_dir.clone());
    Ok((format, dir))
}

fn reporter(old: &Path, new: &Path, show_progress: bool) -> Result<ProgressReporter> {
    for path in [old, new] {
        if !path.is_file() {
            return Err(TabreconError::invalid_input(format!(
                "Input file does not exist: {}",
                path.display()
            )));
        }
    }
    Ok(if show_progress {
        ProgressReporter::new_for_compare(&old.display().to_string(), &new.display().to_string())
    } else {
        ProgressReporter::new_minimal()
    })
}
