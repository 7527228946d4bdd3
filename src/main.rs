mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use cli::{Cli, Commands, CommonArgs, Format};
use dbgc::config::{ConfigOverlay, DetectionMode, ScanConfig};
use dbgc::dispatch::rewrite_file;
use dbgc::report::{write_json, TextReport};
use dbgc::{Action, Batch, Target};
use dialoguer::theme::ColorfulTheme;
use dialoguer::MultiSelect;

fn main() -> Result<ExitCode> {
    dbgc::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(&args),
        Commands::Off(args) => run_rewrite(&args, Action::CommentOut),
        Commands::On(args) => run_rewrite(&args, Action::Uncomment),
        Commands::Delete(args) => run_rewrite(&args, Action::Delete),
    }
}

/// Build the batch scanner from flags, with the keyword it resolved to.
/// Config errors are fatal before any scanning.
fn build_batch(args: &CommonArgs, include_disabled: bool) -> Result<(Batch, String)> {
    let mut overlay = match &args.config {
        Some(path) => ScanConfig::load(path)?,
        None => ConfigOverlay::default(),
    };
    if let Some(lang) = &args.lang {
        overlay.language = Some(lang.clone());
    }
    if let Some(keyword) = &args.keyword {
        overlay.debug_keyword = Some(keyword.clone());
    }
    if args.all {
        overlay.mode = Some(DetectionMode::AllOutput);
    }

    let batch = Batch::new(&overlay).context("invalid configuration")?;
    Ok((batch.with_disabled(include_disabled), overlay.keyword().to_string()))
}

fn target_path(args: &CommonArgs) -> PathBuf {
    args.path.clone().unwrap_or_else(|| PathBuf::from("."))
}

fn run_scan(args: &CommonArgs) -> Result<ExitCode> {
    let (batch, keyword) = build_batch(args, false)?;
    let report = batch.scan_path(&target_path(args));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Json => write_json(&mut out, &report)?,
        Format::Text => {
            let text = TextReport::new(&keyword);
            if report.debug_count() == 0 {
                writeln!(out, "No matching debug statements found.")?;
            } else {
                writeln!(out, "\nFound {} debug statement(s):\n", report.debug_count())?;
                text.write_active(&mut out, &report)?;
            }
            text.write_failures(&mut io::stderr(), &report)?;
        }
    }

    if report.debug_count() > 0 || !report.failed.is_empty() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn confirm(action: Action) -> Result<bool> {
    eprint!("Do you want to {} these statements? (y/n): ", action.verb());
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Multi-select over `targets`. `None` when the user cancels.
fn select<'r>(text: &TextReport, targets: &[Target<'r>], action: Action) -> Result<Option<Vec<Target<'r>>>> {
    let items: Vec<String> = targets.iter().map(|t| text.item(t)).collect();
    eprintln!("Select statements to {}.", action.verb());
    eprintln!("Use arrow keys to navigate, Space to toggle, Enter to confirm, Esc or q to cancel\n");

    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .items(&items)
        .interact_opt()?;
    Ok(picked.map(|indices| indices.into_iter().map(|i| targets[i]).collect()))
}

fn run_rewrite(args: &CommonArgs, action: Action) -> Result<ExitCode> {
    let (batch, keyword) = build_batch(args, action != Action::CommentOut)?;
    let report = batch.scan_path(&target_path(args));
    let targets = report.targets(action);
    let text = TextReport::new(&keyword);

    let status = if report.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    text.write_failures(&mut io::stderr(), &report)?;
    if targets.is_empty() {
        writeln!(out, "No matching debug statements found.")?;
        return Ok(status);
    }
    if args.format == Format::Json {
        write_json(&mut out, &report)?;
    } else if !args.interactive {
        writeln!(out, "\nFound {} debug statement(s) to {}:\n", targets.len(), action.verb())?;
        if action != Action::Uncomment {
            text.write_active(&mut out, &report)?;
        }
        if action != Action::CommentOut {
            text.write_disabled(&mut out, &report)?;
        }
    }
    drop(out);

    let chosen = if args.interactive {
        match select(&text, &targets, action)? {
            Some(chosen) => chosen,
            None => {
                println!("\nOperation cancelled.");
                return Ok(status);
            }
        }
    } else {
        targets
    };
    if chosen.is_empty() {
        println!("\nNo statements selected.");
        return Ok(status);
    }

    if args.dry_run {
        println!("\n[DRY RUN] Would {} {} statement(s).", action.verb(), chosen.len());
        return Ok(status);
    }
    if !args.yes && !args.interactive && !confirm(action)? {
        println!("\nOperation cancelled.");
        return Ok(status);
    }

    let mut processed = 0usize;
    for (path, rewrite) in batch.plan(&chosen, action) {
        processed += rewrite_file(&path, &rewrite)?;
    }
    println!("\nSuccessfully processed {} statement(s).", processed);
    if processed < chosen.len() {
        println!("{} statement(s) share lines with other code and were left unchanged.", chosen.len() - processed);
    }

    Ok(status)
}
