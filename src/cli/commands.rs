//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands. Handlers
//! consume the library's public operations; everything camera-shaped is
//! behind the transport traits so `--dry-run` and the store commands never
//! touch hardware.

use crate::cli::args::{Args, Commands, ConfigCommands, TemplateCommands};
use crate::core::capture::{CancelToken, CaptureSession};
use crate::core::config::{config_dir, config_path, Config};
use crate::core::connection::{with_camera, ConnectionState};
use crate::core::reconcile::reconcile;
use crate::core::runtime::{SessionRegistry, SessionStatus};
use crate::core::settings::{self, Settings, SettingsOverrides};
use crate::core::template::TemplateStore;
use crate::device::gphoto::GPhotoTransport;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often a running session checks for a cross-process stop request
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Run the appropriate command based on CLI arguments
pub fn run_command(args: &Args, config: &Config, cancel: CancelToken) -> Result<()> {
    match &args.command {
        Commands::Start {
            template,
            exposure,
            aperture,
            delay,
            iso,
            quality,
            max_exposures,
            port,
            output_dir,
            dry_run,
        } => {
            let overrides = SettingsOverrides {
                exposure: *exposure,
                aperture: *aperture,
                iso: iso.clone(),
                delay: *delay,
                quality: quality.clone(),
                max_exposures: *max_exposures,
            };
            start_session(
                config,
                template.as_deref(),
                &overrides,
                port.as_deref(),
                output_dir.clone(),
                *dry_run,
                cancel,
            )
        }
        Commands::Stop { session_id } => stop_session(session_id.as_deref()),
        Commands::Status => show_status(),
        Commands::Templates { command } => match command {
            TemplateCommands::List => list_templates(config),
            TemplateCommands::Show { name } => show_template(config, name),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Init => init_config(args, config),
            ConfigCommands::Show => show_config(config),
        },
    }
}

/// Counters for the end-of-session summary
#[derive(Debug, Default)]
struct SessionStats {
    succeeded: u32,
    failed: u32,
}

fn start_session(
    config: &Config,
    template_name: Option<&str>,
    overrides: &SettingsOverrides,
    port: Option<&str>,
    output_dir: Option<PathBuf>,
    dry_run: bool,
    cancel: CancelToken,
) -> Result<()> {
    let store = TemplateStore::new(&config.templates_directory);
    let template = settings::effective_template(config, &store, template_name)?;
    let requested = Settings::layered(template.as_ref(), overrides);

    let output_dir = output_dir.unwrap_or_else(|| config.output_directory.clone());
    let filename_pattern = template
        .as_ref()
        .and_then(|t| t.filename_pattern.clone())
        .unwrap_or_else(|| config.filename_pattern.clone());
    let timestamp_format = template
        .as_ref()
        .and_then(|t| t.timestamp_format.clone())
        .unwrap_or_else(|| config.timestamp_format.clone());

    if dry_run {
        println!("Dry run - resolved session configuration:");
        if let Some(ref template) = template {
            println!("  Template:      {}", template.name);
        }
        print_settings(&requested);
        println!("  Output dir:    {}", output_dir.display());
        println!("  Name pattern:  {}", filename_pattern);
        match port {
            Some(port) => println!("  Port:          {}", port),
            None => println!("  Port:          (auto-detect)"),
        }
        return Ok(());
    }

    let transport = GPhotoTransport::locate().context(
        "gphoto2 binary not found on PATH; install gphoto2 to control a camera",
    )?;

    let port = port
        .map(str::to_string)
        .or_else(|| (!config.default_port.is_empty()).then(|| config.default_port.clone()));
    if port.is_none() && !config.auto_detect_camera {
        bail!("no port specified and camera auto-detection is disabled in the config");
    }

    let session_id = format!("skycam-{}", std::process::id());
    let registry = SessionRegistry::new(config_dir());
    registry.clear_stop()?;
    let mut status = SessionStatus::new(
        &session_id,
        ConnectionState::Connecting.label(),
        template.as_ref().map(|t| t.name.as_str()),
    );
    registry.write(&status)?;

    // Watch for a cross-process stop request and fold it into the token
    let session_active = Arc::new(AtomicBool::new(true));
    let watcher = spawn_stop_watcher(
        registry.clone(),
        session_id.clone(),
        cancel.clone(),
        Arc::clone(&session_active),
    );

    info!("Starting capture session {}", session_id);
    info!("Output directory: {}", output_dir.display());
    let result = with_camera(&transport, port.as_deref(), |connection| {
        let (adjusted, warnings) = if config.auto_adjust_settings {
            reconcile(&requested, connection.capabilities())
        } else {
            (requested.clone(), Vec::new())
        };
        if config.warn_on_adjustment {
            for warning in &warnings {
                warn!("{}", warning);
            }
        }

        for warning in connection.configure(&adjusted) {
            warn!("{}", warning);
        }

        status.state = ConnectionState::Capturing.label().to_string();
        registry.write(&status).ok();

        let progress = session_progress(adjusted.max_exposures);
        let mut stats = SessionStats::default();
        let session = CaptureSession::new(
            connection,
            adjusted,
            cancel.clone(),
            &filename_pattern,
            &timestamp_format,
        );
        for result in session {
            if result.success {
                stats.succeeded += 1;
                progress.set_message(
                    result.file_name.clone().unwrap_or_default(),
                );
            } else {
                stats.failed += 1;
                progress.set_message(
                    result.error_message.clone().unwrap_or_default(),
                );
            }
            progress.inc(1);
            status.frames_captured = stats.succeeded + stats.failed;
            registry.write(&status).ok();
        }
        progress.finish_and_clear();
        Ok(stats)
    });

    session_active.store(false, Ordering::SeqCst);
    if watcher.join().is_err() {
        warn!("Stop watcher thread panicked");
    }
    registry.clear()?;
    registry.clear_stop()?;

    let stats = result?;
    println!(
        "Session {} finished: {} captured, {} failed",
        session_id, stats.succeeded, stats.failed
    );
    Ok(())
}

fn spawn_stop_watcher(
    registry: SessionRegistry,
    session_id: String,
    cancel: CancelToken,
    session_active: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while session_active.load(Ordering::SeqCst) && !cancel.is_cancelled() {
            if registry.stop_requested(&session_id) {
                info!("Stop requested for {}", session_id);
                cancel.cancel();
                break;
            }
            thread::sleep(STOP_POLL_INTERVAL);
        }
    })
}

fn session_progress(max_exposures: u32) -> ProgressBar {
    if max_exposures > 0 {
        let bar = ProgressBar::new(u64::from(max_exposures));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:30.cyan/blue} {pos}/{len} exposures {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} exposures {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

fn stop_session(session_id: Option<&str>) -> Result<()> {
    let registry = SessionRegistry::new(config_dir());
    match registry.read() {
        Some(status) => {
            if let Some(requested) = session_id {
                if requested != status.session_id {
                    bail!(
                        "session '{}' is not running (current session is '{}')",
                        requested,
                        status.session_id
                    );
                }
            }
            registry.request_stop(session_id)?;
            println!("Stop requested for session {}", status.session_id);
        }
        None => println!("No active session"),
    }
    Ok(())
}

fn show_status() -> Result<()> {
    let registry = SessionRegistry::new(config_dir());
    match registry.read() {
        Some(status) => {
            println!("Session:         {}", status.session_id);
            println!("  State:         {}", status.state);
            println!("  Started:       {}", status.started_at);
            println!("  Exposures:     {}", status.frames_captured);
            if let Some(template) = status.template {
                println!("  Template:      {}", template);
            }
        }
        None => println!("No active session"),
    }
    Ok(())
}

fn list_templates(config: &Config) -> Result<()> {
    let store = TemplateStore::new(&config.templates_directory);
    let names = store.list_names()?;
    if names.is_empty() {
        println!("No templates found in {}", store.dir().display());
        println!("Run 'skycam config init' to create the default template.");
        return Ok(());
    }
    println!("Available templates:");
    for name in names {
        match store.load(&name) {
            Ok(template) => println!(
                "  {:<16} {}",
                name,
                template.description.unwrap_or_default()
            ),
            Err(e) => println!("  {:<16} (unreadable: {})", name, e),
        }
    }
    Ok(())
}

fn show_template(config: &Config, name: &str) -> Result<()> {
    let store = TemplateStore::new(&config.templates_directory);
    let template = store.get(name)?;
    println!("Template: {}", template.name);
    if let Some(description) = &template.description {
        println!("  {}", description);
    }
    print_template_field("Exposure", template.exposure.map(|v| format!("{}s", v)));
    print_template_field("Aperture", template.aperture.map(|v| format!("f/{}", v)));
    print_template_field("ISO", template.iso.clone());
    print_template_field("Delay", template.delay.map(|v| format!("{}s", v)));
    print_template_field("Quality", template.quality.clone());
    print_template_field(
        "Max exposures",
        template.max_exposures.map(|v| v.to_string()),
    );
    print_template_field("Name pattern", template.filename_pattern.clone());
    print_template_field("Timestamp", template.timestamp_format.clone());
    print_template_field(
        "Temp. monitor",
        template.temperature_monitoring.map(|v| v.to_string()),
    );
    Ok(())
}

fn print_template_field(label: &str, value: Option<String>) {
    match value {
        Some(value) => println!("  {:<14} {}", format!("{}:", label), value),
        None => println!("  {:<14} (not set)", format!("{}:", label)),
    }
}

fn init_config(args: &Args, config: &Config) -> Result<()> {
    let path = args.config.clone().unwrap_or_else(config_path);
    config.save(&path)?;
    let store = TemplateStore::new(&config.templates_directory);
    store.ensure_default()?;
    println!("Configuration initialized:");
    println!("  Config file:   {}", path.display());
    println!("  Templates:     {}", config.templates_directory.display());
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("Current configuration ({}):", config_path().display());
    println!("  Default template:  {}", config.default_template);
    println!(
        "  Templates dir:     {}",
        config.templates_directory.display()
    );
    println!(
        "  Output dir:        {}",
        config.output_directory.display()
    );
    println!("  Name pattern:      {}", config.filename_pattern);
    println!("  Timestamp format:  {}", config.timestamp_format);
    println!("  Auto-detect:       {}", config.auto_detect_camera);
    if !config.default_port.is_empty() {
        println!("  Default port:      {}", config.default_port);
    }
    println!("  Auto-adjust:       {}", config.auto_adjust_settings);
    println!("  Warn on adjust:    {}", config.warn_on_adjustment);
    println!("  Max retries:       {}", config.max_retries);
    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("  Exposure:      {}s", settings.exposure);
    println!("  Aperture:      f/{}", settings.aperture);
    println!("  ISO:           {}", settings.iso);
    println!("  Delay:         {}s", settings.delay);
    println!("  Quality:       {}", settings.quality);
    match settings.max_exposures {
        0 => println!("  Max exposures: unlimited"),
        n => println!("  Max exposures: {}", n),
    }
}
