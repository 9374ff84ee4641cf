use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use learn_sync_config::{default_scheduler_config, Config, PathManager, StoreBackend};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(output),
        ConfigCommands::Init { force } => init_config(force, output),
    }
}

fn show_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = crate::commands::load_config()?;

    let data_dir = match config.store.backend {
        StoreBackend::Json => config
            .store
            .data_dir
            .clone()
            .unwrap_or_else(|| path_manager.store_dir())
            .display()
            .to_string(),
        StoreBackend::Memory => "-".to_string(),
    };
    let scheduler = config.scheduler.clone().unwrap_or_else(default_scheduler_config);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if !config_file.exists() {
                output.warn(format!(
                    "No config file at {}, showing defaults. Run 'coursetrack config init' to create one.",
                    config_file.display()
                ));
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Setting").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display().to_string())]);
            table.add_row(vec![
                Cell::new("Store backend"),
                Cell::new(match config.store.backend {
                    StoreBackend::Json => "json",
                    StoreBackend::Memory => "memory",
                }),
            ]);
            table.add_row(vec![Cell::new("Store directory"), Cell::new(data_dir)]);
            table.add_row(vec![
                Cell::new("Recompute on completion"),
                Cell::new(config.reconcile.recompute_on_completion.to_string()),
            ]);
            table.add_row(vec![
                Cell::new("Max write attempts"),
                Cell::new(config.reconcile.max_write_attempts.to_string()),
            ]);
            table.add_row(vec![Cell::new("Schedule (UTC)"), Cell::new(&scheduler.schedule)]);
            table.add_row(vec![Cell::new("Run on startup"), Cell::new(scheduler.run_on_startup.to_string())]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

            println!("\n{}", "Configuration".bright_cyan().bold());
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.report(
                "",
                &json!({
                    "configFile": config_file.display().to_string(),
                    "exists": config_file.exists(),
                    "storeDir": data_dir,
                    "config": config,
                }),
            );
        }
    }
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if config_file.exists() && !force {
        output.warn(format!(
            "Config file already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
        return Ok(());
    }

    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;

    let config = Config {
        scheduler: Some(default_scheduler_config()),
        ..Config::default()
    };
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}
