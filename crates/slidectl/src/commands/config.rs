use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> anyhow::Result<()> {
    let path = Config::path()?;
    println!("{} {}", "Config file:".bold(), path.display());

    if !path.exists() {
        println!("{}", "(not created yet, using defaults)".dimmed());
        return Ok(());
    }

    let config = Config::load_from(&path)?;
    let yaml = serde_yaml::to_string(&config)?;
    if yaml.trim() == "{}" {
        println!("{}", "(empty)".dimmed());
    } else {
        print!("{yaml}");
    }
    Ok(())
}

fn set(key: &str, value: &str) -> anyhow::Result<()> {
    let path = Config::path()?;
    let mut config = if path.exists() {
        Config::load_from(&path)?
    } else {
        Config::default()
    };
    config.set(key, value)?;
    let path = config.save()?;
    tracing::debug!("wrote {}", path.display());
    println!("{} {key} = {value}", "Set".green().bold());
    Ok(())
}
