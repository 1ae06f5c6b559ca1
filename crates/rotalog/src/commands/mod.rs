//! Command implementations

pub mod describe;
pub mod rotate;
pub mod run;
pub mod tee;

use anyhow::{bail, Result};
use rotalog_core::{ConfigFile, OpenMode, RotationConfig, When, CONFIG_FILES};
use std::path::Path;

use crate::cli::DestinationArgs;

/// Resolve the destination flags into a validated rotation config
pub fn resolve_config(args: &DestinationArgs) -> Result<RotationConfig> {
    let cwd = std::env::current_dir()?;
    resolve_config_in(args, &cwd)
}

fn resolve_config_in(args: &DestinationArgs, cwd: &Path) -> Result<RotationConfig> {
    let mut config = if let Some(path) = &args.path {
        RotationConfig::new(path)
    } else if let Some(file) = &args.config {
        let loaded = ConfigFile::load(file)?;
        let base_dir = file.parent().unwrap_or(Path::new("."));
        loaded
            .destination(args.name.as_deref())?
            .to_rotation_config(base_dir)?
    } else if CONFIG_FILES.iter().any(|name| cwd.join(name).exists()) {
        let (loaded, _) = ConfigFile::find_and_load(cwd)?;
        loaded
            .destination(args.name.as_deref())?
            .to_rotation_config(cwd)?
    } else if let Some(name) = &args.name {
        RotationConfig::new(rotalog_logs::default_path(name))
    } else {
        bail!("No destination given. Use --path, --config, or --name");
    };

    if let Some(max_bytes) = args.max_bytes {
        config.max_bytes = max_bytes;
    }
    if let Some(backup_count) = args.backup_count {
        config.backup_count = backup_count;
    }
    if let Some(when) = &args.when {
        config.when = when.parse::<When>()?;
    }
    if let Some(interval) = args.interval {
        config.interval = interval;
    }
    if args.utc {
        config.utc = true;
    }
    if let Some(header) = &args.header {
        config.header = Some(header.clone());
    }
    if args.delay {
        config.delay = true;
    }
    if args.truncate {
        config.mode = OpenMode::Truncate;
    }

    config.validate()?;
    Ok(config)
}
