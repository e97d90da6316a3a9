use {anyhow::Result, tessera_config::TesseraConfig};

/// Print the effective config, with defaulted directories filled in.
pub fn handle_config(config: &TesseraConfig) -> Result<()> {
    let mut effective = config.clone();
    effective.cache.dir = Some(config.cache_dir());
    effective.staging.dir = Some(config.staging_dir());

    match tessera_config::config_dir() {
        Some(dir) => eprintln!("# user config dir: {}", dir.display()),
        None => eprintln!("# no user config dir available"),
    }
    print!("{}", tessera_config::to_toml_string(&effective)?);
    Ok(())
}
