/// Configuration display command
use super::helpers::ConfigArgs;
use anyhow::Result;
use eyebreak_core::config::default_config_path;

pub fn show_config(args: &ConfigArgs) -> Result<()> {
    let config = args.resolve()?;
    // Fail early on values the monitor would refuse
    config.validate()?;

    let source = match &args.config {
        Some(path) => path.display().to_string(),
        None => default_config_path()?.display().to_string(),
    };
    println!("# {source}");
    print!("{}", config.to_toml()?);
    Ok(())
}
