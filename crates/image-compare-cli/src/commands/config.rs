//! Show effective configuration.

use anyhow::Result;
use clap::Args;

use super::SettingsArgs;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let config = args.settings.resolve()?;
    println!("{}", config.to_json()?);
    Ok(())
}
