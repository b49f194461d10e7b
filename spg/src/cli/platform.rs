use clap::Args;
use spg_common::config::Config;
use spg_common::error::Result;
use spg_core::current_platform;

#[derive(Args, Debug)]
pub struct PlatformInfo {
    /// Ignore SPG_PLATFORM and always report the detected host platform
    #[arg(long)]
    pub detect: bool,
}

impl PlatformInfo {
    pub fn run(&self, config: &Config) -> Result<()> {
        let platform = match (&config.platform, self.detect) {
            (Some(configured), false) => configured.clone(),
            _ => current_platform(),
        };
        println!("{platform}");
        Ok(())
    }
}
