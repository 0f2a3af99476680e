//! Config command

use crate::context::Context;
use crate::error::Result;

/// Print the effective configuration as TOML
pub fn run_config(ctx: &Context) -> Result<()> {
    println!("# sandbox: {}", ctx.sandbox.display());
    print!("{}", toml::to_string_pretty(&ctx.config)?);
    Ok(())
}
