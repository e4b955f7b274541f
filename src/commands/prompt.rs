use eyre::Result;

use super::Context;
use crate::persona::render_prompt;

pub fn run(name: &str, with_header: bool, ctx: &Context) -> Result<()> {
    let (loader, _) = ctx.load()?;

    let persona = loader
        .get(name)
        .ok_or_else(|| eyre::eyre!("Persona '{}' not found in {}", name, loader.root().display()))?;

    log::debug!("Rendering prompt for {} from {}", persona.name(), persona.path.display());
    println!("{}", render_prompt(persona, with_header));

    Ok(())
}
