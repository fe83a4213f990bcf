use aiservice_cli::{App, Command, Manifest};
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let app = App::parse();
    app.init_tracing();

    match &app.command {
        Command::Generate(generate) => {
            let summary = generate.run(&app.manifest)?;
            for warning in &summary.warnings {
                tracing::warn!("{warning}");
            }
        }
        Command::Inspect(inspect) => inspect.run(&app.manifest)?,
        Command::Init => Manifest::default().save(&app.manifest)?,
    }

    Ok(())
}
