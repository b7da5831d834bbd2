use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use mood_diary::app::App;
use mood_diary::cli::{Cli, Command};
use mood_diary::render;
use mood_diary::storage::FileStorage;
use mood_diary::ui::Tui;
use mood_diary::{logging, DiaryState};
use std::fs;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(&cli.log_file)?;

    let storage = FileStorage::open(&cli.storage)
        .wrap_err_with(|| format!("Failed to open diary at {}", cli.storage.display()))?;
    let diary_state = DiaryState::initialize(storage)?;

    match cli.command {
        Some(Command::Export { output }) => {
            let page = render::render_page(&render::project(diary_state.entries()));
            match output {
                Some(path) => {
                    fs::write(&path, page)?;
                    info!(path = %path.display(), "exported diary");
                }
                None => print!("{page}"),
            }
        }
        None => {
            let mut app = App::new(diary_state);
            {
                let mut tui = Tui::new()?;
                app.run(tui.terminal()).await?;
            }
            app.into_diary().dispose()?;
            info!("diary closed");
        }
    }

    Ok(())
}
