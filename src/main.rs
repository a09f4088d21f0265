use clap::Parser;
use color_eyre::Result;
use duetask::{Config, Profile, TaskStore, cli::{Cli, Commands}};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    // Load configuration, letting --config override the profile path
    let config = match cli.config {
        Some(ref path) => Config::load_from_path(path)?,
        None => Config::load_with_profile(profile)?,
    };

    // Open the task storage file
    let storage_path = config.get_storage_path(profile);
    let store = TaskStore::open(
        storage_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Storage path contains invalid UTF-8"))?,
    )?;

    // Dispatch to appropriate command handler
    match cli.command {
        None | Some(Commands::Tui) => {
            let app = duetask::tui::App::new(config, store)?;
            duetask::tui::run_event_loop(app)?;
        }
        Some(Commands::Add { text, date, time }) => {
            duetask::cli::handle_add(text, date, time, &store)?;
        }
        Some(Commands::List) => {
            duetask::cli::handle_list(&store)?;
        }
        Some(Commands::Toggle { id }) => {
            duetask::cli::handle_toggle(id, &store)?;
        }
        Some(Commands::Rm { id }) => {
            duetask::cli::handle_rm(id, &store)?;
        }
    }

    Ok(())
}
