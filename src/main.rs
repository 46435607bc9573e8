use clap::Parser;
use color_eyre::Result;
use datadash::{
    logging, App, AppConfig, AppEvent, Args, CacheManager, ConfigManager, OpenOptions, Theme,
    APP_NAME,
};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig, theme: Theme) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let opts = OpenOptions::from_args_and_config(args, &config);
    let debug = args.debug || config.debug.enabled;

    let mut app = App::new_with_config(tx.clone(), theme, config);
    app.set_open_options(opts.clone());
    if debug {
        app.enable_debug();
    }

    match &args.path {
        Some(path) => tx.send(AppEvent::Open(path.clone(), opts))?,
        None => app.prompt_for_path(),
    }
    render(&mut terminal, &mut app)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config = ConfigManager::new(APP_NAME)?;
        match config.write_default_config(args.force) {
            Ok(path) => {
                println!("Wrote default configuration to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error writing configuration: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_display_args(config: &mut AppConfig, args: &Args) {
    if let Some(rows) = args.preview_rows {
        config.display.preview_rows = rows;
    }
    if let Some(rows) = args.viz_rows {
        config.display.viz_rows = rows;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = AppConfig::load(APP_NAME)?;
    apply_display_args(&mut config, &args);
    let theme = Theme::from_config(&config.theme)?;

    if args.debug || config.debug.enabled {
        let cache = CacheManager::new(APP_NAME)?;
        let log_path = logging::log_path(args.log_file.as_deref(), &cache)?;
        logging::init(&log_path, &config.debug.log_level)?;
    }

    let terminal = ratatui::init();
    let result = run(terminal, &args, config, theme);
    ratatui::restore();
    if let Err(e) = result {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
