//! InfraBot terminal client

use infrabot::app::App;
use infrabot::client::{HttpTransport, LoggingTransport};
use infrabot::config::ClientConfig;
use infrabot::navigator::Navigator;
use infrabot::runtime::spawn_controller;
use infrabot::session::Session;
use infrabot::state_machine::ControllerUpdate;
use infrabot::topics::{default_catalog, load_from_file};
use infrabot::tui::{self, AppEvent, EventHandler, Tui};
use infrabot::ui;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;

    // The terminal belongs to the UI, so logs go to a file
    if let Some(parent) = config.log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "infrabot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    let topics = match &config.topics_file {
        Some(path) => load_from_file(path)?,
        None => default_catalog(),
    };

    let transport = LoggingTransport::new(Arc::new(HttpTransport::new(&config.chat_url)?));
    let (controller, mut updates) = spawn_controller(transport);
    let mut app = App::new(Session::new(Navigator::new(topics), controller));

    tracing::info!(endpoint = %config.chat_url, "InfraBot client starting");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events, &mut updates).await;
    tui::restore()?;

    tracing::info!("InfraBot client stopped");
    result
}

async fn run(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
    updates: &mut mpsc::UnboundedReceiver<ControllerUpdate>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => match event {
                AppEvent::Key(key) => app.handle_key(key),
                AppEvent::Tick => app.tick(),
                AppEvent::Resize => {}
            },
            Some(update) = updates.recv() => {
                app.session.apply(update);
                // Coalesce bursts of chunks into one redraw
                while let Ok(update) = updates.try_recv() {
                    app.session.apply(update);
                }
            }
            else => break,
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
