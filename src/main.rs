mod console;

use std::sync::Arc;

use subsentry_backend::EnvTokenProvider;
use subsentry_frontend::dom::Document;
use subsentry_frontend::views::HeaderUi;
use tokio::sync::mpsc;

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()?;

    let channels = subsentry_bridge::BridgeChannels::default();
    let auth = Arc::new(EnvTokenProvider::from_env());
    let backend = subsentry_backend::run(channels.backend_rx, channels.backend_tx, auth);

    let (ui_tx, ui_rx) = mpsc::channel(32);
    println!("{}", console::HELP);
    // not joined: it stays blocked on stdin until the process exits
    let _reader = console::spawn_reader(ui_tx);

    let header = HeaderUi::new(Document::new());
    header.dropdown_region().set(console::DROPDOWN_BOUNDS);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(subsentry_frontend::run(
        header,
        channels.frontend_rx,
        channels.frontend_tx,
        ui_rx,
        |view| println!("{}", console::render_text(view)),
    ))?;

    if backend.join().is_err() {
        log::error!("Backend thread panicked");
    }
    Ok(())
}
