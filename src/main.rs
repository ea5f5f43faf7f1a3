use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use events::OverlayEvent;
use services::{
    create_clipboard, create_window_manager, user_input, Coordinator, PlacementWorker,
    QuoteStore, TerminalSurface, WorkspacePoller,
};
use utils::MarkerFile;

const EVENT_CHANNEL_CAPACITY: usize = 64;
const PLACEMENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Parser, Debug)]
#[command(name = "hyprquotes")]
#[command(about = "Показывает цитаты о программировании на пустых рабочих столах Hyprland")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "hyprquotes.toml")]
    config: String,

    /// Режим сухого запуска (без hyprctl и wl-copy)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает значение из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// JSON-файл с цитатами (перекрывает значение из конфигурации)
    #[arg(short, long)]
    quotes: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;
    if let Some(quotes) = &args.quotes {
        config.quotes.file = quotes.clone();
    }

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск hyprquotes v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - hyprctl и wl-copy не вызываются");
    }

    let config = Arc::new(config);
    utils::tools::check_tools(&config, args.dry_run);

    QuoteStore::ensure_seed_file(&config.quotes.file);
    let store = QuoteStore::load(&config.quotes.file);

    // Инициализация компонентов
    let window_manager = create_window_manager(config.clone(), args.dry_run);
    let clipboard = create_clipboard(&config, args.dry_run);
    let surface = TerminalSurface::stdout(&config.poller.overlay_identifier)?;
    let marker = MarkerFile::new(&config.window_manager.marker_file);

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (placement_tx, placement_rx) = mpsc::channel(PLACEMENT_CHANNEL_CAPACITY);
    let polling = Arc::new(AtomicBool::new(true));

    let coordinator = Coordinator::new(
        &config,
        store,
        Box::new(surface),
        clipboard,
        placement_tx,
        events_tx.clone(),
    );
    let poller = WorkspacePoller::new(
        &config,
        window_manager.clone(),
        polling.clone(),
        events_tx.clone(),
    );
    let placement = PlacementWorker::new(&config, window_manager, placement_rx);

    info!("Все компоненты инициализированы");

    // Запуск всех сервисов параллельно
    let mut coordinator_handle = tokio::spawn(async move {
        if let Err(e) = coordinator.run(events_rx).await {
            error!("Ошибка в Coordinator: {}", e);
        }
    });
    let poller_handle = tokio::spawn(async move {
        if let Err(e) = poller.run().await {
            error!("Ошибка в WorkspacePoller: {}", e);
        }
    });
    let placement_handle = tokio::spawn(async move {
        if let Err(e) = placement.run().await {
            error!("Ошибка в PlacementWorker: {}", e);
        }
    });

    // Поток stdin не присоединяем: блокирующее чтение завершится вместе с процессом
    let _stdin_reader = user_input::spawn_stdin_reader(events_tx.clone())?;

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения или команды выхода
    let mut sigterm = unix_signal(SignalKind::terminate())?;
    let coordinator_finished = tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
            false
        }
        _ = sigterm.recv() => {
            info!("Получен сигнал завершения (SIGTERM)");
            false
        }
        _ = &mut coordinator_handle => {
            info!("Координатор завершил работу по команде выхода");
            true
        }
    };

    info!("Завершение работы...");

    // Опрос останавливается на следующем тике, координатор по событию Shutdown.
    // PlacementWorker завершится, когда координатор освободит свой отправитель.
    polling.store(false, Ordering::Relaxed);
    if !coordinator_finished && events_tx.send(OverlayEvent::Shutdown).await.is_err() {
        warn!("Координатор уже не принимает события");
    }
    drop(events_tx);

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        if !coordinator_finished {
            let _ = coordinator_handle.await;
        }
        let _ = poller_handle.await;
        let _ = placement_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    marker.remove();

    info!("hyprquotes завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    // stdout занят оверлеем, логи идут в stderr
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if format == "full" {
        tracing_subscriber::registry().with(filter).with(layer).init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .init();
    }

    Ok(())
}
