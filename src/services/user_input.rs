use crate::error::Result;
use crate::events::{OverlayEvent, UserAction};
use std::io::BufRead;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Читает команды пользователя из stdin в отдельном потоке.
///
/// Блокирующее чтение stdin нельзя отменить, поэтому это обычный поток, а не задача tokio:
/// он не держит рантайм при завершении и умирает вместе с процессом.
pub fn spawn_stdin_reader(events: mpsc::Sender<OverlayEvent>) -> Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            read_commands(stdin.lock(), &events);
        })?;
    Ok(handle)
}

/// Разбирает построчно до EOF или до закрытия канала
pub fn read_commands<R: BufRead>(reader: R, events: &mpsc::Sender<OverlayEvent>) {
    info!("Команды: p - предыдущая, n - следующая, пробел/Enter - пауза, c - копировать, q - выход");

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Ошибка чтения stdin: {}", e);
                break;
            }
        };

        match line.parse::<UserAction>() {
            Ok(action) => {
                if events.blocking_send(action.into()).is_err() {
                    break;
                }
                if action == UserAction::Quit {
                    break;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    info!("Чтение команд из stdin завершено");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_actions_and_skips_garbage() {
        let (tx, mut rx) = mpsc::channel(16);
        read_commands(Cursor::new("n\nwhat\np\n \nc\n"), &tx);

        let mut actions: Vec<OverlayEvent> = Vec::new();
        while let Ok(event) = rx.try_recv() {
            actions.push(event);
        }
        assert_eq!(
            actions,
            vec![
                OverlayEvent::User(UserAction::Next),
                OverlayEvent::User(UserAction::Previous),
                OverlayEvent::User(UserAction::TogglePause),
                OverlayEvent::User(UserAction::Copy),
            ]
        );
    }

    #[test]
    fn test_stops_after_quit() {
        let (tx, mut rx) = mpsc::channel(16);
        read_commands(Cursor::new("q\nn\n"), &tx);

        assert_eq!(rx.try_recv().ok(), Some(OverlayEvent::User(UserAction::Quit)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stops_when_channel_closed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        read_commands(Cursor::new("n\nn\nn\n"), &tx);
    }
}
