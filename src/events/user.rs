use std::fmt;
use std::str::FromStr;

/// Действие пользователя, не зависящее от опроса оконного менеджера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    Previous,
    Next,
    TogglePause,
    Copy,
    Quit,
}

impl FromStr for UserAction {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        // Пробел отдельно: строка из одного пробела означает паузу
        if input == " " {
            return Ok(UserAction::TogglePause);
        }

        match input.trim().to_lowercase().as_str() {
            "p" | "prev" | "previous" | "◀" => Ok(UserAction::Previous),
            "n" | "next" | "▶" => Ok(UserAction::Next),
            "" | "pause" | "resume" | "toggle" => Ok(UserAction::TogglePause),
            "c" | "copy" => Ok(UserAction::Copy),
            "q" | "quit" | "exit" => Ok(UserAction::Quit),
            other => Err(format!("неизвестная команда: {}", other)),
        }
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserAction::Previous => "previous",
            UserAction::Next => "next",
            UserAction::TogglePause => "pause",
            UserAction::Copy => "copy",
            UserAction::Quit => "quit",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_and_long_forms() {
        assert_eq!("p".parse::<UserAction>(), Ok(UserAction::Previous));
        assert_eq!("Next".parse::<UserAction>(), Ok(UserAction::Next));
        assert_eq!(" ".parse::<UserAction>(), Ok(UserAction::TogglePause));
        assert_eq!("pause".parse::<UserAction>(), Ok(UserAction::TogglePause));
        assert_eq!("c\n".parse::<UserAction>(), Ok(UserAction::Copy));
        assert_eq!("quit".parse::<UserAction>(), Ok(UserAction::Quit));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!("dance".parse::<UserAction>().is_err());
    }
}
