/// One keystroke understood by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Increment,
    Decrement,
    AddWorkProc,
    RemoveWorkProc,
    RemoveCallback,
    RemoveTimer,
    /// Start a one-shot timer with the n-th preset delay, counting from 1.
    AddTimer(usize),
}

impl Command {
    /// `None` for bytes that are not commands, including digits beyond the
    /// configured presets.
    pub fn parse(byte: u8, presets: usize) -> Option<Self> {
        match byte {
            b'+' => Some(Command::Increment),
            b'-' => Some(Command::Decrement),
            b'W' => Some(Command::AddWorkProc),
            b'w' => Some(Command::RemoveWorkProc),
            b'c' => Some(Command::RemoveCallback),
            b't' => Some(Command::RemoveTimer),
            b'1'..=b'9' => {
                let n = (byte - b'0') as usize;
                (n <= presets).then_some(Command::AddTimer(n))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(b'+', 5), Some(Command::Increment));
        assert_eq!(Command::parse(b'W', 5), Some(Command::AddWorkProc));
        assert_eq!(Command::parse(b'w', 5), Some(Command::RemoveWorkProc));
        assert_eq!(Command::parse(b'3', 5), Some(Command::AddTimer(3)));
    }

    #[test]
    fn test_parse_ignores_other_bytes() {
        assert_eq!(Command::parse(b'\n', 5), None);
        assert_eq!(Command::parse(b'x', 5), None);
        assert_eq!(Command::parse(b'0', 5), None);
        assert_eq!(Command::parse(b'6', 5), None);
    }
}
