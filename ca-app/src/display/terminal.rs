use console::Term;
use std::io;

pub const MIN_WRAP_WIDTH: usize = 40;
pub const DEFAULT_WRAP_WIDTH: usize = 100;

pub trait Terminal: Send + Sync {
    /// Visible columns, if they can be detected.
    fn columns(&self) -> Option<usize>;

    fn clear_screen(&self) -> io::Result<()>;
}

/// The attached terminal, via `console`.
pub struct ConsoleTerminal {
    term: Term,
}

impl ConsoleTerminal {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Terminal for ConsoleTerminal {
    fn columns(&self) -> Option<usize> {
        self.term
            .size_checked()
            .map(|(_rows, cols)| usize::from(cols))
    }

    fn clear_screen(&self) -> io::Result<()> {
        self.term.clear_screen()
    }
}

/// No terminal attached: size is unknown and clearing does nothing.
pub struct Headless;

impl Terminal for Headless {
    fn columns(&self) -> Option<usize> {
        None
    }

    fn clear_screen(&self) -> io::Result<()> {
        Ok(())
    }
}

pub fn wrap_width(columns: Option<usize>) -> usize {
    columns
        .map(|c| c.max(MIN_WRAP_WIDTH))
        .unwrap_or(DEFAULT_WRAP_WIDTH)
}
