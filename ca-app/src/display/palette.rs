use console::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    User,
    Assistant,
    Error,
    Notice,
    Heading,
}

pub trait Palette: Send + Sync {
    fn paint(&self, tone: Tone, text: &str) -> String;
}

/// ANSI styling through `console`.
pub struct AnsiPalette;

impl Palette for AnsiPalette {
    fn paint(&self, tone: Tone, text: &str) -> String {
        let style = match tone {
            Tone::User => Style::new().green().bold(),
            Tone::Assistant => Style::new().cyan().bold(),
            Tone::Error => Style::new().red().bold(),
            Tone::Notice => Style::new().dim(),
            Tone::Heading => Style::new().magenta().bold(),
        };
        // Colour support was decided at startup.
        style.force_styling(true).apply_to(text).to_string()
    }
}

/// Every tone renders as the bare text.
pub struct PlainPalette;

impl Palette for PlainPalette {
    fn paint(&self, _tone: Tone, text: &str) -> String {
        text.to_string()
    }
}
