//! Terminal presentation: colour, banner, screen size and wrapping.
//!
//! Each concern is a capability picked once at startup. The plain variants
//! produce identical text without escapes, and presentation failures are
//! never shown to the user.

mod banner;
mod palette;
mod terminal;
mod wrap;

pub use banner::{Banner, FramedBanner, PlainBanner};
pub use palette::{AnsiPalette, Palette, PlainPalette, Tone};
pub use terminal::{ConsoleTerminal, Headless, Terminal, wrap_width};
pub use wrap::wrap_text;

pub struct Display {
    palette: Box<dyn Palette>,
    banner: Box<dyn Banner>,
    terminal: Box<dyn Terminal>,
}

impl Display {
    pub fn new(
        palette: Box<dyn Palette>,
        banner: Box<dyn Banner>,
        terminal: Box<dyn Terminal>,
    ) -> Self {
        Self {
            palette,
            banner,
            terminal,
        }
    }

    /// Pick capabilities for the attached stdout.
    pub fn detect(no_color: bool) -> Self {
        let term = console::Term::stdout();
        let attended = term.is_term();
        let colors = attended && !no_color && console::colors_enabled();
        tracing::debug!(attended, colors, "display capabilities selected");

        let palette: Box<dyn Palette> = if colors {
            Box::new(AnsiPalette)
        } else {
            Box::new(PlainPalette)
        };
        let banner: Box<dyn Banner> = if attended {
            Box::new(FramedBanner)
        } else {
            Box::new(PlainBanner)
        };
        let terminal: Box<dyn Terminal> = if attended {
            Box::new(ConsoleTerminal::stdout())
        } else {
            Box::new(Headless)
        };
        Self::new(palette, banner, terminal)
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(
            Box::new(PlainPalette),
            Box::new(PlainBanner),
            Box::new(Headless),
        )
    }

    pub fn paint(&self, tone: Tone, text: &str) -> String {
        self.palette.paint(tone, text)
    }

    pub fn width(&self) -> usize {
        wrap_width(self.terminal.columns())
    }

    pub fn wrap(&self, text: &str) -> String {
        wrap_text(text, self.width())
    }

    pub fn banner(&self, title: &str) -> String {
        match self.banner.render(title, self.width()) {
            Some(rendered) => self.paint(Tone::Heading, &rendered),
            None => title.to_string(),
        }
    }

    pub fn clear_screen(&self) {
        if let Err(e) = self.terminal.clear_screen() {
            tracing::debug!(%e, "screen clear failed");
        }
    }
}
