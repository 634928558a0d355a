use console::measure_text_width;

pub trait Banner: Send + Sync {
    /// Render `title` within `width` columns, or `None` when it does not fit.
    fn render(&self, title: &str, width: usize) -> Option<String>;
}

/// Title centred in a rounded box.
pub struct FramedBanner;

const PADDING: usize = 4;

impl Banner for FramedBanner {
    fn render(&self, title: &str, width: usize) -> Option<String> {
        let title = title.trim();
        if title.is_empty() || title.contains('\n') {
            return None;
        }
        let inner = measure_text_width(title) + PADDING * 2;
        if inner + 2 > width {
            return None;
        }
        let rule = "─".repeat(inner);
        let pad = " ".repeat(PADDING);
        Some(format!("╭{rule}╮\n│{pad}{title}{pad}│\n╰{rule}╯"))
    }
}

pub struct PlainBanner;

impl Banner for PlainBanner {
    fn render(&self, title: &str, _width: usize) -> Option<String> {
        Some(title.to_string())
    }
}
