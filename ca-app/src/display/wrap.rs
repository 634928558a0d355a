//! Word wrapping for transcript output.
//!
//! Every input line wraps on its own: blank lines stay blank and lines are
//! never joined or reordered. Widths are measured with ANSI escapes ignored,
//! so painted labels wrap like plain text.

use console::measure_text_width;

pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push(String::new());
        } else if measure_text_width(line) <= width {
            out.push(line.trim_end().to_string());
        } else {
            wrap_line(line, width, &mut out);
        }
    }
    out.join("\n")
}

fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    // Keep list indentation only while it leaves room for the text.
    let indent = if measure_text_width(indent) * 2 > width {
        ""
    } else {
        indent
    };
    let avail = width - measure_text_width(indent);

    let mut current = String::new();
    let mut current_width = 0;
    for word in body.split_whitespace() {
        let word_width = measure_text_width(word);
        if !current.is_empty() && current_width + 1 + word_width <= avail {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
            continue;
        }
        if !current.is_empty() {
            out.push(format!("{indent}{current}"));
            current.clear();
            current_width = 0;
        }
        if word_width <= avail {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        let mut pieces = split_to_width(word, avail);
        if let Some(last) = pieces.pop() {
            for piece in pieces {
                out.push(format!("{indent}{piece}"));
            }
            current_width = measure_text_width(&last);
            current = last;
        }
    }
    if !current.is_empty() {
        out.push(format!("{indent}{current}"));
    }
}

fn split_to_width(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_width = 0;
    let mut buf = [0u8; 4];
    for ch in word.chars() {
        let ch_width = measure_text_width(ch.encode_utf8(&mut buf));
        if !piece.is_empty() && piece_width + ch_width > width {
            pieces.push(std::mem::take(&mut piece));
            piece_width = 0;
        }
        piece.push(ch);
        piece_width += ch_width;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lines_are_untouched() {
        assert_eq!(wrap_text("hello world", 40), "hello world");
    }

    #[test]
    fn long_lines_break_at_word_boundaries() {
        let wrapped = wrap_text("one two three four five six", 10);
        assert_eq!(wrapped, "one two\nthree four\nfive six");
        assert!(wrapped.lines().all(|l| measure_text_width(l) <= 10));
    }

    #[test]
    fn blank_lines_are_preserved() {
        let wrapped = wrap_text("first paragraph\n\nsecond paragraph", 40);
        assert_eq!(wrapped, "first paragraph\n\nsecond paragraph");
        let lines: Vec<&str> = wrapped.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "");
    }

    #[test]
    fn whitespace_only_lines_become_blank() {
        assert_eq!(wrap_text("a\n   \nb", 40), "a\n\nb");
    }

    #[test]
    fn fitting_lines_keep_their_spacing() {
        assert_eq!(wrap_text("  /help      show help", 40), "  /help      show help");
    }

    #[test]
    fn lines_are_never_merged() {
        assert_eq!(wrap_text("a\nb\nc", 40), "a\nb\nc");
    }

    #[test]
    fn overlong_words_are_split() {
        assert_eq!(wrap_text("abcdefghij", 4), "abcd\nefgh\nij");
        assert_eq!(wrap_text("x abcdefghij y", 4), "x\nabcd\nefgh\nij y");
    }

    #[test]
    fn indentation_is_kept_on_continuation_lines() {
        assert_eq!(
            wrap_text("  - send the weekly report", 14),
            "  - send the\n  weekly\n  report"
        );
    }

    #[test]
    fn ansi_escapes_do_not_count_toward_width() {
        let label = console::style("Assistant:").red().force_styling(true).to_string();
        let wrapped = wrap_text(&format!("{label} ok then"), 18);
        let plain = console::strip_ansi_codes(&wrapped).to_string();
        assert_eq!(plain, "Assistant: ok then");
    }

    #[test]
    fn zero_width_is_treated_as_one_column() {
        assert_eq!(wrap_text("ab", 0), "a\nb");
    }
}
