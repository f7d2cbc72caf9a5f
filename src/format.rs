use colored::Colorize;

use crate::message::{Message, Sender};

/// Format a message for terminal display with sender label, time and colors.
pub fn format_message(msg: &Message) -> String {
    let label = format_sender_label(msg.sender());
    let time = msg.sent_at().format("%H:%M").to_string();
    let body = match msg.sender() {
        Sender::User => msg.text().to_string(),
        Sender::Bot => render_markdown_lite(msg.text()),
    };
    format!("{} {}\n{}", label, time.dimmed(), body)
}

fn format_sender_label(sender: Sender) -> String {
    let label = format!("{}:", sender);
    match sender {
        Sender::User => label.green().bold().to_string(),
        Sender::Bot => label.cyan().bold().to_string(),
    }
}

/// Minimal markdown renderer for terminal output.
/// Not a full parser. Handles what order summaries use:
/// **bold**, `inline code`, and `-`/`*` bullet lines.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        let bullet = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "));

        match bullet {
            Some(item) => {
                output.push_str(indent);
                output.push_str(&format!("{} {}", "•".cyan(), render_inline(item)));
            }
            None => output.push_str(&render_inline(line)),
        }
        output.push('\n');
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        if i + 1 < len && chars[i] == '*' && chars[i + 1] == '*' {
            if let Some(end) = find_closing(&chars, i + 2, "**") {
                let bold_text: String = chars[i + 2..end].iter().collect();
                result.push_str(&bold_text.bold().to_string());
                i = end + 2;
                continue;
            }
        }

        if chars[i] == '`' {
            if let Some(end) = find_closing_char(&chars, i + 1, '`') {
                let code_text: String = chars[i + 1..end].iter().collect();
                result.push_str(&code_text.dimmed().to_string());
                i = end + 1;
                continue;
            }
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

fn find_closing(chars: &[char], start: usize, pattern: &str) -> Option<usize> {
    let pat: Vec<char> = pattern.chars().collect();
    if chars.len() < pat.len() {
        return None;
    }
    (start..=chars.len() - pat.len()).find(|&i| chars[i..i + pat.len()] == pat[..])
}

fn find_closing_char(chars: &[char], start: usize, ch: char) -> Option<usize> {
    (start..chars.len()).find(|&i| chars[i] == ch)
}
