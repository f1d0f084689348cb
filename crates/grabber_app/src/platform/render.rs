use grabber_core::{ProgressMode, ProgressView};

const BAR_WIDTH: usize = 30;
const BUSY_BLOCK: usize = 6;

/// One terminal line for `view`. `tick` drives the busy animation.
pub fn render_line(view: &ProgressView, tick: usize) -> String {
    let bar = match view.mode {
        ProgressMode::Determinate => determinate_bar(view.percent),
        ProgressMode::Busy => busy_bar(tick),
    };
    let mut line = format!("[{bar}] {:>3}% {}", view.percent, view.status);
    if !view.size_text.is_empty() {
        line.push_str("  ");
        line.push_str(&view.size_text);
    }
    // Pad so a shorter line fully overwrites the previous one.
    format!("{line:<80}")
}

fn determinate_bar(percent: u8) -> String {
    let filled = BAR_WIDTH * usize::from(percent.min(100)) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn busy_bar(tick: usize) -> String {
    let span = BAR_WIDTH - BUSY_BLOCK;
    let cycle = tick % (2 * span);
    let offset = if cycle <= span { cycle } else { 2 * span - cycle };
    format!(
        "{}{}{}",
        "-".repeat(offset),
        "=".repeat(BUSY_BLOCK),
        "-".repeat(span - offset)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinate_bar_fills_proportionally() {
        let view = ProgressView {
            percent: 50,
            status: "Downloading… (1.00 MiB/s)".to_string(),
            size_text: "10.00 MiB / 5.00 MiB".to_string(),
            ..ProgressView::default()
        };
        let line = render_line(&view, 0);
        assert!(line.starts_with(&format!("[{}{}]  50%", "#".repeat(15), "-".repeat(15))));
        assert!(line.contains("10.00 MiB / 5.00 MiB"));
    }

    #[test]
    fn busy_block_bounces_within_bar() {
        for tick in 0..100 {
            let bar = busy_bar(tick);
            assert_eq!(bar.chars().count(), BAR_WIDTH);
            assert_eq!(bar.matches('=').count(), BUSY_BLOCK);
        }
        assert!(busy_bar(0).starts_with("======"));
        assert!(busy_bar(BAR_WIDTH - BUSY_BLOCK).ends_with("======"));
    }
}
