use chrono::Local;
use env_logger::fmt::{Color, Formatter, Style};
use log::Level;

use std::io::Write;

const DATE_COLOR: Color = Color::Rgb(91, 24, 128);
const DATE_BG: Color = Color::Rgb(255, 255, 255);
const TARGET_COLOR: Color = Color::Rgb(128, 24, 60);

/// Installs the colored `<date> <LEVEL> <target>: <msg>` logger.
///
/// `RUST_LOG` still wins over the default level when it is set.
pub fn init_logger() {
    let mut bui = env_logger::builder();
    let bui = bui.format(|buf, record| {
        let date_style = bold(buf, DATE_COLOR, Some(DATE_BG));
        let level_style = bold(buf, level_color(record.level()), None);
        let target_style = bold(buf, TARGET_COLOR, None);

        writeln!(
            buf,
            "{} {} {}: {}",
            date_style.value(Local::now().format("%Y-%m-%d %H:%M:%S")),
            level_style.value(record.level()),
            target_style.value(record.target()),
            record.args()
        )
    });

    bui.filter_level(if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });

    if let Ok(filters) = std::env::var("RUST_LOG") {
        bui.parse_filters(&filters);
    }

    // a second init (tests, embedding) keeps the first logger
    let _ = bui.try_init();
}

fn bold(buf: &Formatter, fg: Color, bg: Option<Color>) -> Style {
    let mut style = buf.style();
    style.set_color(fg).set_bold(true);
    if let Some(bg) = bg {
        style.set_bg(bg);
    }
    style
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Magenta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_test() {
        init_logger();
        init_logger();

        log::info!("logger still usable");
    }
}
