use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Timestamped console logging, Info by default; `RUST_LOG` raises it.
pub fn init() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}
