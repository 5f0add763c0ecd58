use chrono::Local;
use env_logger::{Builder, Target};
use log::Level;
use std::io::Write;

/// 控制台日志初始化：默认 info 级别，可用 RUST_LOG 覆盖，输出到 stdout
pub fn init_logger() {
    // 重复初始化不是致命错误，但要让调用方看到
    if let Err(e) = builder().try_init() {
        eprintln!("Logger initialisation failed: {}", e);
    }
}

fn builder() -> Builder {
    let mut builder = Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.target(Target::Stdout).format(|buf, record| {
        let time = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        writeln!(
            buf,
            "{}{} {:<5}\x1b[0m [{}:{}] {}",
            time,
            level_color(record.level()),
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args(),
        )
    });
    builder
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m\x1b[1m", // 红色
        Level::Warn => "\x1b[33m\x1b[1m",  // 黄色
        Level::Info => "\x1b[32m\x1b[1m",  // 绿色
        Level::Debug => "\x1b[36m\x1b[1m", // 青色
        Level::Trace => "\x1b[90m\x1b[1m", // 灰色
    }
}
