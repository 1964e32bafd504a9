use env_logger::{Builder, Env};

pub fn init() {
    // SWIPECTL_LOG=debug swipectl run
    let env = Env::new()
        .filter_or("SWIPECTL_LOG", "info")
        .write_style("SWIPECTL_LOG_STYLE");
    let _ = Builder::from_env(env).format_timestamp_millis().try_init();
}
