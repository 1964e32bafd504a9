mod actions;
mod cli;
mod config;
mod dispatch;
mod input;
mod logging;
mod pipeline;
mod tracker;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
