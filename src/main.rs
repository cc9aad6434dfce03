mod app;
mod data;

use std::env;
use std::path::PathBuf;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    // Optional positional argument: the directory holding the city CSVs.
    let data_dir = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    app::run(&data_dir)
}
