use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = unified_fs::cli::parse();
    app::run(args)
}
