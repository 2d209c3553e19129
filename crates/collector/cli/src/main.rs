fn main() -> anyhow::Result<()> {
    collector_cli::run()?;
    Ok(())
}
