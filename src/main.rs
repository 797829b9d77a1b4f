fn main() -> anyhow::Result<()> {
    chainroute::cli::run_cli()
}
