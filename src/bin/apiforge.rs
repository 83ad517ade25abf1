fn main() -> anyhow::Result<()> {
    apiforge::cli::run_cli()
}
