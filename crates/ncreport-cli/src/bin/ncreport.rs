fn main() -> anyhow::Result<()> {
    ncreport_cli::cli::run()
}
