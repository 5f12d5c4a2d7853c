fn main() -> anyhow::Result<()> {
    handctl::logging::init();
    handctl::cli::run()
}
