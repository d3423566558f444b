fn main() -> anyhow::Result<()> {
    nucfreq::cli::run::entry()
}
