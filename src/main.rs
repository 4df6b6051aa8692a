use anyhow::Result;
use clap::Parser;
use dc_update::cli::UpdateArgs;
use dc_update::cli::update;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dc-update",
    version,
    about = "Atualiza apenas os containers docker-compose que têm imagem mais nova",
    long_about = "Baixa a imagem de cada serviço, compara o digest com o do container em execução \
                  e recria somente os containers desatualizados."
)]
struct Cli {
    #[command(flatten)]
    update: UpdateArgs,

    /// Aumenta o nível de log (-v, -vv, -vvv); DC_UPDATE_LOG tem precedência
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "off",
        1 => "dc_update=info",
        2 => "dc_update=debug",
        _ => "dc_update=trace",
    };
    let filter = EnvFilter::try_from_env("DC_UPDATE_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    update::run(&cli.update)?;

    Ok(())
}
