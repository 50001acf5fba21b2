use clap::Parser;
use stackctl::utils::{logger, validation::Validate};
use stackctl::{
    CliConfig, HttpHealthProbe, Planner, ProcessRunner, StackEngine, StackError,
    StdinConfirmation,
};

async fn run(cli: &CliConfig) -> stackctl::Result<()> {
    let config = cli.load_stack_config()?;
    config.validate()?;

    let (variables, targets) = cli.resolve(&config)?;
    variables.validate()?;
    tracing::debug!("Resolved variables: {:?}", variables);

    let probe = HttpHealthProbe::new(config.health.timeout())?;
    let engine = StackEngine::new(ProcessRunner::new(), StdinConfirmation, probe)
        .with_options(cli.engine_options());

    let planner = Planner::new(&config, &variables);
    for target in targets {
        let plan = planner.plan(target)?;
        engine.run(&plan).await?;
    }
    Ok(())
}

fn report(e: &StackError) {
    tracing::error!(
        "❌ stackctl failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli).await {
        report(&e);
        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}
