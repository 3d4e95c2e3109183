use clap::Parser;
use miette::Result;
use riskreg::cli::commands::{
    add, analysis, catalog, completions, edit, export, import, indicators, init, list, plan,
    sensitivity,
};
use riskreg::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`riskreg list | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Init(args) => init::run(args, &global),
        Commands::Add(args) => add::run(args, &global),
        Commands::List(args) => list::run_list(args, &global),
        Commands::Show(args) => list::run_show(args, &global),
        Commands::Set(args) => edit::run_set(args, &global),
        Commands::Delete(args) => edit::run_delete(args, &global),
        Commands::Sensitivity(args) => sensitivity::run(args, &global),
        Commands::Qualitative(args) => analysis::run_qualitative(args, &global),
        Commands::Quantitative(args) => analysis::run_quantitative(args, &global),
        Commands::Prevention(args) => plan::run_prevention(args, &global),
        Commands::Mitigation(args) => plan::run_mitigation(args, &global),
        Commands::Import(args) => import::run(args, &global),
        Commands::Export(args) => export::run(args, &global),
        Commands::Indicators(args) => indicators::run(args, &global),
        Commands::Catalog(cmd) => catalog::run(cmd, &global),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Log to stderr; `RISKREG_LOG` takes precedence over `--verbose`
fn init_logging(global: &GlobalOpts) {
    let default_level = if global.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RISKREG_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("riskreg={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
