use clap::Parser;
use miette::Result;
use metalcloud::cli::commands::{self, completions};
use metalcloud::cli::terminal::Terminal;
use metalcloud::cli::{Cli, Commands};
use metalcloud::core::logging::init_logging;
use metalcloud::core::{ApiClient, CliError, Config};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
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
    init_logging(cli.global.verbose);

    // Completions need neither config nor an API client
    let command = match cli.command {
        Commands::Completions(args) => {
            print_output(&completions::run(args)?);
            return Ok(());
        }
        command => command,
    };

    let config = Config::load();
    let format = config.effective_format(cli.global.format)?;
    let client = ApiClient::new(&config).map_err(CliError::from)?;
    let mut terminal = Terminal::stdio();

    let output = commands::run(command, format, &client, &mut terminal)?;
    print_output(&output);

    Ok(())
}

fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
}
