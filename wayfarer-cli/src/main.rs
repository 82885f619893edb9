use clap::Parser;
use std::env;
use std::io::{self, BufRead, Write};
use wayfarer_agent::config::{
    API_URL_ENV, COUNTRY_FROM_ENV, CURRENCY_FROM_ENV, MODEL_ENV, TIMEOUT_ENV,
};
use wayfarer_agent::{AgentConfig, ToolAgent};

mod thinking;

use thinking::ThinkingDots;

const BANNER: &str = "Wayfarer travel assistant. Type 'exit' to quit.";
const RULE_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "wayfarer", version)]
#[command(about = "Wayfarer - travel currency assistant backed by a chat model")]
struct Cli {
    /// Chat endpoint URL (overrides PHI3_API_URL)
    #[arg(long)]
    api_url: Option<String>,
    /// Model name (overrides PHI3_MODEL_NAME)
    #[arg(long)]
    model: Option<String>,
    /// Country you travel from (overrides WAYFARER_COUNTRY_FROM)
    #[arg(long)]
    country_from: Option<String>,
    /// Currency code of the origin country (overrides WAYFARER_CURRENCY_FROM)
    #[arg(long)]
    currency_from: Option<String>,
    /// Model request timeout in seconds (overrides WAYFARER_LLM_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// Flag value for `name`, falling back to the environment.
    fn lookup(&self, name: &str) -> Option<String> {
        let flag = match name {
            API_URL_ENV => self.api_url.clone(),
            MODEL_ENV => self.model.clone(),
            COUNTRY_FROM_ENV => self.country_from.clone(),
            CURRENCY_FROM_ENV => self.currency_from.clone(),
            TIMEOUT_ENV => self.timeout_secs.map(|secs| secs.to_string()),
            _ => None,
        };
        flag.or_else(|| env::var(name).ok())
    }
}

fn init_logging(json: bool) {
    // Keep the console quiet unless RUST_LOG asks for more.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = match AgentConfig::from_lookup(|name| cli.lookup(name)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut agent = match ToolAgent::from_config(&config) {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise agent");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    run_console(&mut agent).await;
}

async fn run_console(agent: &mut ToolAgent) {
    let mut dots = ThinkingDots::new("Agent is thinking");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{}", BANNER);

    loop {
        print!("\nYou: ");
        let _ = stdout.flush();

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nBye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to read user input");
                break;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            println!("Bye!");
            break;
        }

        let outcome = {
            let _thinking = dots.guard();
            agent.run(input).await
        };

        match outcome {
            Ok(reply) => {
                println!("Agent: {}", reply);
                println!("{}", "_".repeat(RULE_WIDTH));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Model call failed");
                eprintln!("Error: {}", e);
            }
        }
    }
}
