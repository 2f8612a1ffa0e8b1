//! agent-bootstrap - install and register the management agent

use agent_bootstrap::cli::Cli;
use agent_bootstrap::commands::exit_code;
use agent_bootstrap::output::{Outcome, OutputContext, logging};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level, &cli.log_file);
    let output = OutputContext::new(cli.result_format);

    let code = match cli.run().await {
        Ok(success) => {
            output.report(Outcome::Success, &success.message, &success.details);
            0
        }
        Err(err) => {
            let code = exit_code(&err);
            tracing::debug!(code, "run failed");
            output.report(Outcome::Failed, &format!("{err:#}"), "");
            code
        }
    };
    std::process::exit(code);
}
