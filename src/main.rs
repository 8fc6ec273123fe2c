use nimbuscli::cli::execute_command;
use nimbuscli::configuration::Configuration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let configuration = match Configuration::load_or_create_default() {
        Ok(configuration) => configuration,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(exitcode::CONFIG);
        }
    };

    if let Err(e) = execute_command(configuration).await {
        eprintln!("ERROR: {}", e);
        std::process::exit(e.exit_code().code());
    }
}
