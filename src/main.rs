//! `ai-alert`: troubleshooting assistant for general infrastructure alerts

use ai_alert::classifier::Taxonomy;
use ai_alert::{cli, logging};

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run(Taxonomy::General).await {
        logging::log_error(&e.to_string());
        std::process::exit(1);
    }
}
