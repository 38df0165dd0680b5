use energy_advisor::{build_generator, config::AdvisorConfig, ConversationEngine, ConversationState};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Terminal chat over stdin/stdout; the state lives in this loop.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the dialogue
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();

    let config = AdvisorConfig::from_env()?;
    let generator = Arc::new(build_generator(&config)?);
    let engine = ConversationEngine::new(generator);

    info!("Energy Advisor chat starting");

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all("Asistente de consumo energético. Escribe \"hola\" para empezar (Ctrl-D para salir).\n".as_bytes())
        .await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut state = ConversationState::new();

    while let Some(line) = lines.next_line().await? {
        let outcome = engine.handle_turn(state, &line)?;
        state = outcome.state;

        stdout.write_all(outcome.reply.as_bytes()).await?;
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
