use std::path::PathBuf;

use clap::Parser;
use docqa::{app::Session, config, logging, qa::QaService, ui};

#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Answer natural-language questions over a folder of PDFs")]
#[command(version)]
struct Cli {
    /// Directory of PDF files to index (defaults to CORPUS_DIR).
    #[arg(long)]
    corpus_dir: Option<PathBuf>,

    /// Build the index, answer a single question, and exit without the menu.
    #[arg(long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_config();
    logging::init_tracing();

    let cli = Cli::parse();
    let corpus_dir = ui::resolve_corpus_dir(cli.corpus_dir, &config::get_config().corpus_dir);
    let mut session = Session::new(QaService::new());

    match cli.question {
        Some(question) => {
            let report = session.build_from_directory(&corpus_dir).await?;
            tracing::info!(
                files = report.files,
                pages = report.pages,
                chunks = report.chunks,
                "Index built"
            );
            let answer = session.ask(&question).await?;
            println!("{}", answer.answer_text);
        }
        None => ui::run(&mut session, &corpus_dir).await?,
    }

    Ok(())
}
