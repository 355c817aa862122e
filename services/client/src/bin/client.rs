//! services/client/src/bin/client.rs

use clap::{Args, Parser, Subcommand};
use client_lib::{
    adapters::{HttpBackendAdapter, JsonFileProjectStore, SimulatedResponder},
    chat::{ChatController, SubmitOutcome},
    config::Config,
    error::ClientError,
    novel::NovelWriter,
    settings::{ProbeStatus, SettingsProbe},
};
use openhands_client_core::domain::{Message, MessageKind, MessageRole};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "client", about = "Terminal client for an OpenHands backend")]
struct Cli {
    /// Overrides NEXT_PUBLIC_API_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat session. Type `/quit` to leave.
    Chat,
    /// Loads the backend config and checks health.
    Settings,
    /// Runs only the health check.
    TestConnection,
    Novel(NovelCommand),
}

#[derive(Args, Debug)]
struct NovelCommand {
    #[command(subcommand)]
    command: NovelSubcommand,
}

#[derive(Subcommand, Debug)]
enum NovelSubcommand {
    List,
    New {
        #[arg(long)]
        title: Option<String>,
    },
    AddChapter {
        project_id: String,
    },
    /// Replaces a chapter's text.
    Write {
        project_id: String,
        chapter_id: String,
        text: String,
    },
    /// Drafts text from a prompt. With `--chapter`, the draft is saved into it.
    Generate {
        prompt: String,
        #[arg(long, requires = "chapter")]
        project: Option<String>,
        #[arg(long, requires = "project")]
        chapter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url.trim_end_matches('/').to_string();
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(
        "Configuration loaded ({:?}, backend {}).",
        config.environment, config.api_base_url
    );

    // --- 2. Initialize Service Adapters ---
    let backend = Arc::new(HttpBackendAdapter::from_config(&config)?);

    // --- 3. Dispatch ---
    match cli.command {
        Command::Chat => run_chat(&config, backend).await,
        Command::Settings => {
            let mut probe = SettingsProbe::new(backend, config.api_base_url.clone())
                .with_ws_url(config.ws_url.clone());
            probe.mount().await;
            println!("{}", probe.report());
            Ok(())
        }
        Command::TestConnection => {
            let mut probe = SettingsProbe::new(backend, config.api_base_url.clone());
            match probe.test_connection().await {
                ProbeStatus::Success => println!("Connection OK ({})", config.api_base_url),
                _ => println!(
                    "Connection failed: {}",
                    probe.state().last_error.as_deref().unwrap_or("unknown error")
                ),
            }
            Ok(())
        }
        Command::Novel(novel) => {
            let store = Arc::new(JsonFileProjectStore::new(&config.novel_store_dir));
            let mut writer = NovelWriter::new(store, backend);
            writer.load().await?;
            run_novel(&mut writer, novel.command).await
        }
    }
}

async fn run_chat(config: &Config, backend: Arc<HttpBackendAdapter>) -> Result<(), ClientError> {
    let responder = Arc::new(SimulatedResponder::new(config.reply_delay));
    let controller = ChatController::new(backend, responder);
    let session = controller.session();

    println!(
        "{} (backend: {}, live updates: {})",
        config.app_name, config.api_base_url, config.ws_url
    );
    println!("Type a message and press Enter. `/quit` exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }
        if controller.send(&line).await == SubmitOutcome::Empty {
            continue;
        }

        let session = session.lock().await;
        // The user's own line is already on screen.
        for message in session.messages().iter().skip(shown + 1) {
            print_message(message);
        }
        shown = session.messages().len();
    }
    Ok(())
}

fn print_message(message: &Message) {
    let who = match (message.role(), message.kind()) {
        (_, MessageKind::Error) => "error",
        (MessageRole::Assistant, _) => "assistant",
        (role, _) => role.as_str(),
    };
    println!(
        "[{} {}] {}",
        message.timestamp().format("%H:%M"),
        who,
        message.content()
    );
}

async fn run_novel(writer: &mut NovelWriter, command: NovelSubcommand) -> Result<(), ClientError> {
    match command {
        NovelSubcommand::List => {
            if writer.projects().is_empty() {
                println!("No projects yet.");
            }
            for project in writer.projects() {
                println!(
                    "{}  {} [{}] {} chapters, {} words, created {}",
                    project.id,
                    project.title,
                    project.genre,
                    project.chapters.len(),
                    project.total_words,
                    project.created_at.format("%Y-%m-%d")
                );
                for chapter in &project.chapters {
                    println!("    {}  {} ({} words)", chapter.id, chapter.title, chapter.word_count);
                }
            }
            return Ok(());
        }
        NovelSubcommand::New { title } => {
            let id = writer.create_project().id.clone();
            if let Some(title) = title {
                writer.rename_project(&title)?;
            }
            println!("Created project {id}");
        }
        NovelSubcommand::AddChapter { project_id } => {
            writer.open_project(&project_id)?;
            let chapter = writer.add_chapter()?;
            println!("Added {} ({})", chapter.title, chapter.id);
        }
        NovelSubcommand::Write {
            project_id,
            chapter_id,
            text,
        } => {
            writer.open_project(&project_id)?;
            writer.update_chapter_content(&chapter_id, &text)?;
        }
        NovelSubcommand::Generate {
            prompt,
            project,
            chapter,
        } => {
            let Some(draft) = writer.generate_with_ai(&prompt).await else {
                println!("Enter a prompt to generate content.");
                return Ok(());
            };
            println!("{draft}");
            match (project, chapter) {
                (Some(project_id), Some(chapter_id)) => {
                    writer.open_project(&project_id)?;
                    writer.update_chapter_content(&chapter_id, &draft)?;
                }
                _ => return Ok(()),
            }
        }
    }
    writer.save().await?;
    Ok(())
}
