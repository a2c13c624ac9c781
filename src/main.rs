use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use worksim_core::{
    ChatRequest, ChatRole, ConversationTurn, Embedder, Provider, ScenarioRequest, VectorStore,
};
use worksim_llm::{
    ChatBackend, ClaudeBackend, GeminiBackend, LlmInvoker, OllamaBackend, OpenAiBackend,
    ProviderRegistry,
};
use worksim_rag::{ExtractorRegistry, HashEmbedder, LocalVectorStore, QdrantVectorStore};
use worksim_sim::SimulatorService;

mod ui;

#[derive(Parser)]
#[command(name = "worksim")]
#[command(about = "CS role-play training simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a document (pdf/txt/xlsx/xls) into a project's knowledge base
    Upload {
        #[arg(short, long)]
        project: String,
        #[arg(short, long)]
        user: Option<String>,
        /// Path of the file to ingest
        #[arg(short, long)]
        file: PathBuf,
        /// Percentage of chunks to embed (1-100)
        #[arg(long, default_value_t = 100)]
        embed_percentage: u8,
    },
    /// Search a project's knowledge base
    Search {
        #[arg(short, long)]
        project: String,
        #[arg(short, long)]
        user: Option<String>,
        query: String,
        #[arg(long, default_value_t = 3)]
        top_k: usize,
    },
    /// Generate a role-play scenario from stored context
    Scenario {
        #[arg(short, long)]
        project: String,
        #[arg(short, long)]
        user: Option<String>,
        #[arg(short, long, default_value = "gpt-4o")]
        model: String,
        #[arg(short, long)]
        guidelines: Option<String>,
    },
    /// Interactive training session: you answer as the employee, the model
    /// plays the customer and grades your replies
    Train {
        #[arg(short, long)]
        project: String,
        #[arg(short, long)]
        user: Option<String>,
        #[arg(short, long, default_value = "gpt-4o")]
        model: String,
        #[arg(short, long)]
        guidelines: Option<String>,
        /// Files to ingest before the session starts (useful with the
        /// in-memory store)
        #[arg(short, long)]
        ingest: Vec<PathBuf>,
    },
    /// Delete a project's unscoped knowledge base
    DeleteFiles {
        #[arg(short, long)]
        project: String,
    },
    /// Provider availability and local runtime reachability
    Health,
    /// List models installed in the local Ollama runtime
    Models,
}

/// API keys from the environment, under the provider labels the router
/// expects
fn api_keys_from_env() -> HashMap<String, String> {
    let mut keys = HashMap::new();
    for (env_var, label) in [
        ("OPENAI_API_KEY", "gpt"),
        ("GEMINI_API_KEY", "gemini"),
        ("ANTHROPIC_API_KEY", "claude"),
        ("PERPLEXITY_API_KEY", "perplexity"),
    ] {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                keys.insert(label.to_string(), value);
            }
        }
    }
    keys
}

/// Shares one Ollama client between the capability table and the
/// health/model-listing paths
struct LocalHandle(Arc<OllamaBackend>);

#[async_trait::async_trait]
impl ChatBackend for LocalHandle {
    async fn complete(
        &self,
        model: &str,
        api_key: Option<&str>,
        prompt: &str,
    ) -> worksim_core::Result<String> {
        self.0.complete(model, api_key, prompt).await
    }
}

fn build_invoker(local: Arc<OllamaBackend>) -> Result<Arc<LlmInvoker>> {
    let registry = ProviderRegistry::new()
        .with_backend(Provider::OpenAi, Arc::new(OpenAiBackend::new()?))
        .with_backend(Provider::Gemini, Arc::new(GeminiBackend::new()?))
        .with_backend(Provider::Claude, Arc::new(ClaudeBackend::new()?))
        .with_backend(Provider::Perplexity, Arc::new(OpenAiBackend::perplexity()?))
        .with_backend(Provider::Ollama, Arc::new(LocalHandle(local)));
    Ok(Arc::new(LlmInvoker::new(registry)))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("worksim=info")),
        )
        .init();

    let cli = Cli::parse();

    let local = Arc::new(OllamaBackend::from_env()?);
    let invoker = build_invoker(local.clone())?;
    let embedder = Arc::new(HashEmbedder::new());

    match std::env::var("WORKSIM_QDRANT_URL") {
        Ok(url) => {
            let store = Arc::new(QdrantVectorStore::new(&url, embedder.dimension())?);
            let service = SimulatorService::new(
                store,
                embedder,
                ExtractorRegistry::new(),
                invoker,
                Some(local),
            );
            run(service, cli.command).await
        }
        Err(_) => {
            let store = Arc::new(LocalVectorStore::new());
            let service = SimulatorService::new(
                store,
                embedder,
                ExtractorRegistry::new(),
                invoker,
                Some(local),
            );
            run(service, cli.command).await
        }
    }
}

async fn run<S: VectorStore, E: Embedder>(
    service: SimulatorService<S, E>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Upload {
            project,
            user,
            file,
            embed_percentage,
        } => {
            let receipt =
                upload_file(&service, &project, user.as_deref(), &file, embed_percentage).await?;
            println!(
                "{} {} 처리 완료: {}개 청크 임베딩 (file_id: {})",
                "✅".green(),
                file.display(),
                receipt.chunk_count,
                receipt.file_id
            );
        }
        Command::Search {
            project,
            user,
            query,
            top_k,
        } => {
            let results = service
                .search(&project, user.as_deref(), &query, top_k)
                .await?;
            if results.is_empty() {
                println!("{}", "검색 결과가 없습니다.".yellow());
            }
            for (i, text) in results.iter().enumerate() {
                println!("{} {}", format!("{}.", i + 1).cyan(), text);
            }
        }
        Command::Scenario {
            project,
            user,
            model,
            guidelines,
        } => {
            let scenario = service
                .generate_scenario(&ScenarioRequest {
                    project_id: project,
                    user_id: user,
                    model_id: model,
                    api_keys: Some(api_keys_from_env()),
                    guidelines,
                })
                .await?;
            print_scenario(&scenario);
        }
        Command::Train {
            project,
            user,
            model,
            guidelines,
            ingest,
        } => {
            for file in &ingest {
                let receipt = upload_file(&service, &project, user.as_deref(), file, 100).await?;
                println!(
                    "{} {} ({}개 청크)",
                    "✅".green(),
                    file.display(),
                    receipt.chunk_count
                );
            }
            train(&service, &project, user.as_deref(), &model, guidelines).await?;
        }
        Command::DeleteFiles { project } => {
            let outcome = service.delete_project_files(&project).await;
            if outcome.success {
                println!("{} {}", "✅".green(), outcome.message);
            } else {
                println!("{} {}", "⚠️".yellow(), outcome.message);
            }
        }
        Command::Health => {
            let health = service.health().await;
            println!("status: {}", health.status.green());
            println!(
                "local provider reachable: {}",
                if health.local_provider_reachable {
                    "yes".green()
                } else {
                    "no".red()
                }
            );
            for (provider, available) in &health.providers {
                let mark = if *available { "✅".green() } else { "❌".red() };
                println!("  {} {}", mark, provider);
            }
        }
        Command::Models => {
            let models = service.list_local_models().await;
            if let Some(error) = models.error {
                println!("{} {}", "⚠️".yellow(), error);
            }
            for model in models.models {
                println!("  {}", model);
            }
        }
    }

    Ok(())
}

async fn upload_file<S: VectorStore, E: Embedder>(
    service: &SimulatorService<S, E>,
    project: &str,
    user: Option<&str>,
    file: &PathBuf,
    embed_percentage: u8,
) -> Result<worksim_core::UploadReceipt> {
    let bytes = std::fs::read(file)?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(service
        .upload(project, user, &file_name, &bytes, embed_percentage)
        .await?)
}

fn print_scenario(scenario: &worksim_core::Scenario) {
    println!("{} {}", "상황:".bold(), scenario.situation);
    println!("{} {}", "고객 유형:".bold(), scenario.customer_type);
    println!("{} {}", "고객:".cyan().bold(), scenario.first_message);
}

async fn train<S: VectorStore, E: Embedder>(
    service: &SimulatorService<S, E>,
    project: &str,
    user: Option<&str>,
    model: &str,
    guidelines: Option<String>,
) -> Result<()> {
    ui::display_banner();

    let api_keys = api_keys_from_env();
    let scenario = service
        .generate_scenario(&ScenarioRequest {
            project_id: project.to_string(),
            user_id: user.map(|u| u.to_string()),
            model_id: model.to_string(),
            api_keys: Some(api_keys.clone()),
            guidelines: guidelines.clone(),
        })
        .await?;
    print_scenario(&scenario);
    println!();

    let mut history = vec![ConversationTurn {
        role: ChatRole::Customer,
        content: scenario.first_message.clone(),
    }];
    let mut input_history = Vec::new();
    let mut turn = 0u32;

    loop {
        let input = ui::input_with_history("직원>", &mut input_history)?;
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            println!("{}", "수고하셨습니다! 👋".green());
            break;
        }

        turn += 1;
        let outcome = service
            .chat(&ChatRequest {
                project_id: project.to_string(),
                conversation_id: format!("train-{}", turn),
                user_id: user.map(|u| u.to_string()),
                role: ChatRole::Employee,
                message: input.clone(),
                model_id: model.to_string(),
                api_keys: Some(api_keys.clone()),
                guidelines: guidelines.clone(),
                history: Some(history.clone()),
            })
            .await?;

        if let Some(evaluation) = &outcome.evaluation {
            println!(
                "{} {}/{}",
                "평가:".bold(),
                evaluation.score.to_string().yellow().bold(),
                evaluation.max_score
            );
            println!("{}", evaluation.feedback.dimmed());
        }
        println!("{} {}", "고객:".cyan().bold(), outcome.response);
        println!();

        history.push(ConversationTurn {
            role: ChatRole::Employee,
            content: input,
        });
        history.push(ConversationTurn {
            role: ChatRole::Customer,
            content: outcome.response,
        });
    }

    Ok(())
}
