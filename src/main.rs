use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use event_survey::client::{
    FileStore, MemoryStore, Messages, PreferenceStore, SubmitClient, SurveyForm, Translations,
};
use event_survey::github::{client::DEFAULT_API_URL, export_records, GithubClient};
use event_survey::model::Question;
use event_survey::report::write_records;
use event_survey::server::{self, config::ServerConfig};

#[derive(Parser)]
#[command(name = "event-survey")]
#[command(about = "Collect event survey responses as GitHub issues", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the submission API
    Serve {
        #[command(flatten)]
        config: ServerConfig,
    },

    /// Fill in the survey and post it to a running server
    Submit {
        /// Submission endpoint
        #[arg(long, env = "SURVEY_ENDPOINT", default_value = "http://localhost:8787/api/submit")]
        endpoint: String,

        /// Prefill query string, e.g. "lang=ja&q02=A"
        #[arg(long)]
        query: Option<String>,

        /// Player name
        #[arg(long)]
        name: Option<String>,

        /// Language code (overrides the query and the saved preference)
        #[arg(long)]
        lang: Option<String>,

        /// Answer to Q2 (preferred time window)
        #[arg(long)]
        q02: Option<String>,

        /// Answer to Q3 (preferred duration)
        #[arg(long)]
        q03: Option<String>,

        /// Answer to Q4 (preferred day)
        #[arg(long)]
        q04: Option<String>,

        /// Translations TSV file
        #[arg(long)]
        translations: Option<PathBuf>,

        /// JSON file remembering the chosen language
        #[arg(long)]
        prefs: Option<PathBuf>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },

    /// Export stored submissions from GitHub issues as CSV
    Export {
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: String,

        #[arg(long, env = "GITHUB_OWNER")]
        github_owner: String,

        #[arg(long, env = "GITHUB_REPO")]
        github_repo: String,

        #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
        github_api_url: String,

        /// Output CSV file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            server::serve(config).await.context("Server failed")?;
        }
        Commands::Submit {
            endpoint,
            query,
            name,
            lang,
            q02,
            q03,
            q04,
            translations,
            prefs,
            timeout_secs,
        } => {
            let answers = [
                (Question::Q2Time, q02),
                (Question::Q3Time, q03),
                (Question::Q4Day, q04),
            ];
            submit(
                &endpoint,
                query.as_deref().unwrap_or(""),
                name,
                lang,
                answers,
                translations,
                prefs,
                Duration::from_secs(timeout_secs),
            )
            .await?;
        }
        Commands::Export {
            github_token,
            github_owner,
            github_repo,
            github_api_url,
            output,
        } => {
            let client = GithubClient::new(
                &github_api_url,
                &github_owner,
                &github_repo,
                &github_token,
                Duration::from_secs(30),
            )
            .context("Failed to create GitHub client")?;

            let records = export_records(&client).await.context("Failed to export submissions")?;
            eprintln!("Exported {} submissions", records.len());

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_records(&records, file).context("Failed to write CSV")?;
                    eprintln!("Wrote {}", path.display());
                }
                None => {
                    write_records(&records, std::io::stdout().lock()).context("Failed to write CSV")?;
                }
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn submit(
    endpoint: &str,
    query: &str,
    name: Option<String>,
    lang: Option<String>,
    answers: [(Question, Option<String>); 3],
    translations: Option<PathBuf>,
    prefs_path: Option<PathBuf>,
    timeout: Duration,
) -> Result<()> {
    let mut prefs: Box<dyn PreferenceStore> = match &prefs_path {
        Some(path) => Box::new(FileStore::open(path)),
        None => Box::new(MemoryStore::default()),
    };

    // Missing translations only cost us the localized texts
    let translations = translations.and_then(|path| match Translations::load(&path) {
        Ok(t) => Some(t),
        Err(e) => {
            log::warn!("Could not load translations {}: {}", path.display(), e);
            None
        }
    });

    let mut form = SurveyForm::from_query(query, prefs.as_mut());
    if let Some(code) = lang {
        if !form.set_language(&code, prefs.as_mut()) {
            anyhow::bail!("Unsupported language: {}", code);
        }
    }
    if let Some(name) = name {
        form.player_name = name;
    }
    for (question, value) in answers {
        if let Some(value) = value {
            if !form.set_answer(question, &value) {
                anyhow::bail!("{} is not a valid answer to {}", value, question);
            }
        }
    }

    let language = form.language().to_string();
    let messages = Messages::new(translations.as_ref(), &language);
    let payload = form.begin_submit(&messages, Utc::now())?;

    let client = SubmitClient::new(endpoint, timeout).context("Invalid endpoint")?;
    let result = client.submit(&payload).await;
    form.finish(result.is_ok());

    let receipt = result?;
    println!("{}", messages.text("success", &receipt.message));
    if let Some(url) = receipt.issue_url {
        println!("{}", url);
    }

    Ok(())
}
