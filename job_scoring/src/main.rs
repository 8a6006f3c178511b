use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use job_scoring::{
    api::ApiClient,
    config::{self, ClientConfig},
    utils, FileHandle, JobAnalyzer, JobEditor, JobsService,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage job postings and their candidate files", long_about = None)]
struct Args {
    /// Base URL of the recruiting API
    #[arg(long, env = "JOBS_API_URL", global = true)]
    api_url: Option<String>,

    /// Bearer token for the recruiting API
    #[arg(long, env = "JOBS_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List jobs
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
    /// Show one job
    Show {
        id: String,
        /// Also export the job as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Create a job, uploading the given files
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },
    /// Edit a job
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Files to attach
        #[arg(short, long)]
        attach: Vec<PathBuf>,
        /// Attachment ids (as printed by `show`) to remove
        #[arg(short, long)]
        remove: Vec<u32>,
    },
    /// Delete a job
    Delete { id: String },
    /// Extract requirements from a job description
    Analyse {
        id: String,
        /// Write the analysis to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut cfg = config::load()?;
    if let Some(url) = &args.api_url {
        cfg.api_url = ClientConfig::new(url)?.api_url;
    }
    if args.token.is_some() {
        cfg = cfg.with_token(args.token.clone());
    }
    debug!(api = %cfg.api_url, "using recruiting API");

    let api = Arc::new(ApiClient::new(&cfg)?);
    let editor = JobEditor::new(api.clone(), api.clone()).with_upload_concurrency(cfg.upload_concurrency);

    match args.command {
        Command::List { skip, limit } => {
            let page = api.read_jobs(skip, limit).await?;
            if page.data.is_empty() {
                println!("No jobs yet.");
            }
            for job in &page.data {
                println!(
                    "{}\t{}\t{}",
                    job.id,
                    job.title,
                    job.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("N/A")
                );
            }
            println!("{} of {} jobs", page.data.len(), page.count);
        }
        Command::Show { id, json } => {
            let snapshot = editor.load(&id).await?;
            print_job(&snapshot);
            if let Some(path) = json {
                utils::save_json(&utils::export_envelope(&snapshot), &path)?;
            }
        }
        Command::Create {
            title,
            description,
            files,
        } => {
            editor.set_title(title).await?;
            editor.set_description(description).await?;
            editor.attach_files(read_files(&files).await?).await?;
            let job = editor.save().await?;
            println!("✅ Created job {}", job.id);
            print_job(&editor.snapshot().await);
        }
        Command::Edit {
            id,
            title,
            description,
            attach,
            remove,
        } => {
            editor.load(&id).await?;
            editor.enter_edit().await?;
            if let Some(title) = title {
                editor.set_title(title).await?;
            }
            if let Some(description) = description {
                editor.set_description(description).await?;
            }
            for file_id in remove {
                if !editor.remove_file(file_id).await? {
                    eprintln!("⚠️ Job {id} has no attachment {file_id}");
                }
            }
            editor.attach_files(read_files(&attach).await?).await?;
            editor.save().await?;
            println!("✅ Updated job {id}");
            print_job(&editor.snapshot().await);
        }
        Command::Delete { id } => {
            let message = api.delete_job(&id).await?;
            println!("✅ {}", message.message);
        }
        Command::Analyse { id, out } => {
            let snapshot = editor.load(&id).await?;
            let analysis = api
                .analyse_job(&snapshot.committed.title, &snapshot.committed.description)
                .await?;
            let text = utils::render_analysis(&snapshot.committed.title, &analysis);
            match out {
                Some(path) => utils::save_text(&text, &path)?,
                None => print!("{text}"),
            }
        }
    }

    Ok(())
}

async fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<FileHandle>> {
    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no usable file name", path.display()))?;
        handles.push(FileHandle::new(name, bytes));
    }
    Ok(handles)
}

fn print_job(snapshot: &job_scoring::EditorSnapshot) {
    let job = &snapshot.committed;
    println!("ID:          {}", snapshot.job_id.as_deref().unwrap_or("(unsaved)"));
    println!("Title:       {}", job.title);
    println!(
        "Description: {}",
        if job.description.is_empty() { "N/A" } else { job.description.as_str() }
    );
    if job.files.is_empty() {
        println!("Files:       none");
    }
    for file in &job.files {
        println!("  [{}] {}", file.id, file.name);
    }
}
