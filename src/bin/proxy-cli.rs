use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Management CLI for the lb-proxy admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8081")]
    url: String,

    /// Bearer token, if the admin API has an api_key configured.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show strategy and per-backend status
    Status,
    /// Register a backend (starts alive)
    Add {
        url: String,
        #[arg(short, long)]
        weight: Option<u32>,
    },
    /// Unregister a backend
    Remove { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let base = cli.url.trim_end_matches('/');
    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", base))
                .headers(headers)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Add { url, weight } => {
            let mut body = json!({ "url": url });
            if let Some(weight) = weight {
                body["weight"] = json!(weight);
            }
            let res = client
                .post(format!("{}/admin/backends", base))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_text(res).await?;
        }
        Commands::Remove { url } => {
            let res = client
                .delete(format!("{}/admin/backends", base))
                .headers(headers)
                .json(&json!({ "url": url }))
                .send()
                .await?;
            print_text(res).await?;
        }
    }

    Ok(())
}

async fn check(res: reqwest::Response) -> Result<Option<reqwest::Response>, Box<dyn std::error::Error>> {
    let status = res.status();
    if status.is_success() {
        return Ok(Some(res));
    }
    eprintln!("Error: Admin API returned status {}", status);
    if let Ok(text) = res.text().await {
        eprintln!("Response: {}", text);
    }
    Ok(None)
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(res) = check(res).await? {
        let json: Value = res.json().await?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(res) = check(res).await? {
        println!("{}", res.text().await?);
    }
    Ok(())
}
