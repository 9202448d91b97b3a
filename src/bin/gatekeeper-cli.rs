use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gatekeeper-cli")]
#[command(about = "Management CLI for the gatekeeper decision store", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8181")]
    url: String,

    #[arg(short, long)]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show snapshot summary
    Status,
    /// List refresh identifiers
    Identifiers,
    /// Run a refresh command, e.g. REFRESH_WHITE_LIST
    Refresh {
        identifier: String,
        args: Vec<String>,
    },
    /// Show the groups of a user
    Groups { user: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Identifiers => client.get(format!("{}/admin/refresh", cli.url)),
        Commands::Refresh { identifier, args } => client
            .post(format!("{}/admin/refresh/{}", cli.url, identifier))
            .json(&json!({ "args": args })),
        Commands::Groups { user } => client.get(format!("{}/admin/groups/{}", cli.url, user)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    // Refresh failures carry a JSON body worth showing.
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if !text.is_empty() => println!("{}", text),
        Err(_) => {}
    }

    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        std::process::exit(1);
    }
    Ok(())
}
