use clap::{Parser, Subcommand};
use rfid_bridge::app::App;
use rfid_bridge::config::{BridgeConfig, BridgeMode};
use rfid_bridge::http::{cgi, server};
use rfid_bridge::services::request::IncomingRequest;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rfid-bridge", version, about = "HTTP bridge to the RFID reader control program")]
struct Cli {
    /// Response mode; overrides RFID_BRIDGE_MODE.
    #[arg(long, value_enum, global = true)]
    mode: Option<BridgeMode>,
    /// Launcher executable; overrides RFID_BRIDGE_PROGRAM.
    #[arg(long, global = true)]
    program: Option<String>,
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,
    /// 0 waits forever.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[arg(long, global = true)]
    max_capture_bytes: Option<usize>,
    #[arg(long, global = true)]
    actions_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve HTTP requests until Ctrl-C.
    Serve {
        #[arg(long)]
        listen: Option<String>,
    },
    /// Handle one CGI request from the environment and stdin.
    Cgi,
    /// Run one query string, e.g. "action=write-epc&epc=E200001A".
    Query { query: String },
    /// Print the active action registry.
    Actions,
}

impl Cli {
    fn apply(&self, config: &mut BridgeConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(program) = &self.program {
            config.launcher.program = program.clone();
        }
        if let Some(dir) = &self.work_dir {
            config.work_dir = dir.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(bytes) = self.max_capture_bytes {
            config.max_capture_bytes = bytes;
        }
        if let Some(path) = &self.actions_file {
            config.actions_file = Some(path.clone());
        }
        if let Command::Serve {
            listen: Some(listen),
        } = &self.command
        {
            config.listen = listen.clone();
        }
    }
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let mut config = BridgeConfig::from_env()?;
    cli.apply(&mut config);
    let app = Arc::new(App::initialize(config)?);

    match cli.command {
        Command::Serve { .. } => {
            let addr = server::resolve_bind_address(&app.config.listen, app.config.mode)?;
            let listener = tokio::net::TcpListener::bind(addr).await?;
            server::serve(app, listener, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;
            Ok(true)
        }
        Command::Cgi => {
            let env = cgi::CgiEnv::from_env();
            // CGI exits 0 once a reply is written.
            cgi::run(&app, &env, tokio::io::stdin(), tokio::io::stdout()).await?;
            Ok(true)
        }
        Command::Query { query } => {
            let response = app.bridge.respond(IncomingRequest::from_query(&query)).await;
            println!("{}", response.to_json_pretty());
            Ok(response.ok)
        }
        Command::Actions => {
            println!("{}", serde_json::to_string_pretty(&app.registry.to_json())?);
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() {
    match run(Cli::parse()).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("rfid-bridge: {}", err);
            std::process::exit(2);
        }
    }
}
