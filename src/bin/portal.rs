//!
//! eoportal CLI binary
//! -------------------
//! Command-line tool and interactive interpreter for the EO portal API.
//! Recovers any stored session on start, supports sign-in/sign-out, session
//! status and authenticated requests against the portal endpoints.

use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use eoportal::api::PageFilter;
use eoportal::auth::{Credentials, HttpAuthBackend};
use eoportal::client::PortalClient;
use eoportal::config::PortalConfig;
use eoportal::session::{require_authentication, GuardOutcome, SessionManager};
use eoportal::token_store::TokenStore;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api-url <url>] [--cookie-file <path>] [--email <e>] [--user <u>] [--password <p>] [--keep-signed-in] [-c <command>]\n\nFlags:\n  --api-url <url>          Portal backend base URL (default: $EOPORTAL_API_URL or http://localhost:8080)\n  --cookie-file <path>     Cookie jar location (default: $EOPORTAL_COOKIE_FILE or .eoportal/cookies.json)\n  --email <e>              Sign in with this email before running commands\n  --user <u>               Username sent with the sign-in (default: the OS username)\n  --password <p>           Password for the sign-in\n  --keep-signed-in         Ask the backend for a refresh token and persist it\n  -c, --command <cmd>      Run a single interpreter command and exit\n  -h, --help               Show this help\n\nInteractive commands:\n  login <email> <password>   sign in (add 'keep' as a third word to stay signed in)\n  logout                     sign out and clear the local session\n  status                     show the current session snapshot\n  whoami                     show the signed-in user\n  refresh                    exchange the refresh cookie for a new access token\n  get <path>                 authenticated GET, prints the JSON response\n  noticias | publicacoes | favoritos | notificacoes | perfil\n  help                       show this help\n  quit | exit                leave the interpreter"
    );
}

fn main() -> Result<()> {
    println!(
        r"  ___  ___  ___  ___  ___ _____ _   _
 | __|/ _ \| _ \/ _ \| _ \_   _/_\ | |
 | _| | (_) |  _/ (_) |   / | |/ _ \| |__
 |___| \___/|_|  \___/|_|_\ |_/_/ \_\____|
        Portal Command Line Interface"
    );
    // Initialize tracing so session recovery warnings are visible on the command line
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut api_url: Option<String> = None;
    let mut cookie_file: Option<String> = None;
    let mut email: Option<String> = None;
    let mut user: Option<String> = None;
    let mut password: Option<String> = None;
    let mut keep_signed_in = false;
    let mut command: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api-url" => {
                if i + 1 >= args.len() { eprintln!("--api-url requires a value"); print_usage(&program); std::process::exit(2); }
                api_url = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--cookie-file" => {
                if i + 1 >= args.len() { eprintln!("--cookie-file requires a value"); print_usage(&program); std::process::exit(2); }
                cookie_file = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--email" => {
                if i + 1 >= args.len() { eprintln!("--email requires a value"); print_usage(&program); std::process::exit(2); }
                email = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--user" => {
                if i + 1 >= args.len() { eprintln!("--user requires a value"); print_usage(&program); std::process::exit(2); }
                user = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--password" => {
                if i + 1 >= args.len() { eprintln!("--password requires a value"); print_usage(&program); std::process::exit(2); }
                password = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--keep-signed-in" => { keep_signed_in = true; i += 1; continue; }
            "--command" | "-c" => {
                if i + 1 >= args.len() { eprintln!("--command requires a value"); print_usage(&program); std::process::exit(2); }
                command = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                if command.is_none() { command = Some(unk.to_string()); i += 1; continue; }
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let mut cfg = PortalConfig::from_env();
    if let Some(url) = api_url { cfg = cfg.with_api_url(url); }
    if let Some(path) = cookie_file { cfg = cfg.with_cookie_file(path); }

    let store = Arc::new(TokenStore::open(&cfg.cookie_file));
    let client = PortalClient::new(&cfg.api_url, Arc::clone(&store))
        .with_context(|| format!("invalid portal URL {}", cfg.api_url))?;
    let backend = Arc::new(HttpAuthBackend::new(client.clone()));
    let manager = SessionManager::new(store, backend);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    // Resolve the stored session before anything renders or runs
    let session = rt.block_on(manager.recover_user_information());
    match &session.user {
        Some(u) => println!("Recovered session: {} ({})", u.display_name, u.email),
        None => println!("No stored session (anonymous)"),
    }

    // Optional eager sign-in from flags
    if let (Some(email), Some(password)) = (email, password) {
        let username = user.unwrap_or_else(whoami::username);
        let creds = Credentials { email, password, username, keep_signed_in };
        match rt.block_on(manager.sign_in(creds)) {
            Ok(u) => println!("Signed in as {} ({})", u.display_name, u.id),
            Err(e) => eprintln!("sign-in failed: {}", e),
        }
    }

    if let Some(cmd) = command {
        run_command(&rt, &manager, &client, &cmd);
        return Ok(());
    }

    // Interactive interpreter
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("eoportal interpreter. Type 'help' for commands.");
    loop {
        input.clear();
        print!("> ");
        let _ = stdout.flush();
        if stdin.read_line(&mut input).is_err() { break; }
        let line = input.trim();
        if line.is_empty() { continue; }
        let up = line.to_uppercase();
        if up == "EXIT" || up == "QUIT" { break; }
        if up == "HELP" { print_usage(&program); continue; }
        run_command(&rt, &manager, &client, line);
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    println!("{}", pretty);
}

fn run_command(
    rt: &tokio::runtime::Runtime,
    manager: &SessionManager,
    client: &PortalClient,
    line: &str,
) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["login", email, password, rest @ ..] => {
            let creds = Credentials {
                email: email.to_string(),
                password: password.to_string(),
                username: whoami::username(),
                keep_signed_in: rest.first().is_some_and(|w| w.eq_ignore_ascii_case("keep")),
            };
            match rt.block_on(manager.sign_in(creds)) {
                Ok(u) => println!("signed in as {} ({})", u.display_name, u.id),
                Err(e) => eprintln!("error: {}", e),
            }
        }
        ["login", ..] => eprintln!("usage: login <email> <password> [keep]"),
        ["logout"] => {
            rt.block_on(manager.sign_out());
            println!("signed out");
        }
        ["status"] => {
            let session = manager.snapshot();
            match serde_json::to_value(&session) {
                Ok(v) => print_json(&v),
                Err(e) => eprintln!("error: {}", e),
            }
        }
        ["whoami"] => {
            let session = manager.snapshot();
            match require_authentication(&session) {
                GuardOutcome::Allow => {
                    let u = session.user.expect("authenticated session has a user");
                    println!("{} <{}> nivel={}", u.display_name, u.email, u.access_level);
                }
                GuardOutcome::Pending => println!("session still resolving"),
                _ => println!("not signed in"),
            }
        }
        ["refresh"] => match rt.block_on(manager.refresh_session()) {
            Ok(u) => println!("refreshed session for {}", u.display_name),
            Err(e) => eprintln!("error: {}", e),
        },
        ["get", path] => match rt.block_on(client.get_value(path)) {
            Ok(v) => print_json(&v),
            Err(e) => eprintln!("error: {}", e),
        },
        ["noticias"] => match rt.block_on(client.noticias(&PageFilter::default())) {
            Ok(list) => {
                for n in &list {
                    println!("{}  {}", n.data_publicacao.format("%Y-%m-%d"), n.titulo);
                }
                println!("({} notícias)", list.len());
            }
            Err(e) => eprintln!("error: {}", e),
        },
        ["publicacoes"] => match rt.block_on(client.publicacoes(&PageFilter::default())) {
            Ok(list) => {
                for p in &list {
                    println!("{}  {}", p.identifier, p.titulo);
                }
                println!("({} publicações)", list.len());
            }
            Err(e) => eprintln!("error: {}", e),
        },
        ["favoritos"] => match rt.block_on(client.favoritos()) {
            Ok(list) => {
                for f in &list {
                    println!("{}  {}", f.data_favorito.format("%Y-%m-%d"), f.titulo);
                }
                println!("({} favoritos)", list.len());
            }
            Err(e) => eprintln!("error: {}", e),
        },
        ["notificacoes"] => match rt.block_on(client.notificacoes()) {
            Ok(list) => {
                for n in &list {
                    println!("[{}] {}: {}", n.tipo, n.titulo, n.mensagem);
                }
                println!("({} notificações)", list.len());
            }
            Err(e) => eprintln!("error: {}", e),
        },
        ["perfil"] => match rt.block_on(client.perfil()) {
            Ok(p) => match serde_json::to_value(&p) {
                Ok(v) => print_json(&v),
                Err(e) => eprintln!("error: {}", e),
            },
            Err(e) => eprintln!("error: {}", e),
        },
        _ => eprintln!("unrecognized command: {} (try 'help')", line),
    }
}
