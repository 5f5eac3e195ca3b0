use clap::Parser;
use scrape_viewer::commands::{Command, HELP};
use scrape_viewer::controller::{PageLoad, RunPlan};
use scrape_viewer::{HttpBackend, Viewer, ViewerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

mod args;
use args::{Args, convert_depth, convert_panel};

type HttpViewer = Viewer<HttpBackend>;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    ::log::info!("Using scrape service at {}", config.server_url);

    let backend = match HttpBackend::new(&config) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    let mut viewer = Viewer::new(backend)
        .with_render_options((&config).into())
        .with_crawl_depth(config.crawl_depth);

    if let Some(url) = &args.url {
        // Failures are recorded in the view state and shown by the render
        let outcome = viewer.run(url, &run_plan(&args)).await;
        print!("{}", viewer.screen());
        if !args.interactive {
            if outcome.is_err() {
                std::process::exit(1);
            }
            return;
        }
    }

    interactive(&mut viewer).await;
}

/// Config file, then SCRAPE_SERVER_URL, then command-line flags
fn load_config(args: &Args) -> scrape_viewer::Result<ViewerConfig> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::default(),
    };

    if let Ok(server_url) = std::env::var("SCRAPE_SERVER_URL") {
        if !server_url.is_empty() {
            config.server_url = server_url;
        }
    }
    if let Some(server) = &args.server {
        config.server_url = server.clone();
    }
    if let Some(depth) = args.depth {
        config.crawl_depth = convert_depth(depth);
    }

    config.validate()?;
    Ok(config)
}

/// Translate the one-shot flags into a run plan
fn run_plan(args: &Args) -> RunPlan {
    RunPlan {
        pages: if args.all {
            PageLoad::All
        } else {
            PageLoad::Count(args.pages)
        },
        expand: args.expand.iter().map(|panel| convert_panel(*panel)).collect(),
        filter: args.filter.clone(),
        copy_full_text: args.copy_full_text,
    }
}

async fn interactive(viewer: &mut HttpViewer) {
    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                ::log::error!("Failed to read input: {}", e);
                break;
            }
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        ::log::debug!("Command: {:?}", command);

        match command {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            command => execute(viewer, command).await,
        }
        print!("{}", viewer.screen());
    }
}

async fn execute(viewer: &mut HttpViewer, command: Command) {
    // Failures are recorded in the view state and shown by the next render
    match command {
        Command::Submit { url, depth: Some(depth) } => {
            let _ = viewer.submit(&url, depth).await;
        }
        Command::Submit { url, depth: None } => {
            let _ = viewer.submit_default(&url).await;
        }
        Command::More => {
            if let Ok(None) = viewer.load_next().await {
                println!("No more subpages to load");
            }
        }
        Command::Page(page) => {
            if let Ok(None) = viewer.load_more(page).await {
                println!("No more subpages to load");
            }
        }
        Command::All => {
            let _ = viewer.load_all().await;
        }
        Command::Toggle(panel) => viewer.toggle(panel),
        Command::ToggleSubpage { index, section } => viewer.toggle_subpage(index, section),
        Command::Filter(text) => viewer.set_filter(&text),
        Command::Copy(target) => {
            viewer.copy(target);
        }
        Command::Clear => viewer.clear(),
        Command::Show | Command::Help | Command::Quit => {}
    }
}
