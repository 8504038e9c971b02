use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use openrouter_agents::agents::{self, AgentKind, AgentTask};
use openrouter_agents::catalog::{self, ModelFilter};
use openrouter_agents::config::{default_configuration, EnvOverrides};
use openrouter_agents::models::MessageRole;
use openrouter_agents::probe;
use openrouter_agents::session::ChatSession;
use openrouter_agents::utils::{mask_secret, pretty_content};
use openrouter_agents::{
    init_logging, ConnectionUpdate, GenerateOptions, GenerationClient, Generator, ModelId,
    ProfileResolver, ServiceCategory,
};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

fn cli() -> Command {
    Command::new("openrouter-agents")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Agent presets over the OpenRouter chat-completions API")
        .subcommand_required(true)
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Override the API base URL")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("HTTP timeout in seconds")
                .default_value("60")
                .value_parser(clap::value_parser!(u64))
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("create")
                .about("Run an agent preset once and print its output")
                .arg(
                    Arg::new("kind")
                        .help("mock-data, code, translator, docs or custom")
                        .long_help(agents::kinds_help())
                        .required(true),
                )
                .arg(
                    Arg::new("prompt")
                        .help("What the agent should produce")
                        .required(true)
                        .num_args(1..)
                        .action(ArgAction::Append),
                )
                .arg(model_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Ask for JSON output")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("text")
                        .long("text")
                        .help("Ask for plain text even where JSON is the default")
                        .conflicts_with("json")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .value_name("N")
                        .help("Number of mock records")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("schema")
                        .long("schema")
                        .value_name("SCHEMA")
                        .help("Shape of each mock record")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("language")
                        .long("language")
                        .value_name("LANG")
                        .help("Programming language (code) or target language (translator)")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("system")
                        .long("system")
                        .value_name("PROMPT")
                        .help("Replace the preset system prompt")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List available models")
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .value_name("REGEX")
                        .help("Only models whose id matches (case-insensitive)")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json-only")
                        .long("json-only")
                        .help("Only models known to support JSON mode")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("free")
                        .long("free")
                        .help("Only free models")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("offline")
                        .long("offline")
                        .help("Skip the API and use the built-in list")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Show the effective configuration and per-agent defaults")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("chat")
                .about("Interactive chat with an agent preset")
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .value_name("KIND")
                        .default_value("custom")
                        .action(ArgAction::Set),
                )
                .arg(model_arg())
                .arg(
                    Arg::new("system")
                        .long("system")
                        .value_name("PROMPT")
                        .help("Replace the preset system prompt")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("test")
                .about("Send a short probe through each agent category")
                .arg(
                    Arg::new("category")
                        .long("category")
                        .value_name("CATEGORY")
                        .help("Probe only this category")
                        .action(ArgAction::Set),
                )
                .arg(model_arg()),
        )
}

fn model_arg() -> Arg {
    Arg::new("model")
        .long("model")
        .value_name("MODEL")
        .help("Model id, e.g. openai/gpt-4.1-nano")
        .action(ArgAction::Set)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let matches = cli().get_matches();

    let env = EnvOverrides::from_env();
    let resolver = ProfileResolver::new(env.clone());
    let timeout = *matches.get_one::<u64>("timeout").unwrap_or(&60);
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
        .context("building HTTP client")?;
    let client = GenerationClient::new(default_configuration(&env), ServiceCategory::Unspecified, resolver)
        .with_http_client(http);
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        client.update_configuration(ConnectionUpdate::default().base_url(base_url.as_str()));
    }

    match matches.subcommand() {
        Some(("create", sub)) => create(&client, sub).await,
        Some(("list", sub)) => list(&client, sub).await,
        Some(("config", sub)) => show_config(&client, sub),
        Some(("chat", sub)) => chat(&client, sub).await,
        Some(("test", sub)) => test(&client, sub).await,
        _ => unreachable!("subcommand_required is set"),
    }
}

fn parse_kind(raw: &str) -> anyhow::Result<AgentKind> {
    raw.parse::<AgentKind>().map_err(anyhow::Error::msg)
}

async fn create(client: &GenerationClient, matches: &ArgMatches) -> anyhow::Result<()> {
    client.configuration().validate()?;
    let kind = parse_kind(matches.get_one::<String>("kind").map(String::as_str).unwrap_or("custom"))?;
    let request = matches
        .get_many::<String>("prompt")
        .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let mut task = AgentTask::new(kind, request);
    if let Some(model) = matches.get_one::<String>("model") {
        task = task.model(model.as_str());
    }
    if matches.get_flag("json") {
        task = task.json(true);
    } else if matches.get_flag("text") {
        task = task.json(false);
    }
    if let Some(count) = matches.get_one::<u32>("count") {
        task = task.count(*count);
    }
    if let Some(schema) = matches.get_one::<String>("schema") {
        task = task.schema(schema.as_str());
    }
    if let Some(language) = matches.get_one::<String>("language") {
        task = task.language(language.as_str());
    }
    if let Some(system) = matches.get_one::<String>("system") {
        task = task.system_prompt(system.as_str());
    }

    let agent = client.for_category(kind.category());
    let run = agents::run(&agent, &task).await?;
    println!("{}", run.output.render());

    let usage = run
        .completion
        .usage
        .as_ref()
        .map(|u| format!(", {} tokens", u.total_tokens))
        .unwrap_or_default();
    eprintln!(
        "-- {} agent, model {}, {:.2}s{}",
        kind,
        run.completion.model,
        run.completion.latency.as_secs_f64(),
        usage
    );
    Ok(())
}

async fn list(client: &GenerationClient, matches: &ArgMatches) -> anyhow::Result<()> {
    let filter = ModelFilter {
        pattern: matches.get_one::<String>("filter").cloned(),
        json_only: matches.get_flag("json-only"),
        free_only: matches.get_flag("free"),
        limit: matches.get_one::<usize>("limit").copied(),
    };

    let models = if matches.get_flag("offline") {
        catalog::offline_models()
    } else {
        match client.list_models().await {
            Ok(models) => models,
            Err(err) => {
                warn!(error = %err, "model catalog unavailable, using built-in list");
                eprintln!("warning: could not fetch the model catalog, showing the built-in list");
                catalog::offline_models()
            }
        }
    };

    let models = filter
        .apply(models, client.resolver().json_models())
        .context("invalid --filter pattern")?;
    if models.is_empty() {
        eprintln!("no models matched");
        return Ok(());
    }
    for model in &models {
        let context = model
            .context_length
            .map(|c| format!("{:>8}", c))
            .unwrap_or_else(|| format!("{:>8}", "-"));
        let json_flag = if client.resolver().is_json_capable(&model.id) { "json" } else { "" };
        println!("{:<56} {} {:<4}", model.id, context, json_flag);
    }
    eprintln!("-- {} models", models.len());
    Ok(())
}

fn show_config(client: &GenerationClient, matches: &ArgMatches) -> anyhow::Result<()> {
    let config = client.configuration();
    let resolver = client.resolver();
    let env = resolver.overrides();
    let profiles: Vec<_> = ServiceCategory::ALL
        .iter()
        .map(|category| {
            let model = resolver.resolve_model(*category, None, &config.model);
            json!({
                "category": category.as_str(),
                "model": model,
                "model_env_var": category.model_env_var(),
                "temperature": resolver.resolve_temperature(*category),
                "max_tokens": resolver.resolve_max_tokens(*category, model.as_str()),
                "json_capable": resolver.is_json_capable(model.as_str()),
            })
        })
        .collect();

    if matches.get_flag("json") {
        let doc = json!({
            "api_key": mask_secret(&config.api_key),
            "base_url": config.base_url,
            "model": config.model,
            "json_model_prefixes": env.json_model_prefixes,
            "profiles": profiles,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("api key:   {}", mask_secret(&config.api_key));
    println!("base url:  {}", config.base_url);
    println!("model:     {}", config.model);
    if let Some(model) = &env.default_model {
        println!("           (global override {} is active)", model);
    }
    println!();
    println!("{:<16} {:<44} {:>5} {:>7}  json", "category", "model", "temp", "tokens");
    for profile in &profiles {
        println!(
            "{:<16} {:<44} {:>5.1} {:>7}  {}",
            profile["category"].as_str().unwrap_or_default(),
            profile["model"].as_str().unwrap_or_default(),
            profile["temperature"].as_f64().unwrap_or_default(),
            profile["max_tokens"].as_u64().unwrap_or_default(),
            if profile["json_capable"].as_bool().unwrap_or(false) { "yes" } else { "no" },
        );
    }
    if let Err(err) = config.validate() {
        println!();
        println!("warning: {}", err);
    }
    Ok(())
}

async fn chat(client: &GenerationClient, matches: &ArgMatches) -> anyhow::Result<()> {
    client.configuration().validate()?;
    let kind = parse_kind(matches.get_one::<String>("kind").map(String::as_str).unwrap_or("custom"))?;
    let agent = client.for_category(kind.category());
    let mut options = GenerateOptions::default();
    if let Some(model) = matches.get_one::<String>("model") {
        options = options.model(model.as_str());
    }
    if let Some(system) = matches.get_one::<String>("system") {
        options = options.system_prompt(system.as_str());
    }

    let mut session = ChatSession::new();
    debug!(session = %session.id, agent = %kind, "chat session started");
    println!("Chatting with the {} agent. /history, /clear, /exit", kind);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/exit" | "/quit" => break,
            "/history" => {
                if session.is_empty() {
                    println!("(no messages yet)");
                } else {
                    println!("{}", session.transcript());
                }
                continue;
            }
            "/clear" => {
                session.clear();
                println!("(history cleared)");
                continue;
            }
            _ => {}
        }

        session.record(MessageRole::User, line);
        match agent.completion(line, &options).await {
            Ok(completion) => {
                let reply = pretty_content(&completion.content);
                println!("{}", if reply.is_empty() { "(empty response)" } else { reply.as_str() });
                session.record(MessageRole::Assistant, reply);
            }
            Err(err) => eprintln!("error: {}", err),
        }
    }
    debug!(session = %session.id, turns = session.len(), "chat session ended");
    Ok(())
}

async fn test(client: &GenerationClient, matches: &ArgMatches) -> anyhow::Result<()> {
    client.configuration().validate()?;
    let categories = match matches.get_one::<String>("category") {
        Some(raw) => vec![raw.parse::<ServiceCategory>().map_err(anyhow::Error::msg)?],
        None => ServiceCategory::ALL.to_vec(),
    };
    let generators: Vec<Arc<dyn Generator>> = categories
        .into_iter()
        .map(|category| Arc::new(client.for_category(category)) as Arc<dyn Generator>)
        .collect();
    let model = matches.get_one::<String>("model").map(|m| ModelId::new(m.as_str()));

    let reports = probe::probe_all(generators, model).await;
    let mut failed = 0;
    for report in &reports {
        match &report.outcome {
            Ok(chars) => println!(
                "ok    {:<16} {:<44} {:>6}ms  {} chars",
                report.category.as_str(),
                report.model.as_ref().map(ModelId::as_str).unwrap_or("-"),
                report.latency.as_millis(),
                chars
            ),
            Err(err) => {
                failed += 1;
                println!("FAIL  {:<16} {}", report.category.as_str(), err);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} probes failed", failed, reports.len());
    }
    Ok(())
}
