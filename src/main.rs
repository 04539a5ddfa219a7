use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command};
use env_logger::Env;
use log::{error, info};

use jwt_crack::{AttackResult, CancelToken, Config, Engine, Token};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    let outcome = match matches.subcommand() {
        Some(("crack", sub)) => run_crack(sub),
        Some(("validate", sub)) => run_validate(sub),
        Some(("print", sub)) => run_print(sub),
        _ => unreachable!("subcommand is required"),
    };

    if let Err(err) = outcome {
        if err.is_interruption() {
            info!("{}", err);
        } else {
            error!("{}", err);
            process::exit(1);
        }
    }
}

fn cli() -> Command {
    Command::new("jwt-crack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bruteforce the secret of an HMAC-signed JWT (HS256/HS384/HS512)")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("crack")
                .about("recover the signing secret with a smart, wordlist or charset attack")
                .arg(token_arg())
                .arg(
                    Arg::new("smart")
                        .long("smart")
                        .action(ArgAction::SetTrue)
                        .help("try a curated list of common secrets first"),
                )
                .arg(
                    Arg::new("wordlist")
                        .short('w')
                        .long("wordlist")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("path to a newline-separated wordlist"),
                )
                .arg(
                    Arg::new("charset")
                        .short('c')
                        .long("charset")
                        .default_value("password")
                        .help("charset preset, literal characters, or ?l?u?d?s?a rules"),
                )
                .arg(
                    Arg::new("length-min")
                        .long("length-min")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1")
                        .help("minimum secret length"),
                )
                .arg(
                    Arg::new("length-max")
                        .long("length-max")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("8")
                        .help("maximum secret length"),
                )
                .arg(
                    Arg::new("threads")
                        .long("threads")
                        .value_parser(clap::value_parser!(usize))
                        .help("advisory thread hint (1-64)"),
                )
                .arg(
                    Arg::new("performance")
                        .long("performance")
                        .default_value("balanced")
                        .value_parser(["eco", "balanced", "performance", "maximum"])
                        .help("advisory performance level"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_parser(clap::value_parser!(u64))
                        .help("stop after this many seconds"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("write the result as JSON to this file"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("check token structure and algorithm support")
                .arg(token_arg()),
        )
        .subcommand(
            Command::new("print")
                .about("print the decoded header and payload")
                .arg(token_arg()),
        )
}

fn token_arg() -> Arg {
    Arg::new("token")
        .short('t')
        .long("token")
        .required(true)
        .help("the JWT to work on")
}

fn run_crack(matches: &ArgMatches) -> jwt_crack::Result<()> {
    let mut config = Config {
        token: matches.get_one::<String>("token").unwrap().clone(),
        wordlist: matches.get_one::<PathBuf>("wordlist").cloned(),
        charset: matches.get_one::<String>("charset").unwrap().clone(),
        length_min: *matches.get_one::<usize>("length-min").unwrap(),
        length_max: *matches.get_one::<usize>("length-max").unwrap(),
        smart: matches.get_flag("smart"),
        performance: matches.get_one::<String>("performance").unwrap().parse()?,
        timeout: matches
            .get_one::<u64>("timeout")
            .map(|&secs| Duration::from_secs(secs)),
        ..Config::default()
    };
    if let Some(&threads) = matches.get_one::<usize>("threads") {
        config.threads = threads;
    }

    let cancel = match config.timeout {
        Some(timeout) => CancelToken::with_timeout(timeout),
        None => CancelToken::new(),
    };

    let mut engine = Engine::new(config)?;
    engine.set_progress_callback(|attempts, rate, _eta, status| {
        eprint!("\rattempts: {}, rate: {:.0}/s - {}", attempts, rate, status);
    });

    let result = engine.attack(&cancel);
    eprintln!();
    let result = result?;

    display_result(&result);

    if let Some(path) = matches.get_one::<PathBuf>("output") {
        match save_result(&result, path) {
            Ok(()) => info!("result saved to {}", path.display()),
            Err(err) => error!("failed to save result: {}", err),
        }
    }

    Ok(())
}

fn run_validate(matches: &ArgMatches) -> jwt_crack::Result<()> {
    let token = Token::parse(matches.get_one::<String>("token").unwrap())?;
    info!("token is valid and supported");
    println!("Algorithm: {}", token.algorithm());
    println!(
        "Header:  {}",
        serde_json::to_string_pretty(token.header()).unwrap()
    );
    println!(
        "Payload: {}",
        serde_json::to_string_pretty(token.payload()).unwrap()
    );
    Ok(())
}

fn run_print(matches: &ArgMatches) -> jwt_crack::Result<()> {
    let token = Token::parse(matches.get_one::<String>("token").unwrap())?;
    let decoded: Vec<String> = [token.header(), token.payload()]
        .into_iter()
        .map(|p| serde_json::to_string_pretty(p).unwrap())
        .collect();
    println!("{}", decoded.join("."));
    Ok(())
}

fn display_result(result: &AttackResult) {
    let line = "─".repeat(50);
    println!("{}", line);
    if result.success {
        println!("SECRET FOUND");
        if let Some(secret) = &result.secret {
            println!("Secret:      {}", secret);
        }
    } else {
        println!("Secret not found");
    }
    println!("Algorithm:   {}", result.algorithm);
    println!("Attack mode: {}", result.attack_mode);
    println!("Attempts:    {}", format_count(result.attempts));
    println!("Duration:    {:?}", result.duration);
    println!("{}", line);
}

fn save_result(result: &AttackResult, path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json + "\n")
}

fn format_count(n: u64) -> String {
    let reversed: Vec<char> = n.to_string().chars().rev().collect();
    let mut grouped = String::new();
    for (i, c) in reversed.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    grouped.chars().rev().collect()
}
