use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "DRINKS_HOST",
        "DRINKS_PORT",
        "DRINKS_DATABASE_URL",
        "DRINKS_RESET_DATABASE",
        "DRINKS_AUTH_DOMAIN",
        "DRINKS_API_AUDIENCE",
        "DRINKS_ISSUER",
        "DRINKS_JWKS_URL",
        "DRINKS_JWKS_CACHE_TTL",
        "DRINKS_JWKS_TIMEOUT",
        "DRINKS_JWKS_RETRIES",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
