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
    // SMSB_API_TOKEN is deliberately absent
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "SMSB_HOST",
        "SMSB_PORT",
        "SMSB_DATABASE_URL",
        "SMSB_ADMIN_IDS",
        "SMSB_ORDERS_CHANNEL_ID",
        "SMSB_DEPOSITS_CHANNEL_ID",
        "SMSB_PRICE_PER_SMS",
        "SMSB_OPERATOR_PAYOUT_PER_CODE",
        "SMSB_SESSION_IDLE_TIMEOUT",
        "SMSB_RUN_MIGRATIONS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
