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
    // Secrets (SFB_GATEWAY_WEBHOOK_SECRET, SFB_NOTIFY_TOKEN) are deliberately absent
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "SFB_HOST",
        "SFB_PORT",
        "SFB_DATABASE_URL",
        "SFB_DELIVERY_STRATEGY",
        "SFB_GEOCODER_URL",
        "SFB_GEOCODER_USER_AGENT",
        "SFB_GATEWAY_API_URL",
        "SFB_GATEWAY_WEBHOOK_CHECKS",
        "SFB_NOTIFY_URL",
        "SFB_PENDING_ORDER_REUSE_WINDOW",
        "SFB_USE_X_FORWARDED_FOR",
        "SFB_USE_FORWARDED",
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
