use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        return;
    };
    let completions_dir = out_dir.join("completions");

    if let Err(e) = fs::create_dir_all(&completions_dir) {
        println!("cargo:warning=Could not create completions directory: {}", e);
        return;
    }

    let mut cmd = clap::Command::new("scanwise")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Scanwise Contributors")
        .about("Score how scannable a web page or HTML document is")
        .arg(clap::arg!([INPUT] "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(clap::arg!(-p --preset <ID> "Preset id (default: chosen by URL domain, else base)"))
        .arg(
            clap::arg!(--preset_dir <DIR> "Directory with <id>.json preset overrides")
                .value_name("DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, json, json-compact)")
                .value_name("FORMAT")
                .default_value("text")
                .value_parser(["text", "json", "json-compact"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--line_threshold <N> "Lines a paragraph may span before it counts as dense").default_value("5"))
        .arg(clap::arg!(--chars_per_line <N> "Characters per rendered line for the layout estimate").default_value("80"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(--no_suggestions "Skip suggestion evaluation"))
        .arg(clap::arg!(--list_presets "List available presets and exit"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    for shell in [
        clap_complete::Shell::Bash,
        clap_complete::Shell::Zsh,
        clap_complete::Shell::Fish,
        clap_complete::Shell::PowerShell,
    ] {
        if let Err(e) = clap_complete::generate_to(shell, &mut cmd, "scanwise", &completions_dir) {
            println!("cargo:warning=Failed to generate {} completions: {}", shell, e);
        }
    }
}
