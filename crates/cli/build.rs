use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("seoscope")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Seoscope Contributors")
        .about("Score web page content quality, readability and near-duplicates")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, json)")
                .value_name("FORMAT")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("10"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(
            clap::arg!(--reference <FILE> "Reference corpus CSV with url, title and embedding columns")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--model <FILE> "Quality model JSON").value_parser(clap::value_parser!(std::path::PathBuf)))
        .arg(clap::arg!(--encoder <FILE> "Label encoder JSON").value_parser(clap::value_parser!(std::path::PathBuf)))
        .arg(
            clap::arg!(--vectorizer <FILE> "Fitted TF-IDF vectorizer shared with the reference corpus")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--threshold <SCORE> "Minimum similarity for a reference page to be reported")
                .default_value("0.70"),
        )
        .arg(clap::arg!(--keywords <NUM> "Number of keywords to report").default_value("5"))
        .arg(clap::arg!(--details "Include reading level, verdict source and class probabilities"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_name("SHELL")
                .value_parser(["bash", "zsh", "fish", "powershell"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "seoscope", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "seoscope", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "seoscope", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "seoscope", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
