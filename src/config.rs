use crate::routes::{Settings, DEFAULT_JSON_LIMIT};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(short, long, default_value_t = 5000)]
    pub port: u16,
    /// JSON file holding every saved array
    #[arg(short, long, default_value = "data/sessions.json")]
    pub data_file: PathBuf,
    /// Landing page served at `/`
    #[arg(short, long, default_value = "templates/index.html")]
    pub index: PathBuf,
    /// Directory served under `/static`
    #[arg(short, long, default_value = "static")]
    pub static_dir: PathBuf,
    /// Largest accepted request body in bytes
    #[arg(short = 'l', long, default_value_t = DEFAULT_JSON_LIMIT)]
    pub max_body_bytes: usize,
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            index: self.index.clone(),
            static_dir: self.static_dir.clone(),
            json_limit: self.max_body_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_data_templates_static_layout() {
        let args = Args::parse_from(["array-sessions"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 5000);
        assert_eq!(args.data_file, PathBuf::from("data/sessions.json"));
        assert_eq!(args.index, PathBuf::from("templates/index.html"));
        assert_eq!(args.static_dir, PathBuf::from("static"));
        assert_eq!(args.max_body_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "array-sessions",
            "-p",
            "8080",
            "--host",
            "0.0.0.0",
            "--data-file",
            "/tmp/s.json",
            "-s",
            "public",
            "--max-body-bytes",
            "1024",
        ]);
        assert_eq!(args.port, 8080);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.data_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(args.settings().static_dir, PathBuf::from("public"));
        assert_eq!(args.settings().json_limit, 1024);
    }
}
