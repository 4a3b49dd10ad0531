//! Command-line configuration for the server.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// fidi service mocker; this instance mocks a single node in the service
/// being mocked.
#[derive(Debug, Clone, Parser)]
#[command(name = "fidi-server", version, disable_version_flag = true)]
pub struct ServerArgs {
    /// Local port to listen on.
    #[arg(short, long, default_value_t = 9001)]
    pub port: u16,

    /// Directory the log file is written to. Must exist.
    #[arg(short = 'd', long = "log-dir", default_value = ".")]
    pub log_dir: PathBuf,

    /// Log file name inside the log directory.
    #[arg(short = 'f', long = "log-file", default_value = "fidi_server.log")]
    pub log_file: String,

    /// Display the version number.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

impl ServerArgs {
    /// Full path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::parse_from(["fidi-server"]);
        assert_eq!(args.port, 9001);
        assert_eq!(args.log_dir, PathBuf::from("."));
        assert_eq!(args.log_file, "fidi_server.log");
        assert_eq!(args.log_path(), PathBuf::from("./fidi_server.log"));
    }

    #[test]
    fn test_short_flags() {
        let args = ServerArgs::parse_from([
            "fidi-server",
            "-p",
            "8080",
            "-d",
            "/var/log",
            "-f",
            "mock.log",
        ]);
        assert_eq!(args.port, 8080);
        assert_eq!(args.log_path(), PathBuf::from("/var/log/mock.log"));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerArgs::try_parse_from(["fidi-server", "--port", "70000"]).is_err());
    }
}
