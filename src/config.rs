// Server configuration: CLI flags with environment fallbacks

use clap::Parser;
use std::path::PathBuf;

/// Book catalog REST API
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "book-server")]
#[command(about = "REST API for the book catalog")]
#[command(version)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// SQLite database file; omit to keep the catalog in memory
    #[arg(short, long, env = "DATABASE_PATH")]
    pub database: Option<PathBuf>,

    /// Origin allowed by CORS
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    pub frontend_url: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database: None,
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let config = ServerConfig::try_parse_from([
            "book-server",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--database",
            "/tmp/books.db",
        ])
        .unwrap();

        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
        assert_eq!(config.database, Some(PathBuf::from("/tmp/books.db")));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(ServerConfig::try_parse_from(["book-server", "--port", "http"]).is_err());
    }

    #[test]
    fn test_default_socket_addr() {
        assert_eq!(ServerConfig::default().socket_addr(), "0.0.0.0:3001");
    }
}
