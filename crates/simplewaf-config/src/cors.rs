use std::env;

const DEFAULT_ORIGINS: &str = "http://localhost:5173";

/// Browser origins allowed to call the API with credentials.
#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Reads the comma separated `ALLOWED_ORIGINS` list. The dashboard dev
    /// server is allowed when the variable is unset.
    pub fn from_env() -> Self {
        let raw = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string());
        Self {
            allowed_origins: parse_origins(&raw),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let mut origins: Vec<String> = raw
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect();
    origins.dedup();
    origins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://waf.example.com/ ,,http://localhost:5173"),
            vec!["https://waf.example.com", "http://localhost:5173"]
        );
        assert!(parse_origins(" , ").is_empty());
    }
}
