use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::rate_limit::MAX_WINDOW;

// Which generation backend answers /api/generate
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Groq,
    #[value(name = "openai")]
    OpenAi,
    Gemini,
}

impl ProviderKind {
    // Name shown to users in error messages
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Groq => "Groq",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }

    pub fn key_env(self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Groq => "llama-3.3-70b-versatile",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Gemini => "gemini-1.5-flash",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
        }
    }
}

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "prodraft-gateway")]
#[command(about = "Rate limited text polishing gateway in front of hosted LLM APIs")]
pub struct Args {
    // Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Generation provider
    #[arg(long, value_enum, default_value_t = ProviderKind::Groq)]
    pub provider: ProviderKind,

    // Model override, provider default otherwise
    #[arg(long)]
    pub model: Option<String>,

    // Provider base URL override (self-hosted proxies, tests)
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 20)]
    pub rate_limit: u32,

    // Rate limit window in seconds, at most one year
    #[arg(
        long,
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..=MAX_WINDOW.as_secs())
    )]
    pub rate_window: u64,

    // Number of rewrites asked from the model
    #[arg(long, default_value_t = 6)]
    pub variations: u32,

    // Response cache TTL in seconds, 0 disables caching
    #[arg(short, long, default_value_t = 0)]
    pub cache_ttl: u64,

    // Expired entry sweep interval in seconds, 0 disables the sweeper
    #[arg(long, default_value_t = 0)]
    pub sweep_interval: u64,

    // Upstream request timeout in seconds, 0 waits indefinitely
    #[arg(long, default_value_t = 0)]
    pub upstream_timeout: u64,

    // Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    // Key for the selected provider; blank values count as missing
    pub fn api_key(&self) -> Option<String> {
        let key = match self.provider {
            ProviderKind::Groq => &self.groq_api_key,
            ProviderKind::OpenAi => &self.openai_api_key,
            ProviderKind::Gemini => &self.gemini_api_key,
        };
        key.as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval > 0).then(|| Duration::from_secs(self.sweep_interval))
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        (self.upstream_timeout > 0).then(|| Duration::from_secs(self.upstream_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["prodraft-gateway"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_reference_limits() {
        let args = parse(&["--groq-api-key", "k"]);
        assert_eq!(args.rate_limit, 20);
        assert_eq!(args.rate_window(), Duration::from_secs(60));
        assert_eq!(args.variations, 6);
        assert_eq!(args.provider, ProviderKind::Groq);
        assert!(args.sweep_interval().is_none());
        assert!(args.upstream_timeout().is_none());
    }

    #[test]
    fn api_key_follows_selected_provider() {
        let args = parse(&[
            "--provider",
            "gemini",
            "--groq-api-key",
            "g",
            "--gemini-api-key",
            "m",
        ]);
        assert_eq!(args.api_key().as_deref(), Some("m"));

        let args = parse(&[
            "--provider",
            "openai",
            "--groq-api-key",
            "g",
            "--openai-api-key",
            "  ",
        ]);
        assert_eq!(args.api_key(), None);
    }

    #[test]
    fn rate_window_is_bounded() {
        let too_long = (MAX_WINDOW.as_secs() + 1).to_string();
        for window in ["0", too_long.as_str(), "18446744073709551615"] {
            let argv = ["prodraft-gateway", "--rate-window", window];
            assert!(Args::try_parse_from(argv).is_err(), "accepted {window}");
        }
        assert_eq!(parse(&["--rate-window", "3600"]).rate_window(), Duration::from_secs(3600));
    }

    #[test]
    fn provider_metadata() {
        assert_eq!(ProviderKind::Groq.display_name(), "Groq");
        assert_eq!(ProviderKind::OpenAi.key_env(), "OPENAI_API_KEY");
        assert_eq!(ProviderKind::Gemini.default_model(), "gemini-1.5-flash");
    }
}
