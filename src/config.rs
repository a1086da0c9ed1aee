use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    pub token_ttl_minutes: i64,
    /// Base URL of the web client; reset links point at `<frontend_url>/reset-password`.
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub fallback_api_key: Option<String>,
    pub fallback_base_url: String,
    pub fallback_model: String,
    pub timeout_secs: u64,
    pub reply_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub reset: ResetConfig,
    pub ai: AiConfig,
    pub admin: AdminConfig,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "recipe-hub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "recipe-hub-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24),
        };
        let reset = ResetConfig {
            token_ttl_minutes: env_parse("RESET_TOKEN_TTL_MINUTES").unwrap_or(60),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        };
        let ai = AiConfig {
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".into()),
            fallback_api_key: env_opt("LLM_FALLBACK_API_KEY"),
            fallback_base_url: std::env::var("LLM_FALLBACK_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            fallback_model: std::env::var("LLM_FALLBACK_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".into()),
            timeout_secs: env_parse("LLM_TIMEOUT_SECS").unwrap_or(60),
            reply_language: std::env::var("AI_REPLY_LANGUAGE").unwrap_or_else(|_| "French".into()),
        };
        let admin = AdminConfig {
            name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".into()),
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@recettes.com".into()),
            password: env_opt("ADMIN_PASSWORD"),
        };
        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Ok(Self {
            database_url,
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            reset,
            ai,
            admin,
            cors_origins,
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Comma-separated origins; `*` or an empty list means "any origin".
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(String::from)
        .collect()
}
