use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub bootstrap: BootstrapConfig,
    pub swagger: SwaggerConfig,
    pub s3: S3Config,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_size: usize,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Signing secret and lifetime for the session/token cookies
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_secret: String,
    pub ttl_hours: i64,
}

/// Passwords for the three seeded system accounts
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin_password: String,
    pub contributor_password: String,
    pub viewer_password: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// S3-compatible object storage configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Storage endpoint URL
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket name for storing files
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Presigned upload URL expiry time in seconds
    pub presign_expiry_secs: u32,
}

/// Mail relay configuration; all fields optional, mail is disabled without a host
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            bootstrap: BootstrapConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            s3: S3Config::from_env()?,
            smtp: SmtpConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024; // 100MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size = env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_UPLOAD_SIZE must be a valid number".to_string())?;

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_upload_size,
            cookie_secure,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_TTL_HOURS: i64 = crate::shared::constants::AUTH_TTL_HOURS;
    const DEV_SECRET: &'static str = "edms-dev-secret-change-me";

    pub fn from_env() -> Result<Self, String> {
        // The original deployment logged missing credentials without refusing
        // to start; keep that behavior but make the fallback loud.
        let token_secret = match env::var("AUTH_TOKEN_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!(
                    "AUTH_TOKEN_SECRET not set, falling back to an insecure development secret"
                );
                Self::DEV_SECRET.to_string()
            }
        };

        let ttl_hours = env::var("AUTH_TTL_HOURS")
            .unwrap_or_else(|_| Self::DEFAULT_TTL_HOURS.to_string())
            .parse::<i64>()
            .map_err(|_| "AUTH_TTL_HOURS must be a valid number".to_string())?;

        Ok(Self {
            token_secret,
            ttl_hours,
        })
    }
}

impl BootstrapConfig {
    const DEFAULT_PASSWORD: &'static str = "changeme";

    pub fn from_env() -> Result<Self, String> {
        let password_for = |var: &str| match env::var(var) {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("{} not set, seeding with the default password", var);
                Self::DEFAULT_PASSWORD.to_string()
            }
        };

        Ok(Self {
            admin_password: password_for("ADMIN_PASSWORD"),
            contributor_password: password_for("CONTRIBUTOR_PASSWORD"),
            viewer_password: password_for("VIEWER_PASSWORD"),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "EDMS API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for EDMS".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl S3Config {
    const DEFAULT_PRESIGN_EXPIRY_SECS: u32 = 300; // 5 minutes

    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("S3_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key = env::var("S3_ACCESS_KEY").unwrap_or_else(|_| {
            tracing::warn!("S3_ACCESS_KEY not set, using the MinIO default");
            "minioadmin".to_string()
        });

        let secret_key = env::var("S3_SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("S3_SECRET_KEY not set, using the MinIO default");
            "minioadmin".to_string()
        });

        let bucket = env::var("S3_BUCKET").unwrap_or_else(|_| "edms-files".to_string());

        let region = env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let presign_expiry_secs = env::var("S3_PRESIGN_EXPIRY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PRESIGN_EXPIRY_SECS.to_string())
            .parse::<u32>()
            .map_err(|_| "S3_PRESIGN_EXPIRY_SECS must be a valid number".to_string())?;

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            presign_expiry_secs,
        })
    }
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("SMTP_HOST").ok().filter(|s| !s.is_empty());
        let username = env::var("SMTP_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty());
        let from = env::var("SMTP_FROM").ok().filter(|s| !s.is_empty());

        if host.is_none() {
            tracing::warn!("SMTP_HOST not set, mail notifications are disabled");
        }

        Ok(Self {
            host,
            username,
            password,
            from,
        })
    }
}
