//! Doctor command - validate configuration and datastore connectivity

use anyhow::Result;
use gemm_adapters::credentials::MySqlCredentialStore;
use gemm_adapters::posts::MongoPostStore;
use gemm_domain::{CredentialStore, PostStore};
use gemm_server::AppConfig;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    token_secret: CheckResult,
    mysql: CheckResult,
    mongo: CheckResult,
    weather: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        token_secret: CheckResult::error("Not checked"),
        mysql: CheckResult::error("Not checked"),
        mongo: CheckResult::error("Not checked"),
        weather: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.token_secret = check_token_secret(config);
        let (mysql, mongo) = tokio::join!(check_mysql(config), check_mongo(config));
        report.mysql = mysql;
        report.mongo = mongo;
        report.weather = check_weather(config);
    }

    let checks = [
        &report.config,
        &report.token_secret,
        &report.mysql,
        &report.mongo,
        &report.weather,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_token_secret(config: &AppConfig) -> CheckResult {
    let env_var = &config.auth.token_secret_env;
    match config.token_secret() {
        Ok(_) => CheckResult::ok(format!(
            "Token secret: {} (set), issuer: {}, ttl: {}s",
            env_var, config.auth.issuer, config.auth.token_ttl_secs
        )),
        Err(e) => CheckResult::error(e.to_string()),
    }
}

async fn check_mysql(config: &AppConfig) -> CheckResult {
    let settings = config.mysql_settings();
    let target = format!("{}:{}/{}", settings.host, settings.port, settings.database);

    let store = MySqlCredentialStore::connect_lazy(&settings);
    let result = store.ping().await;
    store.close().await;

    match result {
        Ok(()) => CheckResult::ok(format!("Reachable at {}", target)).with_details(
            serde_json::json!({
                "user": settings.user,
                "max_connections": settings.max_connections,
                "tls": settings.ssl_ca.is_some(),
            }),
        ),
        Err(e) => CheckResult::error(format!("Ping failed for {}: {}", target, e)),
    }
}

async fn check_mongo(config: &AppConfig) -> CheckResult {
    let settings = config.mongo_settings();
    let target = format!("{}.{}", settings.database, settings.collection);

    let store = match MongoPostStore::connect(&settings).await {
        Ok(s) => s,
        Err(e) => return CheckResult::error(format!("Invalid client settings: {}", e)),
    };
    let result = store.ping().await;
    store.close().await;

    match result {
        Ok(()) => CheckResult::ok(format!("Reachable, collection {}", target)).with_details(
            serde_json::json!({
                "authenticated": settings.user.is_some(),
            }),
        ),
        Err(e) => CheckResult::error(format!("Ping failed for {}: {}", target, e)),
    }
}

fn check_weather(config: &AppConfig) -> CheckResult {
    let env_var = &config.weather.api_key_env;
    match config.weather_api_key() {
        Some(_) => CheckResult::ok(format!(
            "API key: {} (set), base_url: {}",
            env_var, config.weather.base_url
        )),
        None => CheckResult::warn(format!("API key: {} (not set)", env_var)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("gemm Doctor Report");
    println!("==================");
    println!();

    print_check("Config", &report.config);
    print_check("Token Secret", &report.token_secret);
    print_check("MySQL", &report.mysql);
    print_check("MongoDB", &report.mongo);
    print_check("Weather", &report.weather);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall != "error" {
        println!();
        println!("Ready to serve! Try: gemm serve");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
