//! System diagnostics and health checks

use crate::config::Config;
use crate::errors::Result;
use crate::graph::GraphClient;
use colored::Colorize;

/// Result of a single health check
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Collected check results
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn print(&self) {
        println!("\nHealth Checks");
        println!("─────────────────────────────────────");
        for check in &self.checks {
            let mark = if check.passed {
                "✓".green()
            } else {
                "✗".red()
            };
            println!("{} {:<24} {}", mark, check.name, check.detail);
        }
        println!();
    }
}

/// Runs configuration and connectivity checks
pub struct Doctor {
    config: Config,
}

impl Doctor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run_checks(&self) -> Result<HealthReport> {
        let mut checks = Vec::new();

        checks.push(self.check_url("graph url", &self.config.graph.url));
        checks.push(self.check_url("bedrock endpoint", &self.config.bedrock.endpoint));

        checks.push(HealthCheck {
            name: "summary model".to_string(),
            passed: true,
            detail: self.config.summary_model().to_string(),
        });

        checks.push(HealthCheck {
            name: "embedding model".to_string(),
            passed: !self.config.models.embedding.is_empty(),
            detail: self.config.models.embedding.clone(),
        });

        checks.push(self.check_graph().await);

        Ok(HealthReport { checks })
    }

    fn check_url(&self, name: &str, url: &str) -> HealthCheck {
        match reqwest::Url::parse(url) {
            Ok(_) => HealthCheck {
                name: name.to_string(),
                passed: true,
                detail: url.to_string(),
            },
            Err(e) => HealthCheck {
                name: name.to_string(),
                passed: false,
                detail: format!("invalid url: {}", e),
            },
        }
    }

    async fn check_graph(&self) -> HealthCheck {
        let reachable = match GraphClient::new(&self.config.graph) {
            Ok(client) => client.health_check().await.unwrap_or(false),
            Err(_) => false,
        };

        HealthCheck {
            name: "graph reachable".to_string(),
            passed: reachable,
            detail: if reachable {
                "ok".to_string()
            } else {
                format!("no response from {}", self.config.graph.url)
            },
        }
    }
}
