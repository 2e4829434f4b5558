use salesdesk_agent::client_from_config;
use salesdesk_core::config::{AppConfig, LoadOptions};
use salesdesk_erp::ErpClient;
use serde::Serialize;

use crate::commands::block_on;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_llm_client(&config));
            checks.push(check_erp_connectivity(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("llm_client"));
            checks.push(skipped("erp_connectivity"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn check_llm_client(config: &AppConfig) -> DoctorCheck {
    match client_from_config(&config.llm) {
        Ok(_) => DoctorCheck {
            name: "llm_client",
            status: CheckStatus::Pass,
            details: format!("{:?} client ready for model `{}`", config.llm.provider, config.llm.model),
        },
        Err(error) => {
            DoctorCheck { name: "llm_client", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_erp_connectivity(config: &AppConfig) -> DoctorCheck {
    let client = match ErpClient::new(&config.erp) {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "erp_connectivity",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    let result = match block_on("doctor", client.ping()) {
        Ok(result) => result,
        Err(failure) => {
            return DoctorCheck {
                name: "erp_connectivity",
                status: CheckStatus::Fail,
                details: failure.output,
            };
        }
    };

    match result {
        Ok(()) => DoctorCheck {
            name: "erp_connectivity",
            status: CheckStatus::Pass,
            details: format!("reached `{}`", client.base_url()),
        },
        Err(error) => DoctorCheck {
            name: "erp_connectivity",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
