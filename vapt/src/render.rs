//! Plain-text summary of a finished run.

use api_client::ApiClient;
use std::fmt::Write;
use vapt_core::{RunContext, ToolReport};

pub fn summary(ctx: &RunContext, api: &ApiClient) -> String {
    let mut out = String::new();
    let r = ctx.results();
    let _ = writeln!(out, "status: {}", ctx.status());
    if let Some(t) = ctx.normalized() {
        let _ = writeln!(out, "target: {}", t);
    }

    if let Some(inv) = r.inventory.as_deref() {
        let _ = writeln!(out, "subdomains ({}):", inv.discovery.subdomains_count);
        for s in &inv.discovery.subdomains {
            let _ = writeln!(out, "  {}", s);
        }
        let tech = &inv.infrastructure.technologies;
        let _ = writeln!(
            out,
            "technologies: title={} server={} status={} stack=[{}]",
            tech.title.as_deref().unwrap_or("N/A"),
            tech.webserver.as_deref().unwrap_or("N/A"),
            tech.status_code.map(|c| c.to_string()).unwrap_or_else(|| "N/A".into()),
            tech.technologies.join(", "),
        );
    }
    if let Some(nmap) = r.nmap.as_deref() {
        let _ = writeln!(out, "open ports: {}", nmap.open_ports.len());
        for p in &nmap.open_ports {
            let _ = writeln!(out, "  {:<10} {}", p.port, p.service.as_deref().unwrap_or(""));
        }
    }

    match r.nuclei.as_deref() {
        Some(ToolReport::Ok(findings)) => {
            let _ = writeln!(out, "vulnerabilities: {}", findings.len());
            for f in findings {
                let _ = writeln!(
                    out,
                    "  {:<8} {} ({})",
                    f.severity().to_uppercase(),
                    f.name(),
                    f.host.as_deref().unwrap_or("-")
                );
            }
        }
        Some(ToolReport::Failed { error }) => {
            let _ = writeln!(out, "nuclei: tool error: {}", error);
        }
        None => {}
    }
    match r.nikto.as_deref() {
        Some(ToolReport::Ok(n)) => {
            if let Some(info) = &n.info {
                let _ = writeln!(out, "nikto: {}", info);
            } else {
                let _ = writeln!(out, "nikto: {} findings", n.findings.len());
            }
        }
        Some(ToolReport::Failed { error }) => {
            let _ = writeln!(out, "nikto: tool error: {}", error);
        }
        None => {}
    }
    match r.zap.as_deref() {
        Some(ToolReport::Ok(z)) => {
            match z.report_name().and_then(|n| api.report_url(n)) {
                Some(url) => {
                    let _ = writeln!(out, "zap report: {}", url);
                }
                None => {
                    let _ = writeln!(out, "zap: scan complete, no report file");
                }
            }
            if let Some(raw) = &z.raw_output {
                let _ = writeln!(out, "zap output: {}", raw);
            }
        }
        Some(ToolReport::Failed { error }) => {
            let _ = writeln!(out, "zap: tool error: {}", error);
        }
        None => {}
    }
    out
}
