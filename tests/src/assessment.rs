use api_client::ApiClient;
use recon::ReconPhase;
use serde_json::{json, Value};
use validate::HttpValidator;
use vapt_core::{AssessmentStatus, Assessor, LogLevel, ResultCategory, RunContext};
use vuln_scan::VulnPhase;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn inventory(subdomains: usize, ports: &[(&str, &str)]) -> Value {
    json!({
        "status": "success",
        "data": {
            "target": "scanme.nmap.org",
            "discovery": {
                "subdomains": (0..subdomains).map(|i| format!("s{}.scanme.nmap.org", i)).collect::<Vec<_>>(),
                "subdomains_count": subdomains
            },
            "infrastructure": {
                "main_target_ports": ports.iter().map(|(p, s)| json!({ "port": p, "state": "open", "service": s })).collect::<Vec<_>>(),
                "technologies": { "title": "Go ahead and ScanMe!", "webserver": "Apache/2.4.7 (Ubuntu)" }
            }
        }
    })
}

fn vuln(findings: usize) -> Value {
    json!({
        "status": "success",
        "findings_count": findings,
        "nuclei": {
            "findings_count": findings,
            "findings": (0..findings).map(|i| json!({
                "template-id": format!("t-{}", i),
                "info": { "name": format!("Finding {}", i), "severity": "medium" },
                "host": "scanme.nmap.org"
            })).collect::<Vec<_>>()
        },
        "nikto": { "info": "Nikto scan disabled by policy." },
        "zap": {
            "report_file": "scans\\zap_scanme.html",
            "raw_output": "Scan Complete."
        }
    })
}

async fn mount(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn accept(server: &MockServer, cleaned: &str) {
    mount(server, "/validate", json!({ "valid": true, "type": "domain", "cleaned_target": cleaned, "reachable": true })).await;
}

fn assessor(server: &MockServer) -> Assessor {
    let api = ApiClient::new(&server.uri()).unwrap();
    Assessor::new(
        HttpValidator::new(api.clone()),
        vec![ReconPhase::descriptor(api.clone()), VulnPhase::descriptor(api)],
    )
}

async fn run(a: &Assessor, target: &str) -> RunContext {
    a.run(target).await.into_context().expect("run should not be ignored")
}

#[tokio::test]
async fn scanme_end_to_end() {
    let server = MockServer::start().await;
    accept(&server, "scanme.nmap.org").await;
    mount(&server, "/scan/inventory", inventory(3, &[("22/tcp", "ssh"), ("80/tcp", "http")])).await;
    mount(&server, "/scan/vuln", vuln(5)).await;

    let ctx = run(&assessor(&server), "scanme.nmap.org").await;

    assert_eq!(ctx.status(), AssessmentStatus::Ready);
    let r = ctx.results();
    assert_eq!(r.nmap.as_ref().unwrap().open_ports.len(), 2);
    assert_eq!(r.findings().len(), 5);
    assert_eq!(r.populated(), ResultCategory::ALL.to_vec());
    assert_eq!(ctx.log().len(), 5);
    let last = ctx.log().last().unwrap();
    assert_eq!(last.level, LogLevel::Success);
    assert!(last.message.starts_with("Assessment Finished"));
    let zap = r.zap.as_ref().unwrap().ok().unwrap();
    assert_eq!(zap.report_name(), Some("zap_scanme.html"));
}

#[tokio::test]
async fn phases_get_cleaned_target_not_raw_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .and(body_json(json!({ "target": "https://scanme.nmap.org:443/" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": true, "cleaned_target": "scanme.nmap.org" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scan/inventory"))
        .and(body_json(json!({ "target": "scanme.nmap.org" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory(0, &[])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scan/vuln"))
        .and(body_json(json!({ "target": "scanme.nmap.org" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(vuln(0)))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = run(&assessor(&server), "https://scanme.nmap.org:443/").await;
    assert_eq!(ctx.status(), AssessmentStatus::Ready);
    assert_eq!(ctx.normalized().unwrap().host(), "scanme.nmap.org");
}

#[tokio::test]
async fn rejected_target_runs_no_phase() {
    let server = MockServer::start().await;
    mount(&server, "/validate", json!({ "valid": false, "message": "Invalid Domain or IP format" })).await;
    Mock::given(method("POST"))
        .and(path("/scan/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory(1, &[])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scan/vuln"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vuln(1)))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = run(&assessor(&server), "not_a_host").await;
    assert_eq!(ctx.status(), AssessmentStatus::Error);
    assert!(ctx.results().is_empty());
    assert_eq!(ctx.log().iter().filter(|e| e.message.contains("Invalid Domain or IP format")).count(), 1);
}

#[tokio::test]
async fn recon_failure_then_vuln_success_is_ready() {
    let server = MockServer::start().await;
    accept(&server, "example.com").await;
    mount(&server, "/scan/inventory", json!({ "status": "error", "message": "Internal Server Error: nmap crashed" })).await;
    mount(&server, "/scan/vuln", vuln(2)).await;

    let ctx = run(&assessor(&server), "example.com").await;
    assert_eq!(ctx.status(), AssessmentStatus::Ready);
    let r = ctx.results();
    assert!(r.inventory.is_none());
    assert!(r.nmap.is_none());
    assert!(r.nuclei.is_some() && r.nikto.is_some() && r.zap.is_some());
    assert!(ctx
        .log()
        .iter()
        .any(|e| e.level == LogLevel::Error && e.message == "Recon Failed: Internal Server Error: nmap crashed"));
}

#[tokio::test]
async fn backend_crash_during_vuln_is_fatal_but_keeps_recon() {
    let server = MockServer::start().await;
    accept(&server, "example.com").await;
    mount(&server, "/scan/inventory", inventory(1, &[("443/tcp", "https")])).await;
    Mock::given(method("POST"))
        .and(path("/scan/vuln"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ctx = run(&assessor(&server), "example.com").await;
    assert_eq!(ctx.status(), AssessmentStatus::Error);
    assert_eq!(ctx.results().populated(), vec![ResultCategory::Nmap, ResultCategory::Inventory]);
    let last = ctx.log().last().unwrap();
    assert_eq!(last.level, LogLevel::Critical);
    assert!(last.message.contains("HTTP 500"));
}

#[tokio::test]
async fn second_run_has_no_residue() {
    let server = MockServer::start().await;
    accept(&server, "example.com").await;
    mount(&server, "/scan/inventory", inventory(4, &[("22/tcp", "ssh")])).await;
    mount(&server, "/scan/vuln", vuln(1)).await;
    let a = assessor(&server);

    let first = run(&a, "first.example.com").await;
    let second = run(&a, "second.example.com").await;
    assert_eq!(first.log().len(), 5);
    assert_eq!(second.log().len(), 5);
    assert!(second.log().iter().all(|e| !e.message.contains("first.example.com")));
    assert_eq!(second.results().findings().len(), 1);
    assert_eq!(a.snapshot(), second);
}

#[tokio::test]
async fn log_is_time_ordered_and_non_empty_at_rest() {
    let server = MockServer::start().await;
    accept(&server, "example.com").await;
    mount(&server, "/scan/inventory", json!({ "status": "error", "message": "down" })).await;
    mount(&server, "/scan/vuln", json!({ "status": "error", "message": "down" })).await;

    let ctx = run(&assessor(&server), "example.com").await;
    assert!(ctx.status().is_terminal());
    assert!(!ctx.log().is_empty());
    assert!(ctx.log().entries().windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
    let json = serde_json::to_value(&ctx).unwrap();
    assert_eq!(json["status"], json!("READY"));
    assert_eq!(json["results"]["nmap"], Value::Null);
}
