/// Endpoint smoke runner.
///
/// Drives a running server through the booking flow over HTTP:
/// catalog, availability, login, booking (including the duplicate branch),
/// the guarded booking list, and the admin check.
///
/// Usage: `SMOKE_BASE_URL=http://localhost:5000 cargo run -p endpoint-smoke-tests`

use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

pub struct ApiTestClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiTestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    /// Logs in through `PUT /user/{email}` and keeps the returned token.
    pub async fn login(&mut self, email: &str) -> Result<(), Box<dyn std::error::Error>> {
        let response = self.put(&format!("/user/{}", email), json!({ "email": email, "name": "Smoke Test" })).await?;
        let body: Value = response.json().await?;

        match body.get("token").and_then(|t| t.as_str()) {
            Some(token) => {
                self.auth_token = Some(token.to_string());
                Ok(())
            }
            None => Err("login response carried no token".into()),
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response, Box<dyn std::error::Error>> {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));

        if let Some(ref token) = self.auth_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        Ok(request.send().await?)
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Response, Box<dyn std::error::Error>> {
        Ok(self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?)
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Response, Box<dyn std::error::Error>> {
        Ok(self.client
            .put(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?)
    }
}

#[derive(Debug, Default)]
pub struct TestResults {
    pub passed: u32,
    pub failed: u32,
    pub failures: Vec<String>,
}

impl TestResults {
    pub fn check(&mut self, test_name: &str, ok: bool, detail: &str) {
        if ok {
            self.passed += 1;
            println!("PASS {}", test_name);
        } else {
            self.failed += 1;
            self.failures.push(format!("{}: {}", test_name, detail));
            println!("FAIL {}: {}", test_name, detail);
        }
    }

    pub fn summary(&self) {
        println!("\nPassed: {}  Failed: {}", self.passed, self.failed);
        for failure in &self.failures {
            println!("  - {}", failure);
        }
    }
}

async fn status_and_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

pub async fn run_smoke_tests(base_url: &str) -> Result<TestResults, Box<dyn std::error::Error>> {
    let mut client = ApiTestClient::new(base_url);
    let mut results = TestResults::default();
    let run_id = Uuid::new_v4().simple().to_string();
    let email = format!("smoke-{}@example.com", &run_id[..8]);

    println!("Base URL: {}", base_url);

    let (status, services) = status_and_json(client.get("/service").await?).await;
    results.check("GET /service", status == StatusCode::OK && services.is_array(), &status.to_string());

    let treatment = services
        .get(0)
        .and_then(|s| s.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string);

    let Some(treatment) = treatment else {
        results.check("catalog has a service", false, "no services to book");
        return Ok(results);
    };

    let date = format!("smoke {}", run_id);
    let (status, available) = status_and_json(client.get(&format!("/available?date={}", date)).await?).await;
    let slot = available
        .as_array()
        .and_then(|all| all.iter().find(|s| s["name"] == treatment.as_str()))
        .and_then(|s| s["slots"].get(0))
        .and_then(|s| s.as_str())
        .map(str::to_string);
    results.check("GET /available", status == StatusCode::OK && slot.is_some(), &status.to_string());
    let slot = slot.unwrap_or_default();

    let (status, _) = status_and_json(client.get(&format!("/booking?patient={}", email)).await?).await;
    results.check("GET /booking without token", status == StatusCode::UNAUTHORIZED, &status.to_string());

    client.login(&email).await?;
    results.check("PUT /user/{email}", client.auth_token.is_some(), "no token");

    let booking = json!({
        "treatment": treatment,
        "bookingDate": date,
        "patientName": format!("Smoke {}", run_id),
        "patientEmail": email,
        "slot": slot
    });

    let (_, first) = status_and_json(client.post("/booking", booking.clone()).await?).await;
    results.check("POST /booking", first["success"] == true, &first.to_string());

    let (_, second) = status_and_json(client.post("/booking", booking).await?).await;
    results.check("POST /booking duplicate", second["success"] == false, &second.to_string());

    let (_, available) = status_and_json(client.get(&format!("/available?date={}", date)).await?).await;
    let still_open = available
        .as_array()
        .and_then(|all| all.iter().find(|s| s["name"] == treatment.as_str()))
        .map(|s| s["slots"].as_array().map_or(false, |slots| slots.iter().any(|v| v == slot.as_str())))
        .unwrap_or(true);
    results.check("booked slot leaves availability", !still_open, &slot);

    let (status, mine) = status_and_json(client.get(&format!("/booking?patient={}", email)).await?).await;
    results.check("GET /booking own", status == StatusCode::OK && mine.as_array().map_or(0, |b| b.len()) == 1, &status.to_string());

    let (status, _) = status_and_json(client.get("/booking?patient=someone-else@example.com").await?).await;
    results.check("GET /booking other patient", status == StatusCode::FORBIDDEN, &status.to_string());

    let (status, admin) = status_and_json(client.get(&format!("/admin/{}", email)).await?).await;
    results.check("GET /admin/{email}", status == StatusCode::OK && admin["admin"] == false, &admin.to_string());

    Ok(results)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("SMOKE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    let results = run_smoke_tests(&base_url).await?;
    results.summary();

    if results.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
