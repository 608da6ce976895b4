//! End-to-end flow against a real Postgres. Skipped when `DATABASE_URL` is
//! missing or `SKIP_DB_TESTS` is set.

use std::net::SocketAddr;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use configs::AppConfig;
use jsonwebtoken::{encode, EncodingKey, Header};
use server::auth::Claims;

struct TestApp {
    base_url: String,
    token: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // env only, never a local config.toml
    std::env::set_var("CONFIG_PATH", "/nonexistent-config-for-tests.toml");
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL missing; skip e2e tests");
        return Err(anyhow::anyhow!("missing DATABASE_URL"));
    };

    let mut cfg = AppConfig::default();
    cfg.database.url = url;
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.uploads.dir = std::env::temp_dir()
        .join(format!("cms-e2e-{}", Uuid::new_v4()))
        .to_string_lossy()
        .to_string();

    let state = server::build_state(&cfg).await?;
    let app = server::build_app(state, &cfg);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
    let claims = Claims { sub: Some("e2e".into()), exp, iat: None };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret"))?;

    Ok(TestApp { base_url: format!("http://{}:{}", addr.ip(), addr.port()), token })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().build().expect("reqwest client")
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn post(&self, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let res = client().post(self.url(path)).bearer_auth(&self.token).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    async fn put(&self, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let res = client().put(self.url(path)).bearer_auth(&self.token).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    async fn delete(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let res = client().delete(self.url(path)).bearer_auth(&self.token).send().await?;
        Ok((res.status(), res.json().await?))
    }

    async fn get(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let res = client().get(self.url(path)).send().await?;
        Ok((res.status(), res.json().await?))
    }
}

fn id_of(body: &Value) -> Uuid {
    body["data"]["id"].as_str().and_then(|s| Uuid::parse_str(s).ok()).expect("created id")
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let Ok(app) = start_server().await else { return Ok(()) };
    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_catalog_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let Ok(app) = start_server().await else { return Ok(()) };
    let tag = Uuid::new_v4().simple().to_string();
    let tag = &tag[..8];

    // new categories go to the end
    let (status, first) = app
        .post("/api/services/categories", json!({ "name": format!("Audit {tag}"), "slug": format!("audit-{tag}") }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    let (status, second) = app
        .post("/api/services/categories", json!({ "name": format!("Tax {tag}"), "slug": format!("tax-{tag}") }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let first_order = first["data"]["sortOrder"].as_i64().unwrap();
    assert_eq!(second["data"]["sortOrder"].as_i64().unwrap(), first_order + 1);

    let (status, dup) = app
        .post("/api/services/categories", json!({ "name": format!("Other {tag}"), "slug": format!("audit-{tag}") }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(dup["success"], false);

    let (first_id, second_id) = (id_of(&first), id_of(&second));
    let (status, _) = app.put("/api/services/categories/reorder", json!({ "categoryIds": [second_id, first_id] })).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, reordered) = app.get(&format!("/api/services/categories/{second_id}")).await?;
    assert_eq!(reordered["data"]["sortOrder"], 1);
    let (status, all) = app.get("/api/services/categories/all").await?;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = all["data"].as_array().unwrap().iter().filter_map(|c| c["id"].as_str()).collect();
    let at = |id: Uuid| ids.iter().position(|i| *i == id.to_string()).expect("category listed");
    assert!(at(second_id) < at(first_id), "{ids:?}");

    // unknown ids abort the whole reorder
    let (status, _) = app
        .put("/api/services/categories/reorder", json!({ "categoryIds": [first_id, Uuid::new_v4()] }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, unchanged) = app.get(&format!("/api/services/categories/{first_id}")).await?;
    assert_eq!(unchanged["data"]["sortOrder"], 2);

    let (status, expert) = app
        .post(
            "/api/experts",
            json!({
                "name": format!("Jane {tag}"),
                "title": "Senior Partner",
                "bio": "Twenty years of advisory work across sectors.",
                "image": "https://example.com/jane.png",
                "location": "Lagos",
                "specialties": ["Audit", "Tax"]
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{expert}");
    let expert_id = id_of(&expert);

    let (status, service) = app
        .post(
            "/api/services",
            json!({
                "name": format!("Assurance {tag}"),
                "slug": format!("assurance-{tag}"),
                "description": "Independent assurance over financial statements and internal controls.",
                "categoryId": first_id
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{service}");
    let service_id = id_of(&service);
    assert_eq!(service["data"]["category"]["id"], first_id.to_string());

    let assign = json!({ "expertId": expert_id });
    let (status, _) = app.post(&format!("/api/services/{service_id}/experts"), assign.clone()).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post(&format!("/api/services/{service_id}/experts"), assign).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, experts) = app.get(&format!("/api/services/{service_id}/experts")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(experts["data"].as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("/api/services/{service_id}/experts/{}", Uuid::new_v4())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/api/services/{service_id}/experts/{expert_id}")).await?;
    assert_eq!(status, StatusCode::OK);

    // category with services cannot be removed
    let (status, _) = app.delete(&format!("/api/services/categories/{first_id}")).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.delete(&format!("/api/services/{service_id}")).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/services/{service_id}")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.delete(&format!("/api/experts/{expert_id}")).await?;
    app.delete(&format!("/api/services/categories/{first_id}")).await?;
    app.delete(&format!("/api/services/categories/{second_id}")).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_industry_delete_cascades_to_case_studies() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let Ok(app) = start_server().await else { return Ok(()) };
    let tag = Uuid::new_v4().simple().to_string();
    let tag = &tag[..8];

    let (status, industry) = app
        .post(
            "/api/industries",
            json!({
                "name": format!("Energy {tag}"),
                "slug": format!("energy-{tag}"),
                "description": "Advisory for upstream, midstream and power generation companies."
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{industry}");
    let industry_id = id_of(&industry);

    for n in 1..=2 {
        let (status, body) = app
            .post(
                "/api/case-studies",
                json!({
                    "title": format!("Refinery turnaround {n}"),
                    "description": "Restructured the maintenance programme of a coastal refinery over two years.",
                    "impact": "Cut unplanned downtime by a third.",
                    "industryId": industry_id
                }),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let listing = format!("/api/case-studies/industry/{industry_id}");
    let (status, before) = app.get(&listing).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["data"].as_array().unwrap().len(), 2);

    let (status, _) = app.delete(&format!("/api/industries/{industry_id}")).await?;
    assert_eq!(status, StatusCode::OK);

    // gone with the industry; the listing stays 200
    let (status, after) = app.get(&listing).await?;
    assert_eq!(status, StatusCode::OK, "{after}");
    assert_eq!(after["data"], json!([]));
    let (status, _) = app.get(&format!("/api/industries/{industry_id}/case-studies")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_contact_and_testimonial_submissions() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let Ok(app) = start_server().await else { return Ok(()) };

    let res = client()
        .post(app.url("/api/contact-messages"))
        .json(&json!({
            "name": "Ada Obi",
            "email": "ada@example.com",
            "company": "Obi Holdings",
            "subject": "Audit engagement",
            "serviceInterest": "Other",
            "message": "We would like to discuss an audit for next year."
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let contact: Value = res.json().await?;
    let contact_id = id_of(&contact);
    assert_eq!(contact["data"]["responded"], false);

    let (status, fetched) = app.get(&format!("/api/contact-messages/{contact_id}")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{fetched}");

    let res = client()
        .post(app.url("/api/testimonials"))
        .json(&json!({
            "leaderName": "Bola Ade",
            "companyName": "Ade Foods",
            "role": "CFO",
            "quote": "The team delivered a thorough and timely review.",
            "leaderImage": "https://example.com/bola.png",
            "approved": true
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let testimonial: Value = res.json().await?;
    assert_eq!(testimonial["data"]["approved"], false);

    app.delete(&format!("/api/contact-messages/{contact_id}")).await?;
    app.delete(&format!("/api/testimonials/{}", id_of(&testimonial))).await?;
    Ok(())
}
