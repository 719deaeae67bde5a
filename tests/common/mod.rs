#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::{json, Value};

use profreg_api::auth::{Argon2Hasher, CredentialHasher};
use profreg_api::config::AppConfig;
use profreg_api::database::models::{NewUser, ReferenceKind};
use profreg_api::database::{MemoryStore, Store};
use profreg_api::validation::Gender;
use profreg_api::{app, AppState};

pub const PASSWORD: &str = "Passw0rd!";

/// Router served in-process over a fresh in-memory store.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
    pub field_id: i64,
    pub qualification_id: i64,
    pub region_ids: Vec<i64>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::testing()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let field_id = store.insert_reference(ReferenceKind::Field, "Elektrik").await?.id;
        let qualification_id = store
            .insert_reference(ReferenceKind::Qualification, "Usta")
            .await?
            .id;
        let mut region_ids = Vec::new();
        for name in ["Bakı", "Gəncə", "Sumqayıt"] {
            region_ids.push(store.insert_reference(ReferenceKind::Region, name).await?.id);
        }

        let state = AppState::new(config, store.clone())?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            store,
            client: reqwest::Client::new(),
            field_id,
            qualification_id,
            region_ids,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<(reqwest::StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(body).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    pub async fn get(&self, path: &str) -> Result<(reqwest::StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    /// A complete, valid registration form for `mobile_number`.
    pub fn registration(&self, mobile_number: &str) -> Value {
        json!({
            "first_name": "Günel",
            "last_name": "Həsənova",
            "birth_date": "12.04.1993",
            "mobile_number": mobile_number,
            "gender": "F",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
            "profession": self.field_id,
            "qualification": self.qualification_id,
            "work_experience": 4,
            "areas": [self.region_ids[0], self.region_ids[2]],
            "education": "bachelor",
            "education_major": "Fizika",
            "languages": ["azerbaijani", "english"],
            "profile_photo": "me.png",
            "instagram": "https://instagram.com/gunel",
            "portfolio_images": ["work1.jpg", "work2.png"],
            "note": "Evlərə çağırış mümkündür"
        })
    }

    /// Insert a user directly, bypassing registration.
    pub async fn insert_user(&self, mobile_number: &str, is_active: bool) -> Result<i64> {
        let hasher = Argon2Hasher::new(1024, 1)?;
        let user = self
            .store
            .insert_user(NewUser {
                first_name: "Kamran".to_string(),
                last_name: "Məmmədov".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1990, 1, 15).context("date")?,
                mobile_number: mobile_number.to_string(),
                password_hash: Some(hasher.hash(PASSWORD)?),
                gender: Gender::Male,
                is_active,
                is_staff: false,
                is_superuser: false,
            })
            .await?;
        Ok(user.id)
    }

    /// Log in and return `(access, refresh)`.
    pub async fn login(&self, mobile_number: &str) -> Result<(String, String)> {
        let (status, body) = self
            .post(
                "/auth/login",
                &json!({ "mobile_number": mobile_number, "password": PASSWORD }),
            )
            .await?;
        anyhow::ensure!(status.is_success(), "login failed: {} {}", status, body);
        let tokens = &body["data"]["tokens"];
        Ok((
            tokens["access"].as_str().context("access token")?.to_string(),
            tokens["refresh"].as_str().context("refresh token")?.to_string(),
        ))
    }
}
