//! reqwest implementation of the calendar API

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use super::{CalendarApi, Slot};
use crate::{Error, Result};

/// Tokens are issued with a fixed one-hour lifetime; refresh a little early
/// so an in-flight request never carries an expired token.
const TOKEN_TTL: Duration = Duration::from_secs(3600 - 60);

/// Connection settings and credentials for the upstream calendar API
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Base URL of the bot API (e.g. `https://calendar.example.com/BotApi`)
    pub base_url: String,
    /// Application identifier sent to the token endpoint
    pub app_id: String,
    /// Application key sent to the token endpoint
    pub app_key: String,
    /// User the token is issued for
    pub auth_user_id: u32,
    /// Doctor whose calendar is queried and booked
    pub doctor_id: u32,
    /// Consultation type submitted with bookings
    pub consultation_type: u32,
    /// Call type submitted with every calendar request
    pub call_type: u32,
    /// Patient-side user id submitted with bookings
    pub booking_user_id: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            app_id: String::new(),
            app_key: String::new(),
            auth_user_id: 8,
            doctor_id: 8,
            consultation_type: 15,
            call_type: 0,
            booking_user_id: 623,
        }
    }
}

/// Cached bearer token with its refresh deadline
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Calendar API client owning the access-token cache
///
/// The token lives behind an async mutex and is refreshed lazily on expiry;
/// holding the lock across the refresh gives single-flight behavior when
/// several sessions race for a fresh token.
pub struct CalendarClient {
    http: reqwest::Client,
    config: CalendarConfig,
    token: Mutex<Option<CachedToken>>,
}

/// Request envelope the calendar endpoints expect
#[derive(Serialize)]
struct CalendarRequest<T: Serialize> {
    data: T,
    action: &'static str,
    intent: &'static str,
    module: &'static str,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "appID")]
    app_id: &'a str,
    #[serde(rename = "appKey")]
    app_key: &'a str,
    #[serde(rename = "userID")]
    user_id: u32,
    #[serde(rename = "userType")]
    user_type: &'a str,
    #[serde(rename = "appType")]
    app_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(rename = "errorCode")]
    error_code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    token: String,
}

#[derive(Serialize)]
struct AvailabilityQuery<'a> {
    #[serde(rename = "doctorID")]
    doctor_id: u32,
    date: &'a str,
    time: &'a str,
    #[serde(rename = "callType")]
    call_type: u32,
}

#[derive(Deserialize)]
struct AvailabilityResponse {
    #[serde(rename = "errorCode")]
    error_code: String,
    #[serde(default)]
    message: String,
    #[serde(rename = "Slot", default)]
    slots: Vec<Slot>,
}

#[derive(Serialize)]
struct AppointmentData<'a> {
    #[serde(rename = "doctorConsultationTypeID")]
    consultation_type: u32,
    // sic: the upstream expects this misspelling on the wire
    #[serde(rename = "docotrID")]
    doctor_id: u32,
    #[serde(rename = "visitDateTime")]
    visit_datetime: &'a str,
    #[serde(rename = "callType")]
    call_type: u32,
    #[serde(rename = "userID")]
    user_id: u32,
}

#[derive(Deserialize)]
struct EnvelopeResponse {
    #[serde(rename = "errorCode")]
    error_code: String,
    #[serde(default)]
    message: String,
}

impl CalendarClient {
    /// Create a client for the given upstream
    #[must_use]
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, fetching a fresh one when the cached
    /// token is absent or past its deadline
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.expires_at > Instant::now() {
                return Ok(entry.token.clone());
            }
        }

        tracing::debug!("fetching calendar access token");
        let request = TokenRequest {
            app_id: &self.config.app_id,
            app_key: &self.config.app_key,
            user_id: self.config.auth_user_id,
            user_type: "D",
            app_type: "A",
        };
        let response: TokenResponse = self
            .http
            .post(format!("{}/GenerateToken", self.config.base_url))
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if response.error_code != "0" {
            return Err(Error::Upstream {
                code: response.error_code,
                message: response.message,
            });
        }

        *cached = Some(CachedToken {
            token: response.token.clone(),
            expires_at: Instant::now() + TOKEN_TTL,
        });
        Ok(response.token)
    }

    /// POST one calendar request with the bearer token attached
    async fn post_calendar<T: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &CalendarRequest<T>,
    ) -> Result<R> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(format!("{}/{endpoint}", self.config.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl CalendarApi for CalendarClient {
    async fn day_slots(&self, date: &str) -> Result<Vec<Slot>> {
        let body = CalendarRequest {
            data: AvailabilityQuery {
                doctor_id: self.config.doctor_id,
                date,
                time: "00:00:00",
                call_type: self.config.call_type,
            },
            action: "getdata",
            intent: "get_availability",
            module: "calendar",
        };
        let response: AvailabilityResponse =
            self.post_calendar("GetAvailabilityAsPerTime", &body).await?;

        if response.error_code == "0" {
            tracing::debug!(date, slots = response.slots.len(), "availability fetched");
            Ok(response.slots)
        } else {
            Err(Error::Upstream {
                code: response.error_code,
                message: response.message,
            })
        }
    }

    async fn add_appointment(&self, visit_datetime: &str) -> Result<()> {
        let body = CalendarRequest {
            data: AppointmentData {
                consultation_type: self.config.consultation_type,
                doctor_id: self.config.doctor_id,
                visit_datetime,
                call_type: self.config.call_type,
                user_id: self.config.booking_user_id,
            },
            action: "add",
            intent: "add_appointment",
            module: "calendar",
        };
        let response: EnvelopeResponse = self.post_calendar("AddAppointment", &body).await?;

        if response.error_code == "0" {
            tracing::info!(visit_datetime, "appointment submitted upstream");
            Ok(())
        } else {
            Err(Error::Upstream {
                code: response.error_code,
                message: response.message,
            })
        }
    }
}
