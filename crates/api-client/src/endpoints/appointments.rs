//! Appointment endpoints

use super::item_path;
use crate::client::ApiClient;
use crate::error::ApiResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const APPOINTMENTS_PATH: &str = "/appointments";

/// Appointments API interface
#[derive(Clone)]
pub struct AppointmentsApi {
    client: ApiClient,
}

impl AppointmentsApi {
    /// Create a new appointments API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List the user's appointments
    ///
    /// GET /appointments
    pub async fn list(&self) -> ApiResult<Vec<Appointment>> {
        self.client.get(APPOINTMENTS_PATH, &[]).await
    }

    /// Get a single appointment
    ///
    /// GET /appointments/{id}
    pub async fn get(&self, id: &str) -> ApiResult<Appointment> {
        self.client.get(&item_path(APPOINTMENTS_PATH, id)?, &[]).await
    }

    /// Book an appointment
    ///
    /// POST /appointments
    pub async fn create(&self, appointment: &AppointmentInput) -> ApiResult<Appointment> {
        self.client.post(APPOINTMENTS_PATH, appointment).await
    }

    /// Replace an appointment
    ///
    /// PUT /appointments/{id}
    pub async fn update(&self, id: &str, appointment: &AppointmentInput) -> ApiResult<Appointment> {
        self.client
            .put(&item_path(APPOINTMENTS_PATH, id)?, appointment)
            .await
    }

    /// Cancel an appointment, keeping its record
    ///
    /// PATCH /appointments/{id} with `{"status": "cancelled"}`
    pub async fn cancel(&self, id: &str) -> ApiResult<Appointment> {
        self.client
            .patch(
                &item_path(APPOINTMENTS_PATH, id)?,
                &json!({ "status": AppointmentStatus::Cancelled }),
            )
            .await
    }

    /// Delete an appointment
    ///
    /// DELETE /appointments/{id}
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&item_path(APPOINTMENTS_PATH, id)?).await
    }
}

/// Appointment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Booked, not yet confirmed
    #[default]
    Scheduled,
    /// Confirmed by the provider
    Confirmed,
    /// Took place
    Completed,
    /// Called off
    Cancelled,
    /// A status this client does not know yet
    #[serde(other)]
    Unknown,
}

/// A medical appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Appointment ID
    #[serde(alias = "_id")]
    pub id: String,
    /// Short title
    pub title: String,
    /// Doctor or clinic
    #[serde(default)]
    pub provider: Option<String>,
    /// Where it takes place
    #[serde(default)]
    pub location: Option<String>,
    /// When it starts
    pub date_time: DateTime<Utc>,
    /// Lifecycle status
    #[serde(default)]
    pub status: AppointmentStatus,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Appointment {
    /// Whether the appointment is still ahead and not cancelled
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date_time > now
            && matches!(
                self.status,
                AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
            )
    }
}

/// Body for booking or replacing an appointment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    /// Short title
    pub title: String,
    /// Doctor or clinic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Where it takes place
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// When it starts
    pub date_time: DateTime<Utc>,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_appointment_decodes() {
        let appointment: Appointment = serde_json::from_value(json!({
            "_id": "a1",
            "title": "Annual check-up",
            "dateTime": "2030-03-01T09:30:00Z",
            "status": "confirmed"
        }))
        .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert!(appointment.is_upcoming(now));
    }

    #[test]
    fn test_unknown_status() {
        let status: AppointmentStatus = serde_json::from_value(json!("rescheduled")).unwrap();
        assert_eq!(status, AppointmentStatus::Unknown);
    }

    #[test]
    fn test_cancelled_is_not_upcoming() {
        let appointment = Appointment {
            id: "a1".into(),
            title: "Dentist".into(),
            provider: None,
            location: None,
            date_time: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            status: AppointmentStatus::Cancelled,
            notes: None,
            extra: Map::new(),
        };
        assert!(!appointment.is_upcoming(Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap()));
    }
}
