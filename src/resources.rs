//! Typed models and calls for the attendance backend's routes.
//!
//! Every call goes through [`ApiClient::request_json`](crate::client::ApiClient::request_json),
//! so the soft-failure and refresh rules of the client apply unchanged: `Ok(None)` means a
//! notice already reached the sink.
//!
//! List endpoints return the backend's display labels (`"Pending"`, `"Clock In"`,
//! `"Hourly Leave"`), while write endpoints expect the stored codes (`"PENDING"`, `"IN"`,
//! `"HOURLY"`). The enums here accept both spellings and always send the codes.

pub mod admin;
pub mod employee;
pub mod manager;

pub use admin::*;
pub use employee::*;
pub use manager::*;

// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::_prelude::*;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(clock, Time, "[hour]:[minute][optional [:[second]]]");

/// Client-side checks mirroring the backend's request validation.
///
/// Raised before any HTTP call is made.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RequestValidationError {
	/// Hourly leave needs a positive duration.
	#[error("Requested minutes must be greater than 0 for hourly leave.")]
	HourlyLeaveWithoutMinutes,
	/// Hourly missions need both a start and an end time.
	#[error("Start and End time are required for hourly missions.")]
	HourlyMissionWithoutTimes,
	/// Hourly mission ends before it starts.
	#[error("Mission end time must be after its start time.")]
	MissionEndsBeforeStart,
	/// Shift names cannot be blank.
	#[error("Shift name must not be empty.")]
	EmptyShiftName,
	/// Grouped log ranges must not run backwards.
	#[error("The start date must not be after the end date.")]
	InvertedDateRange,
}

/// Review state shared by every request kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
	/// Awaiting a manager decision.
	#[serde(rename = "PENDING", alias = "Pending")]
	Pending,
	/// Approved by a manager.
	#[serde(rename = "APPROVED", alias = "Approved")]
	Approved,
	/// Rejected by a manager.
	#[serde(rename = "REJECTED", alias = "Rejected")]
	Rejected,
}
impl RequestStatus {
	/// Returns `true` while the request can still be edited or reviewed.
	pub fn is_pending(self) -> bool {
		matches!(self, Self::Pending)
	}
}

/// Whether a leave or mission covers the whole day or part of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coverage {
	/// Whole working day.
	#[serde(rename = "FULL_DAY", alias = "Full-Day Leave", alias = "Full-Day Mission")]
	FullDay,
	/// Part of the working day.
	#[serde(rename = "HOURLY", alias = "Hourly Leave", alias = "Hourly Mission")]
	Hourly,
}

/// Direction of a manual clock entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogDirection {
	/// Clock in.
	#[serde(rename = "IN", alias = "Clock In")]
	In,
	/// Clock out.
	#[serde(rename = "OUT", alias = "Clock Out")]
	Out,
}

/// Acknowledgement returned by create and update endpoints.
///
/// Some endpoints echo the stored row, others only the submitted fields; only the identifier is
/// kept, when present.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Submitted {
	/// Identifier of the stored request.
	#[serde(default)]
	pub id: Option<u64>,
}

fn clock_list<'de, D>(deserializer: D) -> Result<Vec<Time>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Vec::<String>::deserialize(deserializer)?;
	let format = time::macros::format_description!("[hour]:[minute][optional [:[second]]]");

	raw.iter()
		.map(|value| Time::parse(value, &format).map_err(D::Error::custom))
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_and_codes_both_deserialize() {
		let display: RequestStatus =
			serde_json::from_str(r#""Pending""#).expect("Display label should deserialize.");
		let code: RequestStatus =
			serde_json::from_str(r#""PENDING""#).expect("Stored code should deserialize.");

		assert_eq!(display, code);
		assert_eq!(
			serde_json::to_string(&RequestStatus::Approved).expect("Status should serialize."),
			r#""APPROVED""#
		);

		let coverage: Coverage =
			serde_json::from_str(r#""Hourly Mission""#).expect("Mission label should deserialize.");

		assert_eq!(coverage, Coverage::Hourly);

		let direction: LogDirection =
			serde_json::from_str(r#""Clock Out""#).expect("Log label should deserialize.");

		assert_eq!(direction, LogDirection::Out);
	}

	#[test]
	fn submitted_tolerates_missing_identifier() {
		let with_id: Submitted = serde_json::from_str(r#"{"id":12,"date":"2025-01-05"}"#)
			.expect("Echoed row should deserialize.");
		let without_id: Submitted = serde_json::from_str(r#"{"date":"2025-01-05"}"#)
			.expect("Echoed fields should deserialize.");

		assert_eq!(with_id.id, Some(12));
		assert_eq!(without_id.id, None);
	}
}
