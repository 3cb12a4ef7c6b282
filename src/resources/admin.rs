//! Administration routes: work shifts and company-wide settings.

// self
use crate::{
	_prelude::*,
	client::{ApiClient, RequestOptions},
	http::ApiTransport,
	resources::{RequestValidationError, clock},
};

/// Shift summary as listed on the settings page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
	/// Shift identifier.
	pub id: u64,
	/// Unique shift name.
	pub name: String,
}

/// Shift with its weekly rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDetail {
	/// Shift identifier.
	pub id: u64,
	/// Unique shift name.
	pub name: String,
	/// One rule per weekday.
	pub day_rules: Vec<ShiftDayRule>,
}

/// Working hours for one weekday of a shift.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDayRule {
	/// Rule identifier.
	pub id: u64,
	/// Weekday, `0` for Monday through `6` for Sunday.
	pub day_of_week: u8,
	/// Whether the weekday is a working day.
	pub is_work_day: bool,
	/// Shift start.
	#[serde(with = "clock")]
	pub start_time: Time,
	/// Shift end.
	#[serde(with = "clock")]
	pub end_time: Time,
	/// Work required on the day, in minutes.
	pub required_work_minutes: u32,
}

/// Company-wide lateness settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
	/// Lateness tolerated before penalties apply.
	pub grace_period_minutes: u32,
	/// Penalty multiplier as the backend's decimal string, e.g. `"1.40"`.
	pub penalty_rate: String,
}

#[derive(Serialize)]
struct NewShift<'a> {
	name: &'a str,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists every shift.
	pub async fn shifts(&self) -> Result<Option<Vec<Shift>>> {
		self.request_json("/shifts/", RequestOptions::get()).await
	}

	/// Fetches shift `id` with its weekday rules.
	pub async fn shift(&self, id: u64) -> Result<Option<ShiftDetail>> {
		self.request_json(&format!("/shifts/{id}/"), RequestOptions::get()).await
	}

	/// Replaces a shift and its rules, returning the stored version.
	pub async fn update_shift(&self, shift: &ShiftDetail) -> Result<Option<ShiftDetail>> {
		self.request_json(&format!("/shifts/{}/", shift.id), RequestOptions::put().json(shift)?)
			.await
	}

	/// Creates an empty shift named `name`.
	pub async fn create_shift(&self, name: &str) -> Result<Option<Shift>> {
		let name = name.trim();

		if name.is_empty() {
			return Err(RequestValidationError::EmptyShiftName.into());
		}

		self.request_json("/shifts/create/", RequestOptions::post().json(&NewShift { name })?).await
	}

	/// Fetches the company-wide settings.
	pub async fn settings(&self) -> Result<Option<GlobalSettings>> {
		self.request_json("/settings/", RequestOptions::get()).await
	}

	/// Replaces the company-wide settings, returning the stored version.
	pub async fn update_settings(&self, settings: &GlobalSettings) -> Result<Option<GlobalSettings>> {
		self.request_json("/settings/", RequestOptions::put().json(settings)?).await
	}
}
