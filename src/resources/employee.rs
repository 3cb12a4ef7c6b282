//! Self-service routes: overtime, leave, mission, and manual clock requests plus the daily
//! activity view.

// self
use crate::{
	_prelude::*,
	client::{ApiClient, RequestOptions},
	http::ApiTransport,
	resources::{
		Coverage, LogDirection, RequestStatus, RequestValidationError, Submitted, clock,
		clock_list, iso_date,
	},
};

/// Overtime request to submit or edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OvertimeDraft {
	/// Day the overtime was worked.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Minutes requested; `0` lets the backend compute them from the day's logs.
	pub requested_minutes: u32,
	/// Free-form justification.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}

/// Overtime request as listed in history and review queues.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OvertimeRecord {
	/// Request identifier.
	pub id: u64,
	/// Day the overtime was worked.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Requesting employee.
	#[serde(default)]
	pub employee_name: Option<String>,
	/// Minutes requested.
	#[serde(default)]
	pub requested_minutes: u32,
	/// Free-form justification.
	#[serde(default)]
	pub reason: Option<String>,
	/// Review state.
	pub status: RequestStatus,
}

/// Leave request to submit or edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaveDraft {
	/// Day of the leave.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Full-day or hourly leave.
	pub leave_type: Coverage,
	/// Duration of hourly leave in minutes; sent as `0` for full-day leave.
	pub requested_minutes: u32,
	/// Free-form justification.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}
impl LeaveDraft {
	/// Checks the draft and normalizes full-day leave to zero minutes.
	pub fn validated(mut self) -> Result<Self, RequestValidationError> {
		match self.leave_type {
			Coverage::FullDay => self.requested_minutes = 0,
			Coverage::Hourly if self.requested_minutes == 0 =>
				return Err(RequestValidationError::HourlyLeaveWithoutMinutes),
			Coverage::Hourly => {},
		}

		Ok(self)
	}
}

/// Leave request as listed in history and review queues.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LeaveRecord {
	/// Request identifier.
	pub id: u64,
	/// Day of the leave.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Requesting employee.
	#[serde(default)]
	pub employee_name: Option<String>,
	/// Full-day or hourly leave.
	pub leave_type: Coverage,
	/// Duration of hourly leave in minutes.
	#[serde(default)]
	pub requested_minutes: u32,
	/// Free-form justification.
	#[serde(default)]
	pub reason: Option<String>,
	/// Review state.
	pub status: RequestStatus,
}

/// Mission request to submit or edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MissionDraft {
	/// Day of the mission.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Full-day or hourly mission.
	pub mission_type: Coverage,
	/// Start of an hourly mission.
	#[serde(with = "clock::option", skip_serializing_if = "Option::is_none")]
	pub start_time: Option<Time>,
	/// End of an hourly mission.
	#[serde(with = "clock::option", skip_serializing_if = "Option::is_none")]
	pub end_time: Option<Time>,
	/// Where the mission takes place.
	pub destination: String,
	/// Free-form justification.
	pub reason: String,
}
impl MissionDraft {
	/// Checks the draft; full-day missions drop any clock times.
	pub fn validated(mut self) -> Result<Self, RequestValidationError> {
		match (self.mission_type, self.start_time, self.end_time) {
			(Coverage::FullDay, _, _) => {
				self.start_time = None;
				self.end_time = None;
			},
			(Coverage::Hourly, Some(start), Some(end)) if end <= start =>
				return Err(RequestValidationError::MissionEndsBeforeStart),
			(Coverage::Hourly, Some(_), Some(_)) => {},
			(Coverage::Hourly, _, _) =>
				return Err(RequestValidationError::HourlyMissionWithoutTimes),
		}

		Ok(self)
	}
}

/// Mission request as listed in history and review queues.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MissionRecord {
	/// Request identifier.
	pub id: u64,
	/// Day of the mission.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Requesting employee.
	#[serde(default)]
	pub employee_name: Option<String>,
	/// Full-day or hourly mission.
	pub mission_type: Coverage,
	/// Start of an hourly mission.
	#[serde(default, with = "clock::option")]
	pub start_time: Option<Time>,
	/// End of an hourly mission.
	#[serde(default, with = "clock::option")]
	pub end_time: Option<Time>,
	/// Where the mission takes place.
	#[serde(default)]
	pub destination: Option<String>,
	/// Free-form justification.
	#[serde(default)]
	pub reason: Option<String>,
	/// Review state.
	pub status: RequestStatus,
}

/// Clock entry for the current moment, stamped by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SingleLogDraft {
	/// Clock in or out.
	pub log_type: LogDirection,
	/// Free-form justification.
	pub reason: String,
}

/// Matching clock-in and clock-out entries for one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PairLogDraft {
	/// Day of both entries.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Clock-in time.
	#[serde(with = "clock")]
	pub start_time: Time,
	/// Clock-out time.
	#[serde(with = "clock")]
	pub end_time: Time,
	/// Free-form justification.
	pub reason: String,
}

/// Edited manual clock entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManualLogDraft {
	/// Day of the entry.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Clock time of the entry.
	#[serde(with = "clock")]
	pub time: Time,
	/// Clock in or out.
	pub log_type: LogDirection,
	/// Free-form justification.
	pub reason: String,
}

/// Manual clock request as listed in history and review queues.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ManualLogRecord {
	/// Request identifier.
	pub id: u64,
	/// Day of the entry.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Clock time of the entry.
	#[serde(with = "clock")]
	pub time: Time,
	/// Requesting employee.
	#[serde(default)]
	pub employee_name: Option<String>,
	/// Clock in or out.
	pub log_type: LogDirection,
	/// Free-form justification.
	#[serde(default)]
	pub reason: Option<String>,
	/// Review state.
	pub status: RequestStatus,
}

/// Classification of a day in the activity view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
	/// Public holiday.
	Holiday,
	/// Approved full-day leave.
	LeaveFull,
	/// Approved hourly leave.
	LeaveHourly,
	/// Non-working day of the assigned shift.
	WeekendOff,
	/// Working day without any clock entry.
	Absent,
	/// Working day with clock entries.
	Present,
	/// Anything the backend could not classify.
	#[serde(other)]
	Unknown,
}

/// One day of the activity view.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DayLog {
	/// Calendar day.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// Day classification.
	pub status: DayStatus,
	/// Human-readable detail (holiday name, leave reason, log count).
	pub status_info: String,
	/// Raw clock entries in chronological order.
	#[serde(deserialize_with = "clock_list")]
	pub logs: Vec<Time>,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Submits an overtime request.
	pub async fn submit_overtime(&self, draft: &OvertimeDraft) -> Result<Option<Submitted>> {
		self.request_json("/overtime/request/", RequestOptions::post().json(draft)?).await
	}

	/// Replaces a pending overtime request.
	pub async fn update_overtime(&self, id: u64, draft: &OvertimeDraft) -> Result<Option<Submitted>> {
		self.request_json(&format!("/overtime/request/{id}/"), RequestOptions::put().json(draft)?)
			.await
	}

	/// Lists the caller's overtime requests, newest first.
	pub async fn overtime_history(&self) -> Result<Option<Vec<OvertimeRecord>>> {
		self.request_json("/requests/my-history/", RequestOptions::get()).await
	}

	/// Submits a leave request after client-side validation.
	pub async fn submit_leave(&self, draft: LeaveDraft) -> Result<Option<Submitted>> {
		let draft = draft.validated()?;

		self.request_json("/leave/request/", RequestOptions::post().json(&draft)?).await
	}

	/// Replaces a pending leave request after client-side validation.
	pub async fn update_leave(&self, id: u64, draft: LeaveDraft) -> Result<Option<Submitted>> {
		let draft = draft.validated()?;

		self.request_json(&format!("/leave/request/{id}/"), RequestOptions::put().json(&draft)?)
			.await
	}

	/// Lists the caller's leave requests, newest first.
	pub async fn leave_history(&self) -> Result<Option<Vec<LeaveRecord>>> {
		self.request_json("/leave/my-history/", RequestOptions::get()).await
	}

	/// Submits a mission request after client-side validation.
	pub async fn submit_mission(&self, draft: MissionDraft) -> Result<Option<Submitted>> {
		let draft = draft.validated()?;

		self.request_json("/mission/request/", RequestOptions::post().json(&draft)?).await
	}

	/// Replaces a pending mission request after client-side validation.
	pub async fn update_mission(&self, id: u64, draft: MissionDraft) -> Result<Option<Submitted>> {
		let draft = draft.validated()?;

		self.request_json(&format!("/mission/request/{id}/"), RequestOptions::put().json(&draft)?)
			.await
	}

	/// Lists the caller's mission requests.
	pub async fn mission_history(&self) -> Result<Option<Vec<MissionRecord>>> {
		self.request_json("/mission/my-history/", RequestOptions::get()).await
	}

	/// Requests a single clock entry for the current moment.
	pub async fn request_single_log(&self, draft: &SingleLogDraft) -> Result<Option<Submitted>> {
		self.request_json("/log/request-single/", RequestOptions::post().json(draft)?).await
	}

	/// Requests a clock-in/clock-out pair for one day.
	pub async fn request_log_pair(&self, draft: &PairLogDraft) -> Result<Option<Submitted>> {
		self.request_json("/log/request-pair/", RequestOptions::post().json(draft)?).await
	}

	/// Replaces a pending manual clock request.
	pub async fn update_manual_log(
		&self,
		id: u64,
		draft: &ManualLogDraft,
	) -> Result<Option<Submitted>> {
		self.request_json(&format!("/log/request/{id}/"), RequestOptions::put().json(draft)?).await
	}

	/// Lists the caller's manual clock requests.
	pub async fn manual_log_history(&self) -> Result<Option<Vec<ManualLogRecord>>> {
		self.request_json("/log/my-history/", RequestOptions::get()).await
	}

	/// Returns one [`DayLog`] per day in `start..=end`.
	pub async fn grouped_logs(&self, start: Date, end: Date) -> Result<Option<Vec<DayLog>>> {
		if start > end {
			return Err(RequestValidationError::InvertedDateRange.into());
		}

		self.request_json(
			&format!("/logs/my-grouped-logs/?start_date={start}&end_date={end}"),
			RequestOptions::get(),
		)
		.await
	}
}
