//! Manager routes: pending queues, review decisions, and attendance reports.

// self
use crate::{
	_prelude::*,
	client::{ApiClient, RequestOptions},
	http::ApiTransport,
	resources::{LeaveRecord, ManualLogRecord, MissionRecord, OvertimeRecord, clock, iso_date},
};

/// Request queue a review decision applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReviewQueue {
	/// Overtime requests.
	Overtime,
	/// Leave requests.
	Leave,
	/// Mission requests.
	Mission,
	/// Manual clock requests.
	ManualLog,
}
impl ReviewQueue {
	/// Endpoint listing the queue's pending requests.
	pub const fn pending_path(self) -> &'static str {
		match self {
			Self::Overtime => "/manager/pending-requests/",
			Self::Leave => "/manager/pending-leave/",
			Self::Mission => "/manager/pending-mission/",
			Self::ManualLog => "/manager/pending-logs/",
		}
	}

	/// Endpoint accepting a decision for request `id`.
	pub fn review_path(self, id: u64) -> String {
		let prefix = match self {
			Self::Overtime => "review",
			Self::Leave => "review-leave",
			Self::Mission => "review-mission",
			Self::ManualLog => "review-log",
		};

		format!("/manager/{prefix}/{id}/")
	}
}

/// Manager decision on a pending request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewAction {
	/// Accept the request.
	Approve,
	/// Decline the request.
	Reject,
}

#[derive(Serialize)]
struct ReviewBody {
	action: ReviewAction,
}

/// Confirmation returned after a decision, e.g. `"Leave Approved"`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReviewReceipt {
	/// Human-readable result.
	pub status: String,
}

/// Computed attendance figures for one employee and day.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AttendanceReport {
	/// Report identifier.
	pub id: u64,
	/// Employee the report belongs to.
	pub employee_name: String,
	/// Reported day.
	#[serde(with = "iso_date")]
	pub date: Date,
	/// First clock-in of the day.
	#[serde(default, with = "clock::option")]
	pub first_check_in: Option<Time>,
	/// Last clock-out of the day.
	#[serde(default, with = "clock::option")]
	pub last_check_out: Option<Time>,
	/// Lateness beyond the shift start.
	pub total_lateness_minutes: i64,
	/// Lateness after the penalty rate was applied.
	pub penalty_minutes: f64,
	/// Work the shift required that day.
	pub required_work_minutes_today: f64,
	/// Work actually recorded.
	pub total_worked_minutes: i64,
	/// Missing work.
	pub work_shortfall_minutes: i64,
	/// Work beyond the requirement.
	pub work_overtime_minutes: i64,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists overtime requests awaiting review, oldest first.
	pub async fn pending_overtime(&self) -> Result<Option<Vec<OvertimeRecord>>> {
		self.request_json(ReviewQueue::Overtime.pending_path(), RequestOptions::get()).await
	}

	/// Lists leave requests awaiting review, oldest first.
	pub async fn pending_leave(&self) -> Result<Option<Vec<LeaveRecord>>> {
		self.request_json(ReviewQueue::Leave.pending_path(), RequestOptions::get()).await
	}

	/// Lists mission requests awaiting review.
	pub async fn pending_missions(&self) -> Result<Option<Vec<MissionRecord>>> {
		self.request_json(ReviewQueue::Mission.pending_path(), RequestOptions::get()).await
	}

	/// Lists manual clock requests awaiting review.
	pub async fn pending_manual_logs(&self) -> Result<Option<Vec<ManualLogRecord>>> {
		self.request_json(ReviewQueue::ManualLog.pending_path(), RequestOptions::get()).await
	}

	/// Approves or rejects pending request `id` in `queue`.
	pub async fn review(
		&self,
		queue: ReviewQueue,
		id: u64,
		action: ReviewAction,
	) -> Result<Option<ReviewReceipt>> {
		self.request_json(&queue.review_path(id), RequestOptions::post().json(&ReviewBody { action })?)
			.await
	}

	/// Lists computed daily reports, newest first.
	pub async fn attendance_reports(&self) -> Result<Option<Vec<AttendanceReport>>> {
		self.request_json("/manager/reports/", RequestOptions::get()).await
	}
}
