//! Dashboard view models derived from the payment list.

// crates.io
use time::{Date, macros::format_description};
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::HttpTransport,
	services::{Payment, PaymentListParams, PaymentStatus},
};

/// Number of entries kept in [`PaymentSummary::recent`].
pub const RECENT_LIMIT: usize = 5;

/// Status counts plus the most recent payments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentSummary {
	/// Number of payments.
	pub total: usize,
	/// Completed payments.
	pub completed: usize,
	/// Processing payments.
	pub processing: usize,
	/// Failed payments.
	pub failed: usize,
	/// Up to [`RECENT_LIMIT`] payments, newest first.
	pub recent: Vec<Payment>,
}
impl PaymentSummary {
	/// Builds the summary of `payments`.
	pub fn from_payments(payments: &[Payment]) -> Self {
		let count = |status: PaymentStatus| payments.iter().filter(|p| p.status == status).count();
		let mut recent = payments.to_vec();

		// Stable, so equal timestamps keep server order.
		recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		recent.truncate(RECENT_LIMIT);

		Self {
			total: payments.len(),
			completed: count(PaymentStatus::Completed),
			processing: count(PaymentStatus::Processing),
			failed: count(PaymentStatus::Failed),
			recent,
		}
	}
}

/// Amounts of one calendar day.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartPoint {
	/// Axis label, e.g. `Oct 6`.
	pub date: String,
	/// Sum over every status.
	pub total: i64,
	/// Sum over completed payments.
	pub completed: i64,
	/// Sum over processing payments.
	pub processing: i64,
	/// Sum over failed payments.
	pub failed: i64,
}

#[derive(Default)]
struct DayTotals {
	total: f64,
	completed: f64,
	processing: f64,
	failed: f64,
}

/// Per-day amount sums in chronological order; days are UTC calendar dates.
pub fn chart_series(payments: &[Payment]) -> Vec<ChartPoint> {
	let mut days = BTreeMap::<Date, DayTotals>::new();

	for payment in payments {
		let amount = payment.amount_value();
		let day = days.entry(payment.created_at.to_offset(time::UtcOffset::UTC).date()).or_default();

		day.total += amount;

		match payment.status {
			PaymentStatus::Completed => day.completed += amount,
			PaymentStatus::Processing => day.processing += amount,
			PaymentStatus::Failed => day.failed += amount,
		}
	}

	days.into_iter()
		.map(|(date, totals)| ChartPoint {
			date: date
				.format(format_description!("[month repr:short] [day padding:none]"))
				.unwrap_or_default(),
			total: round_half_up(totals.total),
			completed: round_half_up(totals.completed),
			processing: round_half_up(totals.processing),
			failed: round_half_up(totals.failed),
		})
		.collect()
}

/// Everything the dashboard page renders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardView {
	/// Status counts and recent payments.
	pub summary: PaymentSummary,
	/// Per-day chart series.
	pub chart: Vec<ChartPoint>,
}
impl DashboardView {
	/// Derives both view models from one payment list.
	pub fn from_payments(payments: &[Payment]) -> Self {
		Self { summary: PaymentSummary::from_payments(payments), chart: chart_series(payments) }
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Fetches the unfiltered payment list and derives the dashboard view.
	pub async fn dashboard(&self) -> Result<DashboardView> {
		let response = self.list_payments(&PaymentListParams::default()).await?;

		Ok(DashboardView::from_payments(&response.payments))
	}
}

fn round_half_up(value: f64) -> i64 {
	(value + 0.5).floor() as i64
}
