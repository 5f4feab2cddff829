//! Payment listing with status, id, and sort filters.

// crates.io
use time::macros::format_description;
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	config::PAYMENT_LIST_PATH,
	currency,
	http::HttpTransport,
	request::{QueryParams, RequestOptions},
};

/// Raised when a filter value does not match any known wire spelling.
#[derive(Debug, PartialEq, Eq, ThisError)]
#[error("Unrecognized {kind} `{value}`.")]
pub struct ParseFilterError {
	kind: &'static str,
	value: String,
}

/// Lifecycle state of a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
	/// Settled.
	Completed,
	/// In flight.
	Processing,
	/// Rejected or errored.
	Failed,
}
impl PaymentStatus {
	/// Every status, in display order.
	pub const ALL: [PaymentStatus; 3] =
		[PaymentStatus::Completed, PaymentStatus::Processing, PaymentStatus::Failed];

	/// Returns the wire spelling.
	pub const fn as_str(self) -> &'static str {
		match self {
			PaymentStatus::Completed => "completed",
			PaymentStatus::Processing => "processing",
			PaymentStatus::Failed => "failed",
		}
	}

	/// Returns the human-readable label.
	pub const fn label(self) -> &'static str {
		match self {
			PaymentStatus::Completed => "Completed",
			PaymentStatus::Processing => "Processing",
			PaymentStatus::Failed => "Failed",
		}
	}
}
impl Display for PaymentStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for PaymentStatus {
	type Err = ParseFilterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| ParseFilterError { kind: "payment status", value: s.to_owned() })
	}
}

/// Server-side ordering of the payment list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaymentSort {
	/// `-created_at`.
	NewestFirst,
	/// `created_at`.
	OldestFirst,
	/// `-amount`.
	HighestAmount,
	/// `amount`.
	LowestAmount,
	/// `merchant`.
	MerchantAscending,
	/// `-merchant`.
	MerchantDescending,
}
impl PaymentSort {
	/// Every ordering, in display order.
	pub const ALL: [PaymentSort; 6] = [
		PaymentSort::NewestFirst,
		PaymentSort::OldestFirst,
		PaymentSort::HighestAmount,
		PaymentSort::LowestAmount,
		PaymentSort::MerchantAscending,
		PaymentSort::MerchantDescending,
	];

	/// Returns the wire spelling; a leading `-` means descending.
	pub const fn as_str(self) -> &'static str {
		match self {
			PaymentSort::NewestFirst => "-created_at",
			PaymentSort::OldestFirst => "created_at",
			PaymentSort::HighestAmount => "-amount",
			PaymentSort::LowestAmount => "amount",
			PaymentSort::MerchantAscending => "merchant",
			PaymentSort::MerchantDescending => "-merchant",
		}
	}

	/// Returns the human-readable label.
	pub const fn label(self) -> &'static str {
		match self {
			PaymentSort::NewestFirst => "Newest First",
			PaymentSort::OldestFirst => "Oldest First",
			PaymentSort::HighestAmount => "Highest Amount",
			PaymentSort::LowestAmount => "Lowest Amount",
			PaymentSort::MerchantAscending => "Merchant (A-Z)",
			PaymentSort::MerchantDescending => "Merchant (Z-A)",
		}
	}
}
impl Display for PaymentSort {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for PaymentSort {
	type Err = ParseFilterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|sort| sort.as_str() == s)
			.ok_or_else(|| ParseFilterError { kind: "payment sort", value: s.to_owned() })
	}
}

/// A payment as returned by the listing endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
	/// Payment identifier.
	pub id: String,
	/// Merchant name.
	pub merchant: String,
	/// Lifecycle state.
	pub status: PaymentStatus,
	/// Decimal amount as sent by the server, e.g. `"150000.00"`.
	pub amount: String,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl Payment {
	/// Numeric amount read from the leading number of [`Self::amount`]; unparseable amounts count
	/// as zero.
	pub fn amount_value(&self) -> f64 {
		currency::parse_amount(&self.amount).filter(|value| value.is_finite()).unwrap_or(0.)
	}

	/// Table label of the creation date, e.g. `Oct 6, 2025`.
	pub fn created_on_label(&self) -> String {
		self.created_at
			.format(format_description!("[month repr:short] [day padding:none], [year]"))
			.unwrap_or_default()
	}
}

/// Listing endpoint payload.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PaymentListResponse {
	/// Matching payments.
	#[serde(default)]
	pub payments: Vec<Payment>,
}

/// Filters for [`ApiClient::list_payments`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentListParams {
	/// Only payments in this state.
	pub status: Option<PaymentStatus>,
	/// Only the payment with this identifier; empty means no filter.
	pub id: Option<String>,
	/// Server-side ordering.
	pub sort: Option<PaymentSort>,
}
impl PaymentListParams {
	/// Filters by status.
	pub fn status(mut self, status: PaymentStatus) -> Self {
		self.status = Some(status);

		self
	}

	/// Filters by payment identifier.
	pub fn id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());

		self
	}

	/// Sets the ordering.
	pub fn sort(mut self, sort: PaymentSort) -> Self {
		self.sort = Some(sort);

		self
	}

	/// Clears every filter.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	/// Query parameters in `status`, `id`, `sort` order; unset or empty fields are omitted.
	pub fn to_query(&self) -> QueryParams {
		let mut params = QueryParams::new();

		params.push_opt("status", self.status);
		params.push_opt("id", self.id.as_deref().filter(|id| !id.is_empty()));
		params.push_opt("sort", self.sort);

		params
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Lists payments matching `params`.
	pub async fn list_payments(&self, params: &PaymentListParams) -> Result<PaymentListResponse> {
		self.get(PAYMENT_LIST_PATH, RequestOptions::default().with_params(params.to_query())).await
	}
}
