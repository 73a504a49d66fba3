//! Abuse reports against listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Participant, ProductThumb};
use crate::types::{ProductId, ReportId, ReportStatus, UserId};

/// A report with its listing and reporter embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub product_id: ProductId,
    pub reporter_id: UserId,
    pub reason: String,
    #[serde(default)]
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub product: Option<ProductThumb>,
    #[serde(default)]
    pub reporter: Option<Participant>,
}
