//! Core record types for bloodmatch.
//!
//! This module defines the blood request and donor records read from storage,
//! plus the enumerations used to interpret their text-valued fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the eight canonical ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    /// A positive.
    #[serde(rename = "A+")]
    APos,
    /// A negative.
    #[serde(rename = "A-")]
    ANeg,
    /// B positive.
    #[serde(rename = "B+")]
    BPos,
    /// B negative.
    #[serde(rename = "B-")]
    BNeg,
    /// AB positive.
    #[serde(rename = "AB+")]
    AbPos,
    /// AB negative.
    #[serde(rename = "AB-")]
    AbNeg,
    /// O positive.
    #[serde(rename = "O+")]
    OPos,
    /// O negative.
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    /// Every blood group, in table order.
    pub const ALL: [Self; 8] = [
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::AbPos,
        Self::AbNeg,
        Self::OPos,
        Self::ONeg,
    ];

    /// The label used in storage and on the wire, e.g. `"AB-"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| Error::InvalidBloodGroup(s.to_string()))
    }
}

/// How urgently a blood request needs donors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    /// Can wait.
    Low,
    /// Needed soon.
    Medium,
    /// Needed now.
    High,
}

impl Urgency {
    /// Label as stored on a request.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = Error;

    /// Labels are matched exactly; `"high"` is not `High`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            other => Err(Error::InvalidUrgency {
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a blood request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Still looking for donors.
    #[default]
    Pending,
    /// Donors were found.
    Fulfilled,
    /// Withdrawn by the requester.
    Cancelled,
}

impl RequestStatus {
    /// Label as stored in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Fulfilled => "Fulfilled",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Fulfilled" => Ok(Self::Fulfilled),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(Error::InvalidRequestStatus(other.to_string())),
        }
    }
}

/// A stored blood request.
///
/// `blood_group` and `urgency_level` keep the text exactly as it was stored so
/// that unrecognized values reach the matcher instead of failing the read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    /// Storage identifier.
    pub id: i64,
    /// The user who filed the request.
    pub requester_id: i64,
    /// Patient or contact name.
    pub name: String,
    /// Required blood group label.
    pub blood_group: String,
    /// City label.
    pub location: String,
    /// Street address of the hospital or pickup point.
    pub address: String,
    /// Contact phone.
    pub phone: String,
    /// Free-text note.
    pub note: Option<String>,
    /// Urgency label.
    pub urgency_level: String,
    /// Lifecycle state.
    pub request_status: RequestStatus,
    /// When the request was filed.
    pub created_at: DateTime<Utc>,
}

impl BloodRequest {
    /// The parsed urgency, or `None` when the stored label is unrecognized.
    #[must_use]
    pub fn urgency(&self) -> Option<Urgency> {
        self.urgency_level.parse().ok()
    }
}

/// Fields needed to file a new blood request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBloodRequest {
    /// The user filing the request.
    pub requester_id: i64,
    /// Patient or contact name.
    pub name: String,
    /// Required blood group label.
    pub blood_group: String,
    /// City label.
    pub location: String,
    /// Street address.
    pub address: String,
    /// Contact phone.
    pub phone: String,
    /// Free-text note.
    pub note: Option<String>,
    /// Urgency label.
    pub urgency_level: String,
}

/// A user profile viewed as a donation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    /// User identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// City label.
    pub location: Option<String>,
    /// Blood group label.
    pub blood_group: Option<String>,
}

/// Fields needed to register a new user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDonor {
    /// Display name.
    pub name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Blood group label; stored trimmed and uppercased.
    pub blood_group: Option<String>,
    /// City label.
    pub location: Option<String>,
    /// Email address; stored lowercased.
    pub email: Option<String>,
    /// Date of birth.
    pub dob: Option<String>,
    /// Gender.
    pub gender: Option<String>,
}

/// A donor together with its match score. Lower scores rank first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredDonor {
    /// The candidate.
    #[serde(flatten)]
    pub donor: Donor,
    /// Match score.
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_group_round_trips_through_labels() {
        for group in BloodGroup::ALL {
            assert_eq!(group.as_str().parse::<BloodGroup>().unwrap(), group);
        }
    }

    #[test]
    fn test_blood_group_rejects_unknown_label() {
        let err = "Z+".parse::<BloodGroup>().unwrap_err();
        assert!(matches!(err, Error::InvalidBloodGroup(ref v) if v == "Z+"));
        assert!("ab+".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_blood_group_serializes_as_label() {
        let json = serde_json::to_string(&BloodGroup::AbNeg).unwrap();
        assert_eq!(json, "\"AB-\"");
    }

    #[test]
    fn test_urgency_parse_is_exact() {
        assert_eq!("High".parse::<Urgency>().unwrap(), Urgency::High);
        assert_eq!("Medium".parse::<Urgency>().unwrap(), Urgency::Medium);
        assert_eq!("Low".parse::<Urgency>().unwrap(), Urgency::Low);
        assert!("high".parse::<Urgency>().is_err());
        assert!("".parse::<Urgency>().is_err());
    }

    #[test]
    fn test_request_status_default_is_pending() {
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
        assert_eq!(
            "Cancelled".parse::<RequestStatus>().unwrap(),
            RequestStatus::Cancelled
        );
        assert!("Done".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_blood_request_urgency_unrecognized_is_none() {
        let request = BloodRequest {
            id: 1,
            requester_id: 2,
            name: "Ravi".to_string(),
            blood_group: "A+".to_string(),
            location: "Chennai".to_string(),
            address: "12 Anna Salai".to_string(),
            phone: "555-0100".to_string(),
            note: None,
            urgency_level: "Critical".to_string(),
            request_status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        assert_eq!(request.urgency(), None);
    }

    #[test]
    fn test_blood_request_serializes_camel_case() {
        let request = BloodRequest {
            id: 1,
            requester_id: 2,
            name: "Ravi".to_string(),
            blood_group: "A+".to_string(),
            location: "Chennai".to_string(),
            address: "12 Anna Salai".to_string(),
            phone: "555-0100".to_string(),
            note: None,
            urgency_level: "High".to_string(),
            request_status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requesterId"], 2);
        assert_eq!(json["bloodGroup"], "A+");
        assert_eq!(json["urgencyLevel"], "High");
        assert!(json["note"].is_null());
        assert!(json.as_object().unwrap().contains_key("note"));
    }

    #[test]
    fn test_scored_donor_flattens_donor_fields() {
        let scored = ScoredDonor {
            donor: Donor {
                id: 7,
                name: "Meena".to_string(),
                phone: None,
                location: Some("Delhi".to_string()),
                blood_group: Some("O-".to_string()),
            },
            score: 15,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["bloodGroup"], "O-");
        assert_eq!(json["score"], 15);
        assert!(json.as_object().unwrap().contains_key("phone"));
        assert!(json["phone"].is_null());
    }
}
