//! Contract pursuits.
//!
//! A contract moves through [`ContractStatus`] without an enforced transition
//! graph: any status may be set from any other.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::fields::{keep_unless_blank, optional_text, required_text};
use super::token::token_enum;
use super::{ContractId, Error, UserId};

token_enum! {
    /// Lifecycle stage of a contract pursuit.
    ContractStatus as "contract status" {
        /// Captured but not yet owned.
        Draft => ("draft", "Draft"),
        /// An officer owns the pursuit.
        Assigned => ("assigned", "Assigned"),
        /// Proposal work under way.
        InProgress => ("in_progress", "In Progress"),
        /// Bid submitted to the agency.
        Submitted => ("submitted", "Submitted"),
        /// Won.
        Awarded => ("awarded", "Awarded"),
        /// Lost.
        NotAwarded => ("not_awarded", "Not Awarded"),
        /// Finished or abandoned.
        Closed => ("closed", "Closed"),
    }
}

impl Default for ContractStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl ContractStatus {
    /// Statuses counted as active pursuits in reports.
    pub const ACTIVE: &'static [Self] = &[
        Self::Draft,
        Self::Assigned,
        Self::InProgress,
        Self::Submitted,
    ];

    /// Whether the pursuit is still open.
    #[must_use]
    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }
}

/// A government-contract pursuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Database-assigned identifier.
    pub id: ContractId,
    /// Solicitation or contract number; never blank.
    pub number: String,
    /// Short title; never blank.
    pub title: String,
    /// Issuing agency.
    pub agency: Option<String>,
    /// NAICS industry code.
    pub naics: Option<String>,
    /// Set-aside programme, e.g. SDVOSB or 8(a).
    pub set_aside: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Lifecycle stage.
    pub status: ContractStatus,
    /// Owning officer.
    pub officer_id: Option<UserId>,
    /// Response due date.
    pub due_date: Option<NaiveDate>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time; strictly increases.
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Full column mapping recorded in audit entries.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "number": self.number,
            "title": self.title,
            "agency": self.agency,
            "naics": self.naics,
            "set_aside": self.set_aside,
            "description": self.description,
            "status": self.status,
            "officer_id": self.officer_id,
            "due_date": self.due_date,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// Validated contract that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    /// Trimmed, non-empty number.
    pub number: String,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Issuing agency.
    pub agency: Option<String>,
    /// NAICS code.
    pub naics: Option<String>,
    /// Set-aside programme.
    pub set_aside: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Initial status.
    pub status: ContractStatus,
    /// Owning officer.
    pub officer_id: Option<UserId>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Creation time, also the first `updated_at`.
    pub created_at: DateTime<Utc>,
}

impl NewContract {
    /// Attach the identifier assigned by storage.
    #[must_use]
    pub fn with_id(self, id: ContractId) -> Contract {
        Contract {
            id,
            number: self.number,
            title: self.title,
            agency: self.agency,
            naics: self.naics,
            set_aside: self.set_aside,
            description: self.description,
            status: self.status,
            officer_id: self.officer_id,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Raw create-contract command as collected by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateContract {
    /// Required.
    pub number: String,
    /// Required.
    pub title: String,
    /// Blank means none.
    pub agency: Option<String>,
    /// Blank means none.
    pub naics: Option<String>,
    /// Blank means none.
    pub set_aside: Option<String>,
    /// Blank means none.
    pub description: Option<String>,
    /// Defaults to [`ContractStatus::Draft`].
    pub status: Option<ContractStatus>,
    /// Owning officer, validated by the mutation engine.
    pub officer_id: Option<UserId>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
}

impl CreateContract {
    pub(crate) fn validate(self, created_at: DateTime<Utc>) -> Result<NewContract, Error> {
        Ok(NewContract {
            number: required_text("number", &self.number)?,
            title: required_text("title", &self.title)?,
            agency: optional_text(self.agency),
            naics: optional_text(self.naics),
            set_aside: optional_text(self.set_aside),
            description: optional_text(self.description),
            status: self.status.unwrap_or_default(),
            officer_id: self.officer_id,
            due_date: self.due_date,
            created_at,
        })
    }
}

/// Partial contract update.
///
/// `None` leaves a field untouched. For `number` and `title` a blank value
/// also keeps the stored text; for the optional text fields a blank value
/// clears them. `officer_id` and `due_date` use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractPatch {
    /// Blank keeps the current number.
    pub number: Option<String>,
    /// Blank keeps the current title.
    pub title: Option<String>,
    /// Blank clears.
    pub agency: Option<String>,
    /// Blank clears.
    pub naics: Option<String>,
    /// Blank clears.
    pub set_aside: Option<String>,
    /// Blank clears.
    pub description: Option<String>,
    /// New status; any transition is accepted.
    pub status: Option<ContractStatus>,
    /// New owner or `Some(None)` to unassign.
    pub officer_id: Option<Option<UserId>>,
    /// New due date or `Some(None)` to clear.
    pub due_date: Option<Option<NaiveDate>>,
}

impl ContractPatch {
    /// Owner after the patch, if the patch changes it.
    pub(crate) fn officer_change(&self, current: &Contract) -> Option<Option<UserId>> {
        self.officer_id.filter(|next| *next != current.officer_id)
    }

    /// Apply the patch to `current`, stamping `updated_at`.
    pub(crate) fn apply(self, current: &Contract, updated_at: DateTime<Utc>) -> Contract {
        let keep_optional = |patch: Option<String>, existing: &Option<String>| match patch {
            Some(value) => optional_text(Some(value)),
            None => existing.clone(),
        };
        Contract {
            id: current.id,
            number: keep_unless_blank(&current.number, self.number.as_deref()),
            title: keep_unless_blank(&current.title, self.title.as_deref()),
            agency: keep_optional(self.agency, &current.agency),
            naics: keep_optional(self.naics, &current.naics),
            set_aside: keep_optional(self.set_aside, &current.set_aside),
            description: keep_optional(self.description, &current.description),
            status: self.status.unwrap_or(current.status),
            officer_id: self.officer_id.unwrap_or(current.officer_id),
            due_date: self.due_date.unwrap_or(current.due_date),
            created_at: current.created_at,
            updated_at,
        }
    }
}

/// Listing filter for contracts; unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractFilter {
    /// Exact status.
    pub status: Option<ContractStatus>,
    /// Exact owner.
    pub officer_id: Option<UserId>,
    /// Case-sensitive substring of the agency.
    pub agency_contains: Option<String>,
    /// Exact NAICS code.
    pub naics: Option<String>,
}

impl ContractFilter {
    /// Blank text criteria are treated as unset.
    #[must_use]
    pub fn normalised(self) -> Self {
        Self {
            status: self.status,
            officer_id: self.officer_id,
            agency_contains: optional_text(self.agency_contains),
            naics: optional_text(self.naics),
        }
    }

    /// Whether `contract` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, contract: &Contract) -> bool {
        self.status.is_none_or(|status| contract.status == status)
            && self
                .officer_id
                .is_none_or(|officer| contract.officer_id == Some(officer))
            && self.agency_contains.as_deref().is_none_or(|needle| {
                contract
                    .agency
                    .as_deref()
                    .is_some_and(|agency| agency.contains(needle))
            })
            && self
                .naics
                .as_deref()
                .is_none_or(|naics| contract.naics.as_deref() == Some(naics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    #[fixture]
    fn contract() -> Contract {
        Contract {
            id: ContractId::new(1),
            number: "RFQ-1".to_owned(),
            title: "Test".to_owned(),
            agency: Some("DoD".to_owned()),
            naics: Some("811111".to_owned()),
            set_aside: None,
            description: Some("Repairs".to_owned()),
            status: ContractStatus::Draft,
            officer_id: Some(UserId::new(2)),
            due_date: None,
            created_at: at(10),
            updated_at: at(10),
        }
    }

    #[rstest]
    fn create_requires_number_and_title() {
        let command = CreateContract {
            number: "RFQ-1".to_owned(),
            title: " ".to_owned(),
            ..CreateContract::default()
        };
        let error = command.validate(at(0)).expect_err("blank title rejected");
        assert_eq!(error.message(), "title is required");
    }

    #[rstest]
    fn create_normalises_optional_text() {
        let command = CreateContract {
            number: " RFQ-1 ".to_owned(),
            title: "Test".to_owned(),
            agency: Some(String::new()),
            ..CreateContract::default()
        };
        let new = command.validate(at(5)).expect("valid contract");
        assert_eq!(new.number, "RFQ-1");
        assert_eq!(new.agency, None);
        assert_eq!(new.status, ContractStatus::Draft);
        let stored = new.with_id(ContractId::new(9));
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[rstest]
    fn blank_patch_keeps_required_and_clears_optional(contract: Contract) {
        let patch = ContractPatch {
            number: Some(String::new()),
            title: Some("  ".to_owned()),
            agency: Some(String::new()),
            ..ContractPatch::default()
        };
        let updated = patch.apply(&contract, at(20));
        assert_eq!(updated.number, "RFQ-1");
        assert_eq!(updated.title, "Test");
        assert_eq!(updated.agency, None);
        assert_eq!(updated.description, contract.description);
        assert_eq!(updated.updated_at, at(20));
    }

    #[rstest]
    fn empty_patch_changes_only_updated_at(contract: Contract) {
        let updated = ContractPatch::default().apply(&contract, at(30));
        let mut expected = contract.clone();
        expected.updated_at = at(30);
        assert_eq!(updated, expected);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(Some(UserId::new(2))), None)]
    #[case(Some(None), Some(None))]
    #[case(Some(Some(UserId::new(5))), Some(Some(UserId::new(5))))]
    fn officer_change_ignores_unchanged_owner(
        contract: Contract,
        #[case] patch_officer: Option<Option<UserId>>,
        #[case] expected: Option<Option<UserId>>,
    ) {
        let patch = ContractPatch {
            officer_id: patch_officer,
            ..ContractPatch::default()
        };
        assert_eq!(patch.officer_change(&contract), expected);
    }

    #[rstest]
    fn filter_matches_agency_substring_case_sensitively(contract: Contract) {
        let hit = ContractFilter {
            agency_contains: Some("Do".to_owned()),
            ..ContractFilter::default()
        };
        let miss = ContractFilter {
            agency_contains: Some("dod".to_owned()),
            ..ContractFilter::default()
        };
        assert!(hit.matches(&contract));
        assert!(!miss.matches(&contract));
    }

    #[rstest]
    fn blank_filter_text_is_ignored(contract: Contract) {
        let filter = ContractFilter {
            naics: Some(" ".to_owned()),
            ..ContractFilter::default()
        }
        .normalised();
        assert!(filter.matches(&contract));
    }

    #[rstest]
    fn active_statuses() {
        assert!(ContractStatus::Submitted.is_active());
        assert!(!ContractStatus::Awarded.is_active());
        assert_eq!(
            "not_awarded".parse::<ContractStatus>(),
            Ok(ContractStatus::NotAwarded)
        );
        assert_eq!(ContractStatus::InProgress.label(), "In Progress");
    }
}
