//! Tasks: units of work under a contract.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::fields::{keep_unless_blank, optional_text, required_text};
use super::token::token_enum;
use super::{ContractId, Error, TaskId, UserId};

token_enum! {
    /// Progress of a task.
    TaskStatus as "task status" {
        /// Not started.
        ToDo => ("to_do", "To Do"),
        /// Being worked.
        InProgress => ("in_progress", "In Progress"),
        /// Waiting on something external.
        Blocked => ("blocked", "Blocked"),
        /// Finished.
        Done => ("done", "Done"),
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::ToDo
    }
}

/// A unit of work under a [`crate::domain::Contract`].
///
/// ## Invariants
/// - `completed_at` is `None` until the task first reaches
///   [`TaskStatus::Done`], and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Database-assigned identifier.
    pub id: TaskId,
    /// Parent contract.
    pub contract_id: ContractId,
    /// What needs doing; never blank.
    pub description: String,
    /// Progress.
    pub status: TaskStatus,
    /// Assignee.
    pub assigned_to: Option<UserId>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// First time the task reached done.
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time; strictly increases.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Full column mapping recorded in audit entries.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "contract_id": self.contract_id,
            "description": self.description,
            "status": self.status,
            "assigned_to": self.assigned_to,
            "due_date": self.due_date,
            "completed_at": self.completed_at,
            "notes": self.notes,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// Validated task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Parent contract, checked to exist by the mutation engine.
    pub contract_id: ContractId,
    /// Trimmed, non-empty description.
    pub description: String,
    /// Initial status.
    pub status: TaskStatus,
    /// Assignee.
    pub assigned_to: Option<UserId>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Set when the task is created already done.
    pub completed_at: Option<DateTime<Utc>>,
    /// Notes.
    pub notes: Option<String>,
    /// Creation time, also the first `updated_at`.
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Attach the identifier assigned by storage.
    #[must_use]
    pub fn with_id(self, id: TaskId) -> Task {
        Task {
            id,
            contract_id: self.contract_id,
            description: self.description,
            status: self.status,
            assigned_to: self.assigned_to,
            due_date: self.due_date,
            completed_at: self.completed_at,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Raw create-task command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask {
    /// Parent contract.
    pub contract_id: ContractId,
    /// Required.
    pub description: String,
    /// Defaults to [`TaskStatus::ToDo`].
    pub status: Option<TaskStatus>,
    /// Assignee, validated by the mutation engine.
    pub assigned_to: Option<UserId>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Blank means none.
    pub notes: Option<String>,
}

impl CreateTask {
    pub(crate) fn validate(self, created_at: DateTime<Utc>) -> Result<NewTask, Error> {
        let status = self.status.unwrap_or_default();
        Ok(NewTask {
            contract_id: self.contract_id,
            description: required_text("description", &self.description)?,
            status,
            assigned_to: self.assigned_to,
            due_date: self.due_date,
            completed_at: (status == TaskStatus::Done).then_some(created_at),
            notes: optional_text(self.notes),
            created_at,
        })
    }
}

/// Partial task update.
///
/// `description` keeps its value when blank; `notes` is cleared when blank.
/// `assigned_to` and `due_date` use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Blank keeps the current description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New assignee or `Some(None)` to unassign.
    pub assigned_to: Option<Option<UserId>>,
    /// New due date or `Some(None)` to clear.
    pub due_date: Option<Option<NaiveDate>>,
    /// Blank clears.
    pub notes: Option<String>,
}

impl TaskPatch {
    /// Assignee after the patch, if the patch changes it.
    pub(crate) fn assignee_change(&self, current: &Task) -> Option<Option<UserId>> {
        self.assigned_to.filter(|next| *next != current.assigned_to)
    }

    /// Apply the patch to `current`, stamping `updated_at` and, on the first
    /// arrival at done, `completed_at`.
    pub(crate) fn apply(self, current: &Task, updated_at: DateTime<Utc>) -> Task {
        let status = self.status.unwrap_or(current.status);
        let completed_at = current
            .completed_at
            .or_else(|| (status == TaskStatus::Done).then_some(updated_at));
        Task {
            id: current.id,
            contract_id: current.contract_id,
            description: keep_unless_blank(&current.description, self.description.as_deref()),
            status,
            assigned_to: self.assigned_to.unwrap_or(current.assigned_to),
            due_date: self.due_date.unwrap_or(current.due_date),
            completed_at,
            notes: match self.notes {
                Some(notes) => optional_text(Some(notes)),
                None => current.notes.clone(),
            },
            created_at: current.created_at,
            updated_at,
        }
    }
}

/// Listing filter for tasks; unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact status.
    pub status: Option<TaskStatus>,
    /// Exact assignee.
    pub assigned_to: Option<UserId>,
    /// Due on or before this date; tasks without a due date never match.
    pub due_on_or_before: Option<NaiveDate>,
    /// Parent contract.
    pub contract_id: Option<ContractId>,
}

impl TaskFilter {
    /// Whether `task` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status == status)
            && self
                .assigned_to
                .is_none_or(|user| task.assigned_to == Some(user))
            && self
                .due_on_or_before
                .is_none_or(|limit| task.due_date.is_some_and(|due| due <= limit))
            && self
                .contract_id
                .is_none_or(|contract| task.contract_id == contract)
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
    fn task() -> Task {
        CreateTask {
            contract_id: ContractId::new(1),
            description: "Draft technical volume".to_owned(),
            status: None,
            assigned_to: None,
            due_date: NaiveDate::from_ymd_opt(2025, 5, 1),
            notes: Some(String::new()),
        }
        .validate(at(1))
        .expect("valid task")
        .with_id(TaskId::new(4))
    }

    fn set_status(task: &Task, status: TaskStatus, now: i64) -> Task {
        TaskPatch {
            status: Some(status),
            ..TaskPatch::default()
        }
        .apply(task, at(now))
    }

    #[rstest]
    fn new_task_defaults(task: Task) {
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.notes, None);
    }

    #[rstest]
    fn creating_done_task_stamps_completion() {
        let new = CreateTask {
            contract_id: ContractId::new(1),
            description: "Already finished".to_owned(),
            status: Some(TaskStatus::Done),
            assigned_to: None,
            due_date: None,
            notes: None,
        }
        .validate(at(7))
        .expect("valid task");
        assert_eq!(new.completed_at, Some(at(7)));
    }

    #[rstest]
    fn completion_is_stamped_once(task: Task) {
        let done = set_status(&task, TaskStatus::Done, 10);
        assert_eq!(done.completed_at, Some(at(10)));

        let reopened = set_status(&done, TaskStatus::InProgress, 20);
        assert_eq!(reopened.completed_at, Some(at(10)));

        let done_again = set_status(&reopened, TaskStatus::Done, 30);
        assert_eq!(done_again.completed_at, Some(at(10)));
        assert_eq!(done_again.updated_at, at(30));
    }

    #[rstest]
    fn blank_description_is_kept(task: Task) {
        let updated = TaskPatch {
            description: Some("   ".to_owned()),
            notes: Some("call CO".to_owned()),
            ..TaskPatch::default()
        }
        .apply(&task, at(2));
        assert_eq!(updated.description, "Draft technical volume");
        assert_eq!(updated.notes.as_deref(), Some("call CO"));
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2025, 5, 1), true)]
    #[case(NaiveDate::from_ymd_opt(2025, 4, 30), false)]
    fn due_filter_is_inclusive(task: Task, #[case] limit: Option<NaiveDate>, #[case] hit: bool) {
        let filter = TaskFilter {
            due_on_or_before: limit,
            ..TaskFilter::default()
        };
        assert_eq!(filter.matches(&task), hit);
    }

    #[rstest]
    fn due_filter_skips_undated_tasks(mut task: Task) {
        task.due_date = None;
        let filter = TaskFilter {
            due_on_or_before: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..TaskFilter::default()
        };
        assert!(!filter.matches(&task));
    }
}
