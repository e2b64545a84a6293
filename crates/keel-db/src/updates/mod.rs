//! Update payloads for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields generate SET clauses in the dynamic UPDATE SQL. Nullable columns use
//! `Option<Option<T>>`, where `Some(None)` clears the column. The update
//! struct is serialized as the audit `detail` payload (changed fields only).

pub mod daily_task;
pub mod document;
pub mod financial;
pub mod lead;
pub mod member;
pub mod project;

pub use daily_task::{DailyTaskUpdate, DailyTaskUpdateBuilder};
pub use document::{DocumentUpdate, DocumentUpdateBuilder};
pub use financial::{FinancialUpdate, FinancialUpdateBuilder};
pub use lead::{LeadUpdate, LeadUpdateBuilder};
pub use member::{MemberUpdate, MemberUpdateBuilder};
pub use project::{ProjectUpdate, ProjectUpdateBuilder};

/// SET clauses and their positional parameters for a dynamic UPDATE.
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    sets: Vec<String>,
    params: Vec<libsql::Value>,
}

impl Assignments {
    pub(crate) fn set(&mut self, column: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    pub(crate) fn set_opt<T: Into<libsql::Value>>(&mut self, column: &str, value: Option<T>) {
        match value {
            Some(v) => self.set(column, v),
            None => self.set(column, libsql::Value::Null),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// `UPDATE {table} SET ... , updated_at = ? WHERE id = ? AND org_id = ?`.
    pub(crate) fn into_update(
        mut self,
        table: &str,
        id: &str,
        org_id: &str,
        updated_at: &str,
    ) -> (String, Vec<libsql::Value>) {
        self.set("updated_at", updated_at.to_string());
        self.params.push(id.into());
        let id_pos = self.params.len();
        self.params.push(org_id.into());
        let org_pos = self.params.len();
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{id_pos} AND org_id = ?{org_pos}",
            self.sets.join(", ")
        );
        (sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_positional_update() {
        let mut a = Assignments::default();
        a.set("name", "Relaunch");
        a.set_opt::<String>("client", None);
        let (sql, params) = a.into_update("projects", "prj-1", "org", "now");
        assert_eq!(
            sql,
            "UPDATE projects SET name = ?1, client = ?2, updated_at = ?3 WHERE id = ?4 AND org_id = ?5"
        );
        assert_eq!(params.len(), 5);
        assert_eq!(params[1], libsql::Value::Null);
    }
}
