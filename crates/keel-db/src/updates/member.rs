//! Team member update builder.

use keel_core::validation::{MAX_NAME_LEN, Validate, ValidationErrors, Validator};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Validate for MemberUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.required("name", name, MAX_NAME_LEN);
        }
        if let Some(email) = &self.email {
            v.email("email", email.as_deref());
        }
        if let Some(role) = &self.role {
            v.optional("role", role.as_deref(), MAX_NAME_LEN);
        }
        if let Some(cost) = self.monthly_cost {
            v.non_negative("monthly_cost", cost);
        }
        v.finish()
    }
}

pub struct MemberUpdateBuilder(MemberUpdate);

impl MemberUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(MemberUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: Option<String>) -> Self {
        self.0.email = Some(email);
        self
    }

    #[must_use]
    pub fn role(mut self, role: Option<String>) -> Self {
        self.0.role = Some(role);
        self
    }

    #[must_use]
    pub fn monthly_cost(mut self, cost: f64) -> Self {
        self.0.monthly_cost = Some(cost);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.0.active = Some(active);
        self
    }

    #[must_use]
    pub fn build(self) -> MemberUpdate {
        self.0
    }
}

impl Default for MemberUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
