//! Shared test utilities for keel-db unit tests.

pub mod helpers {
    use keel_core::entities::{NewProject, NewTeamMember, Project, TeamMember};
    use keel_core::identity::Tenant;

    use crate::KeelDb;
    use crate::service::KeelService;

    pub const ORG: &str = "org_acme";
    pub const USER: &str = "usr_ana";

    /// In-memory service for the default test tenant.
    pub async fn test_service() -> KeelService {
        let db = KeelDb::open_local(":memory:").await.unwrap();
        KeelService::from_db(db, Tenant::new(ORG, USER))
    }

    /// Two services over the same database file, one per organization.
    pub async fn two_tenants(dir: &std::path::Path) -> (KeelService, KeelService) {
        let path = dir.join("keel.db");
        let path = path.to_str().unwrap();
        let a = KeelService::new_local(path, Tenant::new("org_a", "usr_a"))
            .await
            .unwrap();
        let b = KeelService::new_local(path, Tenant::new("org_b", "usr_b"))
            .await
            .unwrap();
        (a, b)
    }

    pub async fn seed_project(svc: &KeelService, name: &str) -> Project {
        svc.create_project(&NewProject::named(name)).await.unwrap()
    }

    pub async fn seed_member(svc: &KeelService, name: &str, monthly_cost: f64) -> TeamMember {
        svc.create_team_member(&NewTeamMember {
            name: name.into(),
            monthly_cost,
            ..NewTeamMember::default()
        })
        .await
        .unwrap()
    }
}
