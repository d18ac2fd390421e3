use crate::domain::error::Result;
use crate::domain::profile::Profile;
use crate::domain::role::UserRole;
use crate::infrastructure::db::repository::CountFilter;
use crate::infrastructure::db::CrmRepository;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Widget {
    pub label: &'static str,
    pub value: i64,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub role: UserRole,
    pub widgets: Vec<Widget>,
}

/// Count widgets per role. Each role's counts are issued together.
pub struct DashboardUseCase {
    repository: Arc<CrmRepository>,
}

impl DashboardUseCase {
    pub fn new(repository: Arc<CrmRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, profile: &Profile) -> Result<Dashboard> {
        let repo = &self.repository;
        let me = profile.id.as_str();
        let mine = |column: &'static str| CountFilter::Equals { column, value: me };

        let widgets = match profile.role {
            UserRole::Owner => {
                let (clients, projects, deals, leads) = tokio::try_join!(
                    repo.count_rows("clients", CountFilter::All),
                    repo.count_rows("projects", CountFilter::All),
                    repo.count_rows("deals", CountFilter::All),
                    repo.count_rows("leads", CountFilter::All),
                )?;
                vec![
                    Widget { label: "Clients", value: clients },
                    Widget { label: "Projects", value: projects },
                    Widget { label: "Deals", value: deals },
                    Widget { label: "Leads", value: leads },
                ]
            }
            UserRole::Closer => {
                let (deals, leads, meetings) = tokio::try_join!(
                    repo.count_rows("deals", mine("closer_id")),
                    repo.count_rows("leads", CountFilter::All),
                    repo.count_rows("meetings", mine("closer_id")),
                )?;
                vec![
                    Widget { label: "My Deals", value: deals },
                    Widget { label: "Leads", value: leads },
                    Widget { label: "My Meetings", value: meetings },
                ]
            }
            UserRole::MediaBuyer => {
                let (ads, funnels, sites) = tokio::try_join!(
                    repo.count_rows("ads", CountFilter::All),
                    repo.count_rows("funnels", CountFilter::All),
                    repo.count_rows("sites", CountFilter::All),
                )?;
                vec![
                    Widget { label: "Ads", value: ads },
                    Widget { label: "Funnels", value: funnels },
                    Widget { label: "Sites", value: sites },
                ]
            }
            UserRole::ColdCaller => {
                let (calls, leads, booked) = tokio::try_join!(
                    repo.count_rows("call_logs", mine("cold_caller_id")),
                    repo.count_rows("leads", mine("cold_caller_id")),
                    repo.count_rows("meetings", mine("booked_by")),
                )?;
                vec![
                    Widget { label: "Total Calls", value: calls },
                    Widget { label: "My Leads", value: leads },
                    Widget { label: "Meetings Booked", value: booked },
                ]
            }
            UserRole::Pending | UserRole::AccountManager | UserRole::Demo => Vec::new(),
        };

        Ok(Dashboard {
            role: profile.role,
            widgets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calling::CallOutcome;
    use crate::domain::records::ClientInput;

    async fn setup() -> (DashboardUseCase, Arc<CrmRepository>) {
        let repository = Arc::new(CrmRepository::in_memory().await.unwrap());
        (DashboardUseCase::new(repository.clone()), repository)
    }

    async fn profile(repository: &CrmRepository, role: UserRole, hash: &str) -> Profile {
        repository.create_profile(None, role, hash).await.unwrap()
    }

    #[tokio::test]
    async fn owner_sees_global_counts() {
        let (dashboard, repository) = setup().await;
        let owner = profile(&repository, UserRole::Owner, "h1").await;
        for name in ["Acme", "Globex"] {
            repository
                .create_client(
                    &ClientInput {
                        name: name.to_string(),
                        email: None,
                        phone: None,
                        company: None,
                        notes: None,
                    },
                    &owner.id,
                )
                .await
                .unwrap();
        }

        let result = dashboard.execute(&owner).await.unwrap();
        assert_eq!(result.widgets[0], Widget { label: "Clients", value: 2 });
        assert_eq!(result.widgets.len(), 4);
    }

    #[tokio::test]
    async fn cold_caller_counts_only_own_calls() {
        let (dashboard, repository) = setup().await;
        let me = profile(&repository, UserRole::ColdCaller, "h1").await;
        let other = profile(&repository, UserRole::ColdCaller, "h2").await;
        repository.create_call_log("lead-1", &me.id, CallOutcome::NoAnswer).await.unwrap();
        repository.create_call_log("lead-2", &me.id, CallOutcome::Booked).await.unwrap();
        repository.create_call_log("lead-3", &other.id, CallOutcome::NoAnswer).await.unwrap();

        let result = dashboard.execute(&me).await.unwrap();
        let labels: Vec<&str> = result.widgets.iter().map(|w| w.label).collect();
        assert_eq!(labels, vec!["Total Calls", "My Leads", "Meetings Booked"]);
        assert_eq!(result.widgets[0].value, 2);
        assert_eq!(result.widgets[2].value, 0);
    }

    #[tokio::test]
    async fn pending_and_demo_get_no_widgets() {
        let (dashboard, repository) = setup().await;
        for (role, hash) in [(UserRole::Pending, "h1"), (UserRole::Demo, "h2"), (UserRole::AccountManager, "h3")] {
            let p = profile(&repository, role, hash).await;
            assert!(dashboard.execute(&p).await.unwrap().widgets.is_empty());
        }
    }
}
