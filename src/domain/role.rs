use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Pending,
    Owner,
    AccountManager,
    Closer,
    MediaBuyer,
    ColdCaller,
    Demo,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Pending => "pending",
            UserRole::Owner => "owner",
            UserRole::AccountManager => "account_manager",
            UserRole::Closer => "closer",
            UserRole::MediaBuyer => "media_buyer",
            UserRole::ColdCaller => "cold_caller",
            UserRole::Demo => "demo",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(UserRole::Pending),
            "owner" => Ok(UserRole::Owner),
            "account_manager" => Ok(UserRole::AccountManager),
            "closer" => Ok(UserRole::Closer),
            "media_buyer" => Ok(UserRole::MediaBuyer),
            "cold_caller" => Ok(UserRole::ColdCaller),
            "demo" => Ok(UserRole::Demo),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A navigable section of the dashboard. Each area is gated by role.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Dashboard,
    Clients,
    Projects,
    Deals,
    Invoices,
    Leads,
    Ads,
    Calling,
    Meetings,
    Analytics,
    Insights,
    Updates,
    Team,
    Settings,
}

impl Area {
    pub const ALL: [Area; 14] = [
        Area::Dashboard,
        Area::Clients,
        Area::Projects,
        Area::Deals,
        Area::Invoices,
        Area::Leads,
        Area::Ads,
        Area::Calling,
        Area::Meetings,
        Area::Analytics,
        Area::Insights,
        Area::Updates,
        Area::Team,
        Area::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Area::Dashboard => "Dashboard",
            Area::Clients => "Clients",
            Area::Projects => "Projects",
            Area::Deals => "Deals",
            Area::Invoices => "Invoices",
            Area::Leads => "Leads",
            Area::Ads => "Ads",
            Area::Calling => "Cold Calling",
            Area::Meetings => "Meetings",
            Area::Analytics => "Analytics",
            Area::Insights => "AI Insights",
            Area::Updates => "Activity Updates",
            Area::Team => "Team",
            Area::Settings => "Settings",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Area::Dashboard => "/dashboard",
            Area::Clients => "/clients",
            Area::Projects => "/projects",
            Area::Deals => "/deals",
            Area::Invoices => "/invoices",
            Area::Leads => "/leads",
            Area::Ads => "/ads",
            Area::Calling => "/calling",
            Area::Meetings => "/meetings",
            Area::Analytics => "/analytics",
            Area::Insights => "/insights",
            Area::Updates => "/updates",
            Area::Team => "/team",
            Area::Settings => "/settings",
        }
    }

    pub fn allowed_roles(&self) -> &'static [UserRole] {
        use UserRole::*;
        match self {
            Area::Dashboard => &[Pending, Owner, Closer, MediaBuyer, ColdCaller, Demo],
            Area::Clients | Area::Projects => &[Owner, Closer, MediaBuyer, Demo],
            Area::Deals => &[Owner, Closer, Demo],
            Area::Invoices => &[Owner, AccountManager, Demo],
            Area::Leads => &[Owner, Closer, ColdCaller, Demo],
            Area::Ads => &[Owner, MediaBuyer, Demo],
            Area::Calling => &[Owner, ColdCaller, Demo],
            Area::Meetings => &[Owner, Closer, ColdCaller, Demo],
            Area::Analytics => &[Owner, MediaBuyer, Demo],
            Area::Insights | Area::Updates | Area::Team | Area::Settings => &[Owner, Demo],
        }
    }

    pub fn allows(&self, role: UserRole) -> bool {
        self.allowed_roles().contains(&role)
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct NavItem {
    pub area: Area,
    pub label: &'static str,
    pub href: &'static str,
}

pub fn nav_items_for_role(role: UserRole) -> Vec<NavItem> {
    Area::ALL
        .iter()
        .filter(|area| area.allows(role))
        .map(|area| NavItem {
            area: *area,
            label: area.label(),
            href: area.path(),
        })
        .collect()
}
