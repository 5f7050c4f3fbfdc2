//! Role- and module-gated dashboard view construction
//!
//! Settings and the current user are explicit inputs: callers load them once
//! per session and pass them in, nothing is looked up from ambient state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{
    CategoryCount, Counters, DailyDetail, Dimension, Leaderboard, MetricSummary, Trend,
};

/// Role that sees every enabled panel
pub const ADMIN_ROLE: &str = "admin";

/// A block of the installations dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Counters,
    Leaderboard,
    Trend,
    ByMonth,
    ByDay,
    ByStatus,
    ByService,
    ByPlan,
    ByZone,
    ByAdvisor,
    ByTechnician,
    BySector,
    Daily,
}

impl Panel {
    /// Display order
    pub const ALL: [Panel; 13] = [
        Panel::Counters,
        Panel::Leaderboard,
        Panel::Trend,
        Panel::ByMonth,
        Panel::ByDay,
        Panel::ByStatus,
        Panel::ByService,
        Panel::ByPlan,
        Panel::ByZone,
        Panel::ByAdvisor,
        Panel::ByTechnician,
        Panel::BySector,
        Panel::Daily,
    ];

    pub fn breakdown_dimension(self) -> Option<Dimension> {
        match self {
            Panel::ByMonth => Some(Dimension::Month),
            Panel::ByDay => Some(Dimension::Day),
            Panel::ByStatus => Some(Dimension::Status),
            Panel::ByService => Some(Dimension::Service),
            Panel::ByPlan => Some(Dimension::Plan),
            Panel::ByZone => Some(Dimension::Zone),
            Panel::ByAdvisor => Some(Dimension::Advisor),
            Panel::ByTechnician => Some(Dimension::Technician),
            Panel::BySector => Some(Dimension::Sector),
            Panel::Counters | Panel::Leaderboard | Panel::Trend | Panel::Daily => None,
        }
    }
}

/// Module switches for this deployment.
///
/// Only the installations module has a dashboard here; toggles for other
/// application modules in a shared config file are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleToggles {
    pub installations: bool,
}

impl Default for ModuleToggles {
    fn default() -> Self {
        Self {
            installations: true,
        }
    }
}

/// Dashboard settings, loaded once from the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub modules: ModuleToggles,
    /// Panels switched off for everyone
    #[serde(default)]
    pub hidden_panels: Vec<Panel>,
    /// Role name → panels that role may see
    #[serde(default = "default_role_panels")]
    pub panels: BTreeMap<String, Vec<Panel>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            modules: ModuleToggles::default(),
            hidden_panels: Vec::new(),
            panels: default_role_panels(),
        }
    }
}

fn default_role_panels() -> BTreeMap<String, Vec<Panel>> {
    let mut panels = BTreeMap::new();
    panels.insert("supervisor".to_string(), Panel::ALL.to_vec());
    panels.insert(
        "asesor".to_string(),
        vec![
            Panel::Counters,
            Panel::Leaderboard,
            Panel::Trend,
            Panel::ByMonth,
            Panel::ByPlan,
            Panel::ByService,
        ],
    );
    panels.insert(
        "tecnico".to_string(),
        vec![
            Panel::Counters,
            Panel::ByTechnician,
            Panel::BySector,
            Panel::Daily,
        ],
    );
    panels
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub name: String,
    pub roles: Vec<String>,
}

impl CurrentUser {
    pub fn new(name: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            name: name.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.trim().eq_ignore_ascii_case(role))
    }
}

impl Settings {
    /// Whether `user` may see `panel` under these settings
    pub fn panel_visible(&self, panel: Panel, user: &CurrentUser) -> bool {
        if !self.modules.installations || self.hidden_panels.contains(&panel) {
            return false;
        }
        if user.has_role(ADMIN_ROLE) {
            return true;
        }
        self.panels
            .iter()
            .any(|(role, panels)| user.has_role(role) && panels.contains(&panel))
    }
}

/// Rendered content of one panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum Section {
    Counters(Counters),
    Leaderboard(Leaderboard),
    Trend(Trend),
    Breakdown {
        dimension: Dimension,
        rows: Vec<CategoryCount>,
    },
    Daily {
        rows: Vec<DailyDetail>,
    },
}

/// What one user gets to see of a summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub user: String,
    pub sections: Vec<Section>,
}

impl DashboardView {
    pub fn build(summary: &MetricSummary, settings: &Settings, user: &CurrentUser) -> Self {
        let sections = Panel::ALL
            .iter()
            .copied()
            .filter(|&panel| settings.panel_visible(panel, user))
            .map(|panel| match panel.breakdown_dimension() {
                Some(dimension) => Section::Breakdown {
                    dimension,
                    rows: summary.breakdowns.get(dimension).to_vec(),
                },
                None => match panel {
                    Panel::Counters => Section::Counters(summary.counters.clone()),
                    Panel::Leaderboard => Section::Leaderboard(summary.leaderboard.clone()),
                    Panel::Trend => Section::Trend(summary.trend.clone()),
                    _ => Section::Daily {
                        rows: summary.daily.clone(),
                    },
                },
            })
            .collect();

        Self {
            user: user.name.clone(),
            sections,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
