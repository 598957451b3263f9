//! Dashboard application state.
//!
//! [`Dashboard`] owns the brand-record collection and every piece of UI state
//! (selection, view mode, search term, comparison category, refreshes in
//! flight). All mutation goes through [`Dashboard::apply`] or
//! [`Dashboard::begin_refresh`]; projections are computed by the functions in
//! [`crate::aggregate`] from [`Dashboard::competitors`], which is never
//! affected by the sidebar search.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assortment::{Category, CompetitorData};
use crate::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Overview,
    Comparison,
    /// Category-by-brand drilldown matrix.
    #[serde(alias = "drilldown")]
    Matrix,
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Overview => write!(f, "overview"),
            ViewMode::Comparison => write!(f, "comparison"),
            ViewMode::Matrix => write!(f, "matrix"),
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(ViewMode::Overview),
            "comparison" => Ok(ViewMode::Comparison),
            "matrix" | "drilldown" => Ok(ViewMode::Matrix),
            _ => Err(CoreError::UnknownViewMode(s.to_string())),
        }
    }
}

/// Outcome of the most recent refresh for one brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RefreshStatus {
    InFlight { started_at: DateTime<Utc> },
    Succeeded { at: DateTime<Utc> },
    Failed { message: String, at: DateTime<Utc> },
}

/// What the caller needs to run the analyzer for a refresh it was granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub enum Action {
    Select(String),
    SetView(ViewMode),
    Search(String),
    SetComparisonCategory(Category),
    RefreshSucceeded {
        id: String,
        record: Box<CompetitorData>,
    },
    RefreshFailed {
        id: String,
        message: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("unknown brand id: {0}")]
    UnknownBrand(String),

    #[error("no brand is selected")]
    NoSelection,

    #[error("a refresh is already in flight for brand {0}")]
    RefreshInFlight(String),

    #[error("no refresh was started for brand {0}")]
    RefreshNotStarted(String),

    #[error("refresh is not available in the {0} view")]
    RefreshUnavailable(ViewMode),
}

/// Serializable view of the UI state, without the record collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub view: ViewMode,
    pub selected_id: Option<String>,
    pub highlighted_id: Option<String>,
    pub search: String,
    pub comparison_category: Category,
    pub analyzing: bool,
    pub in_flight: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    competitors: Vec<CompetitorData>,
    selected_id: Option<String>,
    view: ViewMode,
    search: String,
    comparison_category: Category,
    in_flight: HashSet<String>,
    refresh_status: HashMap<String, RefreshStatus>,
}

/// Records whose name contains `term`, ignoring case. An empty term keeps all.
#[must_use]
pub fn filter_by_name<'a>(records: &'a [CompetitorData], term: &str) -> Vec<&'a CompetitorData> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect()
}

impl Dashboard {
    /// Creates the dashboard with the first record selected.
    #[must_use]
    pub fn new(competitors: Vec<CompetitorData>) -> Self {
        let selected_id = competitors.first().map(|c| c.id.clone());
        Self {
            competitors,
            selected_id,
            view: ViewMode::default(),
            search: String::new(),
            comparison_category: Category::ALL[0],
            in_flight: HashSet::new(),
            refresh_status: HashMap::new(),
        }
    }

    /// The full collection, in sidebar order. Aggregations always use this.
    #[must_use]
    pub fn competitors(&self) -> &[CompetitorData] {
        &self.competitors
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CompetitorData> {
        self.competitors.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&CompetitorData> {
        self.selected_id.as_deref().and_then(|id| self.find(id))
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// The sidebar entry to highlight. The comparison view covers every
    /// brand, so nothing is highlighted there.
    #[must_use]
    pub fn highlighted_id(&self) -> Option<&str> {
        match self.view {
            ViewMode::Comparison => None,
            ViewMode::Overview | ViewMode::Matrix => self.selected_id(),
        }
    }

    #[must_use]
    pub fn view(&self) -> ViewMode {
        self.view
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn comparison_category(&self) -> Category {
        self.comparison_category
    }

    /// Sidebar entries whose name contains the search term, ignoring case.
    #[must_use]
    pub fn visible_competitors(&self) -> Vec<&CompetitorData> {
        filter_by_name(&self.competitors, &self.search)
    }

    /// True while any refresh is outstanding; gates the blocking overlay.
    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        !self.in_flight.is_empty()
    }

    #[must_use]
    pub fn is_refreshing(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    #[must_use]
    pub fn refresh_status(&self, id: &str) -> Option<&RefreshStatus> {
        self.refresh_status.get(id)
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        let mut in_flight: Vec<String> = self.in_flight.iter().cloned().collect();
        in_flight.sort();
        DashboardSnapshot {
            view: self.view,
            selected_id: self.selected_id.clone(),
            highlighted_id: self.highlighted_id().map(ToOwned::to_owned),
            search: self.search.clone(),
            comparison_category: self.comparison_category,
            analyzing: self.is_analyzing(),
            in_flight,
        }
    }

    /// Claims a refresh slot for the selected brand.
    ///
    /// The caller runs the analyzer with the returned ticket and reports the
    /// outcome through [`Action::RefreshSucceeded`] or [`Action::RefreshFailed`].
    ///
    /// # Errors
    ///
    /// - [`DashboardError::RefreshUnavailable`] in the comparison view.
    /// - [`DashboardError::NoSelection`] when nothing is selected.
    /// - [`DashboardError::RefreshInFlight`] when the selected brand is
    ///   already being refreshed.
    pub fn begin_refresh(&mut self) -> Result<RefreshTicket, DashboardError> {
        if self.view == ViewMode::Comparison {
            return Err(DashboardError::RefreshUnavailable(self.view));
        }
        let record = self.selected().ok_or(DashboardError::NoSelection)?;
        let ticket = RefreshTicket {
            id: record.id.clone(),
            name: record.name.clone(),
            url: record.url.clone(),
        };

        if !self.in_flight.insert(ticket.id.clone()) {
            return Err(DashboardError::RefreshInFlight(ticket.id));
        }
        self.refresh_status.insert(
            ticket.id.clone(),
            RefreshStatus::InFlight {
                started_at: Utc::now(),
            },
        );
        tracing::info!(brand = %ticket.name, id = %ticket.id, "refresh started");
        Ok(ticket)
    }

    /// Applies a state transition.
    ///
    /// # Errors
    ///
    /// - [`DashboardError::UnknownBrand`] when an action names an id that is
    ///   not in the collection.
    /// - [`DashboardError::RefreshNotStarted`] when a refresh outcome arrives
    ///   for a brand with no refresh in flight.
    pub fn apply(&mut self, action: Action) -> Result<(), DashboardError> {
        match action {
            Action::Select(id) => {
                if self.find(&id).is_none() {
                    return Err(DashboardError::UnknownBrand(id));
                }
                self.selected_id = Some(id);
            }
            Action::SetView(view) => self.view = view,
            Action::Search(term) => self.search = term,
            Action::SetComparisonCategory(category) => self.comparison_category = category,
            Action::RefreshSucceeded { id, record } => {
                self.finish_refresh(&id)?;
                let slot = self
                    .competitors
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| DashboardError::UnknownBrand(id.clone()))?;
                let mut record = *record;
                // The analyzer mints a fresh id and a placeholder logo; the slot
                // keeps its own so the selection and configured branding survive.
                record.id.clone_from(&id);
                record.logo = std::mem::take(&mut slot.logo);
                tracing::info!(brand = %record.name, id = %id, total_styles = record.total_styles, "refresh applied");
                *slot = record;
                self.refresh_status
                    .insert(id, RefreshStatus::Succeeded { at: Utc::now() });
            }
            Action::RefreshFailed { id, message } => {
                self.finish_refresh(&id)?;
                tracing::error!(id = %id, error = %message, "refresh failed; keeping previous data");
                self.refresh_status.insert(
                    id,
                    RefreshStatus::Failed {
                        message,
                        at: Utc::now(),
                    },
                );
            }
        }
        Ok(())
    }

    fn finish_refresh(&mut self, id: &str) -> Result<(), DashboardError> {
        if self.find(id).is_none() {
            return Err(DashboardError::UnknownBrand(id.to_string()));
        }
        if !self.in_flight.remove(id) {
            return Err(DashboardError::RefreshNotStarted(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
